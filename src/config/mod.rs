pub mod io;
pub mod types;
