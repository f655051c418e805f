#[cfg(target_os = "linux")]
pub mod bluez;
#[cfg(not(target_os = "linux"))]
pub mod btle;
pub mod connection;
pub mod constants;
pub mod manager;
pub mod platform;
pub mod serial;
pub mod types;
