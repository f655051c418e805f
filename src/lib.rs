use std::env;
use std::path::PathBuf;
use clap::Parser;
use log::LevelFilter;

use crate::config::io::{get_config_path, ConfigIO};
use crate::config::types::ConfigOverrides;
use crate::gui::application::run_application;
use crate::error::AppRunError;

pub mod config;
pub mod device;
pub mod error;
pub mod gui;
pub mod keys;

/// Plays a one octave piano on an HC-06 equipped microcontroller over Bluetooth serial.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hardware address of the module, e.g. 00:22:09:02:68:3E
    #[arg(long)]
    pub address: Option<String>,

    /// Serial device bound to the module on Windows and macOS, e.g. COM5 or /dev/cu.HC-06
    #[arg(long)]
    pub serial_port: Option<String>,

    /// Show a notice for every paired device instead of one for the whole list
    #[arg(long)]
    pub per_device_alerts: bool,

    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            peripheral_address: self.address.clone(),
            serial_port: self.serial_port.clone(),
            per_device_alerts: self.per_device_alerts,
        }
    }
}

pub fn init_logging(level: LevelFilter) {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Ok(log_file) = env::var("LOG_FILE") {
        match fern::log_file(&log_file) {
            Ok(file) => dispatch = dispatch.chain(file),
            Err(err) => eprintln!("Failed to open LOG_FILE {}: {}", log_file, err),
        }
    }

    if let Err(err) = dispatch.apply() {
        eprintln!("Failed to initialize logger: {}", err);
    }
}

pub fn run(args: Args) -> Result<(), AppRunError> {
    let overrides = args.overrides();
    overrides.validate()?;

    let path = match args.config {
        Some(path) => path,
        None => get_config_path()?,
    };
    let config_io = ConfigIO::new_sync(&path)?;

    run_application(config_io, overrides)?;
    Ok(())
}
