use std::io;
use thiserror::Error;
use msgbox::IconType;
use std::fmt::Display;
use std::str::Utf8Error;
use iced;
use serde_json;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine path to config file")]
    NoConfigPath,

    #[error("Failed to acquire file lock on config file: {source}")]
    CanNotLock { source: io::Error },

    #[error("Failed to encode/decode config as utf-8: {source}")]
    Utf8Error { #[from] source: Utf8Error },

    #[error("Failed to read/write config file: {source}")]
    IOError { #[from] source: io::Error },

    #[error("Failed to parse/build config file: {source}")]
    JsonError { #[from] source: serde_json::Error },

    #[error("Invalid peripheral address \"{address}\", expected six hex pairs like 00:22:09:02:68:3E")]
    InvalidAddress { address: String },
}

#[derive(Error, Debug)]
pub enum AppRunError {
    #[error("Failed to start application (iced): {source}")]
    Iced { #[from] source: iced::Error },

    #[error("Failed to start application (config): {source}")]
    ConfigError { #[from] source: ConfigError },
}

#[derive(Error, Debug)]
pub enum DeviceError {
    #[cfg(not(target_os = "linux"))]
    #[error("Error communicating with device (btleplug): {source}")]
    Btle { #[from] source: btleplug::Error },

    #[cfg(target_os = "linux")]
    #[error("Error communicating with device (bluez): {source}")]
    Bluez { #[from] source: bluer::Error },

    #[error("Error communicating with serial port: {source}")]
    Io { #[from] source: io::Error },

    #[error("Bluetooth is turned off")]
    RadioDisabled,

    #[error("No Bluetooth adapter available")]
    NoAdapter,

    #[error("Device \"{id}\" is not the configured module")]
    UnknownDevice { id: String },
}

impl DeviceError {
    pub fn is_permission_denied(&self) -> bool {
        match self {
            #[cfg(not(target_os = "linux"))]
            DeviceError::Btle { source: btleplug::Error::PermissionDenied } => true,
            #[cfg(target_os = "linux")]
            DeviceError::Bluez { source } => matches!(
                source.kind,
                bluer::ErrorKind::NotAuthorized | bluer::ErrorKind::NotPermitted
            ),
            _ => false,
        }
    }
}

pub fn error_msgbox<T: Display>(message: &'static str, error: &T) {
    let message = format!("{}: {}", message, error);
    eprintln!("{}", &message);
    if let Err(err) = msgbox::create(concat!("Mini Piano ", env!("CARGO_PKG_VERSION")), &message, IconType::Error) {
        eprintln!("Failed to create msgbox: {:?}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "linux"))]
    #[test]
    fn permission_denied_is_detected_through_btleplug() {
        assert!(DeviceError::from(btleplug::Error::PermissionDenied).is_permission_denied());
    }

    #[test]
    fn other_errors_are_not_permission_errors() {
        assert!(!DeviceError::RadioDisabled.is_permission_denied());
        assert!(!DeviceError::NoAdapter.is_permission_denied());
        assert!(!DeviceError::from(io::Error::from(io::ErrorKind::BrokenPipe)).is_permission_denied());
    }

    #[test]
    fn error_messages_name_the_culprit() {
        let err = ConfigError::InvalidAddress { address: "nope".to_string() };
        assert!(err.to_string().contains("nope"));

        let err = DeviceError::UnknownDevice { id: "11:22:33:44:55:66".to_string() };
        assert!(err.to_string().contains("11:22:33:44:55:66"));
    }
}
