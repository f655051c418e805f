use serde::{Deserialize, Serialize};

use crate::device::constants::{is_valid_address, DEFAULT_SERIAL_PORT, PERIPHERAL_ADDRESS};
use crate::error::ConfigError;

/// How the outcome of the paired device lookup is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscoveryAlerts {
    // one notice for the whole list
    Aggregate,
    // one notice for every paired device
    PerDevice,
}

impl Default for DiscoveryAlerts {
    fn default() -> Self {
        DiscoveryAlerts::Aggregate
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub peripheral_address: String,
    // Windows and macOS only; Linux opens the RFCOMM socket itself
    pub serial_port: String,
    pub discovery_alerts: DiscoveryAlerts,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_address(&self.peripheral_address) {
            return Err(ConfigError::InvalidAddress { address: self.peripheral_address.clone() });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            peripheral_address: PERIPHERAL_ADDRESS.to_string(),
            serial_port: DEFAULT_SERIAL_PORT.to_string(),
            discovery_alerts: DiscoveryAlerts::default(),
        }
    }
}

/// Values given on the command line; they win over the config file for this launch only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub peripheral_address: Option<String>,
    pub serial_port: Option<String>,
    pub per_device_alerts: bool,
}

impl ConfigOverrides {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.peripheral_address {
            Some(address) if !is_valid_address(address) => {
                Err(ConfigError::InvalidAddress { address: address.clone() })
            },
            _ => Ok(()),
        }
    }

    pub fn apply(&self, config: &mut Config) {
        if let Some(address) = &self.peripheral_address {
            config.peripheral_address = address.clone();
        }
        if let Some(serial_port) = &self.serial_port {
            config.serial_port = serial_port.clone();
        }
        if self.per_device_alerts {
            config.discovery_alerts = DiscoveryAlerts::PerDevice;
        }
    }
}
