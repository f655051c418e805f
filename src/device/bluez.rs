use bluer::rfcomm::{SocketAddr, Stream};
use bluer::{Adapter, Address, Session};
use log::{info, warn};
use tokio::sync::OnceCell;

use crate::device::constants::{ensure_target, SPP_CHANNEL};
use crate::device::platform::{BluetoothSerial, Permissions};
use crate::device::serial::StreamLink;
use crate::device::types::PairedDevice;
use crate::error::DeviceError;

/// Bonded devices and the RFCOMM socket come straight from BlueZ.
pub struct BluezBluetooth {
    adapter: OnceCell<Adapter>,
    target: String,
}

impl BluezBluetooth {
    pub fn new(target: String) -> Self {
        BluezBluetooth {
            adapter: OnceCell::new(),
            target,
        }
    }

    async fn adapter(&self) -> Result<&Adapter, DeviceError> {
        self.adapter
            .get_or_try_init(|| async {
                let session = Session::new().await?;
                if session.adapter_names().await?.is_empty() {
                    return Err(DeviceError::NoAdapter);
                }

                let adapter = session.default_adapter().await?;
                info!("Using adapter {}", adapter.name());
                Ok(adapter)
            })
            .await
    }
}

/// A bonded peer as BlueZ reports it, or None for devices that were only seen.
fn paired_device(address: Address, paired: bool, name: Option<String>) -> Option<PairedDevice> {
    if paired {
        Some(PairedDevice { id: address.to_string(), name })
    } else {
        None
    }
}

fn parse_address(id: &str) -> Result<Address, DeviceError> {
    id.trim()
        .parse()
        .map_err(|_| DeviceError::UnknownDevice { id: id.to_string() })
}

// BlueZ gates access through D-Bus policy rather than a user prompt
impl Permissions for BluezBluetooth {
    fn requires_scan_grant(&self) -> bool {
        false
    }

    async fn scan_granted(&self) -> Result<bool, DeviceError> {
        Ok(true)
    }

    async fn request_scan_grant(&self) -> Result<bool, DeviceError> {
        Ok(true)
    }
}

impl BluetoothSerial for BluezBluetooth {
    type Link = StreamLink<Stream>;

    async fn is_enabled(&self) -> Result<bool, DeviceError> {
        let powered = self.adapter().await?.is_powered().await?;
        info!("Adapter powered: {}", powered);
        Ok(powered)
    }

    async fn request_enable(&self) -> Result<(), DeviceError> {
        let adapter = self.adapter().await?;

        if let Err(err) = adapter.set_powered(true).await {
            let err = DeviceError::from(err);
            if err.is_permission_denied() {
                warn!("Not allowed to power on the adapter: {}", err);
            }
            warn!("Bluetooth is off; turn it on in the system settings and restart the application");
            return Err(err);
        }

        if adapter.is_powered().await? {
            info!("Bluetooth turned on");
            Ok(())
        } else {
            warn!("Bluetooth is off; turn it on in the system settings and restart the application");
            Err(DeviceError::RadioDisabled)
        }
    }

    async fn list(&self) -> Result<Vec<PairedDevice>, DeviceError> {
        let adapter = self.adapter().await?;
        let mut devices = Vec::new();

        for address in adapter.device_addresses().await? {
            let device = adapter.device(address)?;

            let paired = match device.is_paired().await {
                Ok(paired) => paired,
                Err(err) => {
                    warn!("Could not query {} for its bond: {}", address, err);
                    continue;
                },
            };
            let name = device.name().await.unwrap_or_default();

            if let Some(device) = paired_device(address, paired, name) {
                devices.push(device);
            }
        }

        Ok(devices)
    }

    async fn connect(&self, id: &str) -> Result<StreamLink<Stream>, DeviceError> {
        ensure_target(id, &self.target)?;
        let address = parse_address(id)?;

        info!("Opening RFCOMM channel {} to {}", SPP_CHANNEL, address);
        let stream = Stream::connect(SocketAddr::new(address, SPP_CHANNEL)).await?;
        Ok(StreamLink::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::constants::PERIPHERAL_ADDRESS;

    #[test]
    fn only_bonded_devices_are_listed() {
        let address = Address::new([0x00, 0x22, 0x09, 0x02, 0x68, 0x3E]);

        assert_eq!(paired_device(address, false, Some("HC-06".to_string())), None);
        assert_eq!(
            paired_device(address, true, Some("HC-06".to_string())),
            Some(PairedDevice { id: PERIPHERAL_ADDRESS.to_string(), name: Some("HC-06".to_string()) }),
        );
    }

    #[test]
    fn device_ids_parse_as_addresses() {
        assert_eq!(parse_address(" 00:22:09:02:68:3e").unwrap(), Address::new([0x00, 0x22, 0x09, 0x02, 0x68, 0x3E]));
        assert!(matches!(parse_address("HC-06"), Err(DeviceError::UnknownDevice { .. })));
    }

    #[tokio::test]
    async fn other_devices_are_refused_before_opening_a_socket() {
        let bluetooth = BluezBluetooth::new(PERIPHERAL_ADDRESS.to_string());
        assert!(matches!(
            bluetooth.connect("11:22:33:44:55:66").await,
            Err(DeviceError::UnknownDevice { .. })
        ));
    }
}
