use std::path::PathBuf;
use btleplug::api::{Central, CentralState, Manager as _, ScanFilter};
use btleplug::platform::{Adapter, Manager};
use log::{info, warn};
use tokio::fs::File;
use tokio::sync::OnceCell;

use crate::device::constants::ensure_target;
use crate::device::platform::{BluetoothSerial, Permissions};
use crate::device::serial::{open_port, StreamLink};
use crate::device::types::PairedDevice;
use crate::error::DeviceError;

/// Radio state comes from btleplug. Classic SPP modules are invisible to it, so the paired module
/// is the one the OS bound to `serial_port`, and that port is the data link.
pub struct BtleBluetooth {
    manager: OnceCell<Manager>,
    target: String,
    serial_port: PathBuf,
}

impl BtleBluetooth {
    pub fn new(target: String, serial_port: PathBuf) -> Self {
        BtleBluetooth {
            manager: OnceCell::new(),
            target,
            serial_port,
        }
    }

    async fn manager(&self) -> Result<&Manager, DeviceError> {
        self.manager
            .get_or_try_init(|| async { Ok::<_, DeviceError>(Manager::new().await?) })
            .await
    }

    async fn adapters(&self) -> Result<Vec<Adapter>, DeviceError> {
        let adapters = self.manager().await?.adapters().await?;
        Ok(adapters)
    }
}

impl Permissions for BtleBluetooth {
    // macOS asks the user before an app may touch Bluetooth
    fn requires_scan_grant(&self) -> bool {
        cfg!(target_os = "macos")
    }

    async fn scan_granted(&self) -> Result<bool, DeviceError> {
        match self.adapters().await {
            Ok(_) => Ok(true),
            Err(err) if err.is_permission_denied() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn request_scan_grant(&self) -> Result<bool, DeviceError> {
        let adapters = match self.adapters().await {
            Ok(adapters) => adapters,
            Err(err) if err.is_permission_denied() => return Ok(false),
            Err(err) => return Err(err),
        };

        // the first scan triggers the system prompt
        for adapter in &adapters {
            match adapter.start_scan(ScanFilter::default()).await {
                Ok(_) => {
                    if let Err(err) = adapter.stop_scan().await {
                        warn!("Failed to stop scan: {:?}", err);
                    }
                },
                Err(btleplug::Error::PermissionDenied) => return Ok(false),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(true)
    }
}

impl BluetoothSerial for BtleBluetooth {
    type Link = StreamLink<File>;

    async fn is_enabled(&self) -> Result<bool, DeviceError> {
        for adapter in self.adapters().await? {
            let state = adapter.adapter_state().await?;
            info!(
                "Adapter {} is {:?}",
                adapter.adapter_info().await.unwrap_or("UNKNOWN".to_string()),
                state,
            );

            if matches!(state, CentralState::PoweredOn) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    // Desktop platforms offer no "turn on Bluetooth" prompt, so the best that can be done is
    // to check once more in case the user switched it on in the meantime.
    async fn request_enable(&self) -> Result<(), DeviceError> {
        let adapters = self.adapters().await?;
        if adapters.is_empty() {
            return Err(DeviceError::NoAdapter);
        }

        if self.is_enabled().await? {
            Ok(())
        } else {
            warn!("Bluetooth is off; turn it on in the system settings and restart the application");
            Err(DeviceError::RadioDisabled)
        }
    }

    // the OS only creates the port for a bonded module
    async fn list(&self) -> Result<Vec<PairedDevice>, DeviceError> {
        match open_port(&self.serial_port).await {
            Ok(_) => Ok(vec![PairedDevice {
                id: self.target.clone(),
                name: Some(self.serial_port.to_string_lossy().into_owned()),
            }]),
            Err(err) => {
                info!("No module bound to {}: {}", self.serial_port.to_string_lossy(), err);
                Ok(Vec::new())
            },
        }
    }

    async fn connect(&self, id: &str) -> Result<StreamLink<File>, DeviceError> {
        ensure_target(id, &self.target)?;
        info!("Connecting to {} through {}", id, self.serial_port.to_string_lossy());
        open_port(&self.serial_port).await
    }
}
