use futures::channel::mpsc::Sender;
use log::{debug, info, warn};

use crate::config::types::DiscoveryAlerts;
use crate::device::constants::{ensure_target, same_address};
use crate::device::platform::{BluetoothSerial, Permissions, SerialLink};
use crate::device::types::{ConnectionState, DeviceEvent, Notice, PairedDevice, Session};
use crate::keys::KeyDefinition;

/// Walks the startup sequence (permissions, radio, paired device lookup, connect) for one
/// peripheral address and owns the resulting link.
pub struct ConnectionManager<B: BluetoothSerial + Permissions> {
    bluetooth: B,
    target: String,
    alerts: DiscoveryAlerts,
    session: Session,
    link: Option<B::Link>,
    events: Option<Sender<DeviceEvent>>,
}

impl<B: BluetoothSerial + Permissions> ConnectionManager<B> {
    pub fn new(bluetooth: B, target: String, alerts: DiscoveryAlerts) -> Self {
        ConnectionManager {
            bluetooth,
            target,
            alerts,
            session: Session::default(),
            link: None,
            events: None,
        }
    }

    /// Publish a session snapshot on this sender whenever it changes.
    pub fn with_events(mut self, events: Sender<DeviceEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn publish(&mut self) {
        if let Some(events) = &mut self.events {
            if let Err(err) = events.try_send(DeviceEvent::SessionChange(self.session.clone())) {
                warn!("Failed to publish session: {:?}", err);
            }
        }
    }

    fn set_loading(&mut self, loading: bool) {
        self.session.loading = loading;
        self.publish();
    }

    fn set_stage(&mut self, stage: ConnectionState) {
        debug!("Connection state {:?} -> {:?}", self.session.stage, stage);
        self.session.stage = stage;
        self.publish();
    }

    fn is_connected_to_target(&self) -> bool {
        match &self.session.device {
            Some(device) => self.link.is_some() && same_address(&device.id, &self.target),
            None => false,
        }
    }

    pub async fn check_permissions(&mut self) -> Option<Notice> {
        if !self.bluetooth.requires_scan_grant() {
            debug!("No permission required to use Bluetooth");
            return None;
        }

        let granted = match self.bluetooth.scan_granted().await {
            Ok(true) => Ok(true),
            Ok(false) => {
                info!("Requesting permission to use Bluetooth");
                self.bluetooth.request_scan_grant().await
            },
            Err(err) => Err(err),
        };

        match granted {
            Ok(true) => {
                info!("Permission to use Bluetooth granted");
                None
            },
            Ok(false) => {
                warn!("Permission to use Bluetooth was refused");
                self.set_stage(ConnectionState::PermissionDenied);
                Some(Notice::PermissionDenied)
            },
            Err(err) => {
                warn!("Checking permissions failed: {:?}", err);
                self.set_stage(ConnectionState::PermissionDenied);
                Some(Notice::PermissionDenied)
            },
        }
    }

    pub async fn check_bluetooth_enabled(&mut self) -> Option<Notice> {
        self.set_loading(true);

        let result = match self.bluetooth.is_enabled().await {
            Ok(true) => Ok(()),
            Ok(false) => {
                info!("Bluetooth is off; requesting to enable it");
                self.bluetooth.request_enable().await
            },
            Err(err) => Err(err),
        };

        self.session.loading = false;

        match result {
            Ok(_) => {
                self.set_stage(ConnectionState::Disconnected);
                None
            },
            Err(err) => {
                warn!("Bluetooth is not available: {:?}", err);
                self.set_stage(ConnectionState::BluetoothDisabled);
                Some(Notice::BluetoothDisabled)
            },
        }
    }

    pub async fn search_for_device(&mut self) -> Vec<Notice> {
        if self.is_connected_to_target() {
            info!("Connection to module already present");
            return Vec::new();
        }

        if self.session.stage != ConnectionState::Disconnected {
            debug!("Not searching for module in state {:?}", self.session.stage);
            return Vec::new();
        }

        self.set_loading(true);
        let result = self.bluetooth.list().await;
        self.set_loading(false);

        let devices = match result {
            Ok(devices) => devices,
            Err(err) => {
                warn!("Listing paired devices failed: {:?}", err);
                return vec![Notice::ModuleNotFound];
            },
        };

        info!("{} paired device(s)", devices.len());

        match self.alerts {
            DiscoveryAlerts::Aggregate => {
                match devices.into_iter().find(|device| same_address(&device.id, &self.target)) {
                    Some(device) => {
                        info!("Found paired module {}", device);
                        vec![Notice::ModuleFound(device)]
                    },
                    None => {
                        info!("Module {} is not paired", self.target);
                        vec![Notice::ModuleNotFound]
                    },
                }
            },
            DiscoveryAlerts::PerDevice => {
                if devices.is_empty() {
                    return vec![Notice::ModuleNotFound];
                }

                devices
                    .into_iter()
                    .map(|device| {
                        if same_address(&device.id, &self.target) {
                            Notice::ModuleFound(device)
                        } else {
                            Notice::ModuleNotFound
                        }
                    })
                    .collect()
            },
        }
    }

    /// Runs the sequence up to (not including) the connect step. Stops at the first step that
    /// fails; the returned notices are to be shown in order.
    pub async fn startup(&mut self) -> Vec<Notice> {
        if let Some(notice) = self.check_permissions().await {
            return vec![notice];
        }

        if let Some(notice) = self.check_bluetooth_enabled().await {
            return vec![notice];
        }

        self.search_for_device().await
    }

    pub async fn connect_to_device(&mut self, device: PairedDevice) -> Option<Notice> {
        if self.is_connected_to_target() {
            info!("Connection to module already present");
            return None;
        }

        self.session.loading = true;
        self.set_stage(ConnectionState::Connecting);

        let result = match ensure_target(&device.id, &self.target) {
            Ok(_) => self.bluetooth.connect(&device.id).await,
            Err(err) => Err(err),
        };
        self.session.loading = false;

        match result {
            Ok(link) => {
                info!("Connected to {}", device);
                self.link = Some(link);
                self.session.device = Some(device);
                self.set_stage(ConnectionState::Connected);
                Some(Notice::Connected)
            },
            Err(err) => {
                warn!("Connecting to {} failed: {:?}", device, err);
                self.link = None;
                self.session.device = None;
                self.set_stage(ConnectionState::Disconnected);
                Some(Notice::ConnectionFailed)
            },
        }
    }

    /// Sends the code of a pressed key. Never fails: errors are logged and the press is lost.
    pub async fn write_code(&self, key: KeyDefinition) {
        let link = match &self.link {
            Some(link) => link,
            None => {
                warn!("Not connected; dropping key {}", key);
                return;
            },
        };

        match link.write(key.code_str().as_bytes()).await {
            Ok(_) => debug!("Sent {:?} for key {}", key.code, key),
            Err(err) => warn!("Failed to send {:?} for key {}: {:?}", key.code, key, err),
        }
    }
}
