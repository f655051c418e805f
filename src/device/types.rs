use futures::channel::mpsc::Sender;

use crate::keys::KeyDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    NotChecked,
    PermissionDenied,
    BluetoothDisabled,
    Disconnected,
    Connecting,
    Connected,
}

/// A peer bonded with this machine at the OS level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedDevice {
    pub id: String,
    pub name: Option<String>,
}

impl std::fmt::Display for PairedDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub stage: ConnectionState,
    // drives the loading indicator
    pub loading: bool,
    pub device: Option<PairedDevice>,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            stage: ConnectionState::NotChecked,
            loading: false,
            device: None,
        }
    }
}

impl Session {
    /// The device the link is open to, once connected.
    pub fn connected_device(&self) -> Option<&PairedDevice> {
        match self.stage {
            ConnectionState::Connected => self.device.as_ref(),
            _ => None,
        }
    }
}

/// How the user may respond to a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeActions {
    // "Okay" closes the application
    Exit,
    // "Okay" only closes the notice
    Dismiss,
    // "Yes" connects, "No" closes the application
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PermissionDenied,
    BluetoothDisabled,
    ModuleFound(PairedDevice),
    ModuleNotFound,
    ConnectionFailed,
    Connected,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::PermissionDenied => "Required permissions were not granted!",
            Notice::BluetoothDisabled => "Bluetooth is off!",
            Notice::ModuleFound(_) => "Paired HC-06 module found!",
            Notice::ModuleNotFound => "Paired HC-06 module not found!",
            Notice::ConnectionFailed => "Could not connect to the HC-06 module!",
            Notice::Connected => "Connected to the HC-06 module!",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Notice::PermissionDenied => "Please grant the required permissions for the application to work properly.",
            Notice::BluetoothDisabled => "Bluetooth must be turned on for the application to work properly.",
            Notice::ModuleFound(_) => "An HC-06 module paired with this computer was found. Connect to it?",
            Notice::ModuleNotFound => "Please make sure the module is paired with this computer and try again.",
            Notice::ConnectionFailed => "Could not connect to the paired module. Please make sure the module is powered on.",
            Notice::Connected => "",
        }
    }

    pub fn actions(&self) -> NoticeActions {
        match self {
            Notice::ModuleFound(_) => NoticeActions::Confirm,
            Notice::Connected => NoticeActions::Dismiss,
            _ => NoticeActions::Exit,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DeviceEvent {
    // the connection task is running and accepts commands on this sender
    Ready(Sender<DeviceCommand>),
    SessionChange(Session),
    Notice(Notice),
}

#[derive(Debug, Clone)]
pub enum DeviceCommand {
    // answer to a Notice::ModuleFound prompt
    ConnectConfirmed(PairedDevice),
    KeyPress(KeyDefinition),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_is_dismissable() {
        let device = PairedDevice { id: "00:22:09:02:68:3E".to_string(), name: None };
        assert_eq!(Notice::Connected.actions(), NoticeActions::Dismiss);
        assert_eq!(Notice::ModuleFound(device).actions(), NoticeActions::Confirm);
        for notice in [Notice::PermissionDenied, Notice::BluetoothDisabled, Notice::ModuleNotFound, Notice::ConnectionFailed] {
            assert_eq!(notice.actions(), NoticeActions::Exit, "{:?}", notice);
        }
    }

    #[test]
    fn new_session_is_unchecked() {
        let session = Session::default();
        assert_eq!(session.stage, ConnectionState::NotChecked);
        assert!(!session.loading);
        assert_eq!(session.connected_device(), None);
    }

    #[test]
    fn paired_device_display() {
        let device = PairedDevice { id: "00:22:09:02:68:3E".to_string(), name: Some("HC-06".to_string()) };
        assert_eq!(device.to_string(), "HC-06 (00:22:09:02:68:3E)");
    }
}
