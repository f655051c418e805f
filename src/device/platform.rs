use std::future::Future;

use crate::device::types::PairedDevice;
use crate::error::DeviceError;

/// Whether this environment needs an explicit grant before Bluetooth can be used.
pub trait Permissions {
    fn requires_scan_grant(&self) -> bool;

    fn scan_granted(&self) -> impl Future<Output = Result<bool, DeviceError>> + Send;

    /// Asks the user for the grant. Resolves to false if the user refused.
    fn request_scan_grant(&self) -> impl Future<Output = Result<bool, DeviceError>> + Send;
}

/// An open serial connection. Writes are whole; nothing is ever read back.
pub trait SerialLink {
    fn write(&self, data: &[u8]) -> impl Future<Output = Result<(), DeviceError>> + Send;
}

pub trait BluetoothSerial {
    type Link: SerialLink + Send + Sync + 'static;

    fn is_enabled(&self) -> impl Future<Output = Result<bool, DeviceError>> + Send;

    fn request_enable(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// Devices already bonded with this machine, no active scan.
    fn list(&self) -> impl Future<Output = Result<Vec<PairedDevice>, DeviceError>> + Send;

    fn connect(&self, id: &str) -> impl Future<Output = Result<Self::Link, DeviceError>> + Send;
}
