use crate::error::DeviceError;

/**
 * Hardware address of the HC-06 module the app talks to.
 */
pub const PERIPHERAL_ADDRESS: &str = "00:22:09:02:68:3E";

/**
 * How many key presses may be queued for the connection task before new presses are dropped.
 */
pub const KEY_QUEUE_SIZE: usize = 32;

/**
 * How many device events may be buffered for the GUI.
 */
pub const EVENT_QUEUE_SIZE: usize = 64;

/**
 * RFCOMM channel of the Serial Port Profile service on the HC-06.
 */
#[cfg(target_os = "linux")]
pub const SPP_CHANNEL: u8 = 1;

/**
 * The serial device the operating system binds to a paired SPP module. Not used on Linux, where
 * the RFCOMM socket is opened directly.
 */
#[cfg(target_os = "linux")]
pub const DEFAULT_SERIAL_PORT: &str = "/dev/rfcomm0";

#[cfg(target_os = "windows")]
pub const DEFAULT_SERIAL_PORT: &str = "COM5";

#[cfg(target_os = "macos")]
pub const DEFAULT_SERIAL_PORT: &str = "/dev/cu.HC-06";

#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
pub const DEFAULT_SERIAL_PORT: &str = "/dev/rfcomm0";

/// Compares two hardware addresses, ignoring case and surrounding whitespace.
pub fn same_address(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Only the configured module may be connected to; any other id is refused before the link opens.
pub fn ensure_target(id: &str, target: &str) -> Result<(), DeviceError> {
    if same_address(id, target) {
        Ok(())
    } else {
        Err(DeviceError::UnknownDevice { id: id.to_string() })
    }
}

/// A valid address is six two-digit hex groups separated by colons.
pub fn is_valid_address(address: &str) -> bool {
    let groups: Vec<&str> = address.split(':').collect();
    groups.len() == 6
        && groups.iter().all(|group| group.len() == 2 && group.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_comparison_ignores_case() {
        assert!(same_address(PERIPHERAL_ADDRESS, "00:22:09:02:68:3e"));
        assert!(same_address(" 00:22:09:02:68:3E", PERIPHERAL_ADDRESS));
        assert!(!same_address(PERIPHERAL_ADDRESS, "00:22:09:02:68:3F"));
    }

    #[test]
    fn only_the_target_may_connect() {
        assert!(ensure_target("00:22:09:02:68:3e", PERIPHERAL_ADDRESS).is_ok());
        assert!(matches!(
            ensure_target("11:22:33:44:55:66", PERIPHERAL_ADDRESS),
            Err(DeviceError::UnknownDevice { id }) if id == "11:22:33:44:55:66"
        ));
    }

    #[test]
    fn address_validation() {
        assert!(is_valid_address(PERIPHERAL_ADDRESS));
        assert!(is_valid_address("aa:bb:cc:dd:ee:ff"));
        assert!(!is_valid_address("00:22:09:02:68"));
        assert!(!is_valid_address("00:22:09:02:68:3G"));
        assert!(!is_valid_address("0022:09:02:68:3E:00"));
        assert!(!is_valid_address(""));
    }
}
