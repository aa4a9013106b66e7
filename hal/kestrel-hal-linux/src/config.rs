//! Serial device configuration
//!
//! ```toml
//! device = "/dev/ttyACM0"
//! baudrate = 19200
//! parity = "even"
//! ```
//!
//! Every key is optional; missing ones fall back to `/dev/ttyUSB0` at
//! 57600 baud, 8N1.

use kestrel_hal::UartConfig;
use serde::{Deserialize, Serialize};

use crate::device::SerialDevice;
use crate::LinuxSerialError;

/// Default device node
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Which tty to open and how to frame it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialDeviceConfig {
    /// Device node path
    pub device: String,
    /// Baud rate and frame format
    #[serde(flatten)]
    pub uart: UartConfig,
}

impl Default for SerialDeviceConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            uart: UartConfig::default(),
        }
    }
}

impl SerialDeviceConfig {
    pub fn new(device: impl Into<String>, baudrate: u32) -> Self {
        Self {
            device: device.into(),
            uart: UartConfig::new_8n1(baudrate),
        }
    }

    /// Parse from TOML and check the baud rate
    pub fn from_toml_str(text: &str) -> Result<Self, LinuxSerialError> {
        let config: Self = toml::from_str(text)?;
        SerialDevice::check_baud_rate(config.uart.baudrate)?;
        Ok(config)
    }

    pub fn open(&self) -> Result<SerialDevice, LinuxSerialError> {
        SerialDevice::open_with(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_hal::{DataBits, Parity, StopBits};

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = SerialDeviceConfig::from_toml_str("").unwrap();
        assert_eq!(config, SerialDeviceConfig::default());
        assert_eq!(config.device, "/dev/ttyUSB0");
        assert_eq!(config.uart.baudrate, 57_600);
    }

    #[test]
    fn test_full_toml() {
        let text = r#"
            device = "/dev/ttyACM0"
            baudrate = 19200
            data_bits = "seven"
            parity = "even"
            stop_bits = "two"
        "#;
        let config = SerialDeviceConfig::from_toml_str(text).unwrap();
        assert_eq!(config.device, "/dev/ttyACM0");
        assert_eq!(config.uart.baudrate, 19_200);
        assert_eq!(config.uart.data_bits, DataBits::Seven);
        assert_eq!(config.uart.parity, Parity::Even);
        assert_eq!(config.uart.stop_bits, StopBits::Two);
    }

    #[test]
    fn test_rejects_unsupported_baud() {
        let err = SerialDeviceConfig::from_toml_str("baudrate = 12345").unwrap_err();
        assert!(matches!(err, LinuxSerialError::UnsupportedBaudRate(12_345)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = SerialDeviceConfig::from_toml_str("baudrate = \"fast\"").unwrap_err();
        assert!(matches!(err, LinuxSerialError::Config(_)));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = SerialDeviceConfig::new("/dev/ttyS1", 4_800);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(SerialDeviceConfig::from_toml_str(&text).unwrap(), config);
    }
}
