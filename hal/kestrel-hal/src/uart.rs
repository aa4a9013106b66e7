//! Serial port traits
//!
//! Provides the register-level data port used by interrupt handlers, and
//! blocking traits for serial ports that are driven by an operating system.

/// Byte-wide serial data register
///
/// Reading returns the most recently received byte; writing starts the
/// transmission of one byte. Interrupt handlers call these, so they take
/// `&self`.
pub trait DataRegister {
    /// Read the received byte
    fn read_data(&self) -> u8;

    /// Write a byte for transmission
    fn write_data(&self, byte: u8);
}

/// Sending half of an OS-driven serial port
///
/// Calls block until the driver has taken the bytes.
pub trait UartTx {
    /// Failure reported by the port
    type Error;

    /// Queue `data` for sending
    ///
    /// Returns the number of bytes accepted.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Write a string, stopping at the first NUL byte if any
    fn write_text(&mut self, text: &str) -> Result<usize, Self::Error> {
        let bytes = text.as_bytes();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.write_bytes(&bytes[..end])
    }

    /// Wait until queued bytes have left the port
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Receiving half of an OS-driven serial port
pub trait UartRx {
    /// Failure reported by the port
    type Error;

    /// Copy whatever has arrived into `buf`
    ///
    /// Returns the number of bytes read, which may be zero.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Line settings for a serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UartConfig {
    /// Line speed in bits per second
    pub baudrate: u32,
    /// Character size
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new_8n1(57_600)
    }
}

impl UartConfig {
    /// 8 data bits, no parity, 1 stop bit at the given baud rate
    pub const fn new_8n1(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Character size in bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity bit appended to each character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Stop bits closing each character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sink {
        written: [u8; 8],
        len: usize,
    }

    impl UartTx for Sink {
        type Error = ();

        fn write_bytes(&mut self, data: &[u8]) -> Result<usize, ()> {
            self.written[self.len..self.len + data.len()].copy_from_slice(data);
            self.len += data.len();
            Ok(data.len())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_config_is_8n1() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 57_600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }

    #[test]
    fn test_write_text_stops_at_nul() {
        let mut sink = Sink {
            written: [0; 8],
            len: 0,
        };
        let n = sink.write_text("ab\0cd").unwrap();
        assert_eq!(n, 2);
        assert_eq!(&sink.written[..sink.len], b"ab");
    }
}
