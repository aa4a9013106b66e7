//! Serial tty device
//!
//! Counterpart of the interrupt-driven MCU transport for programs running
//! on Linux: the kernel does the buffering, so reads and writes go straight
//! to the device. Ports are opened raw with a one second read timeout.

use std::io::{self, Read, Write};
use std::time::Duration;

use kestrel_hal::{DataBits, Parity, StopBits, UartRx, UartTx};
use serialport::{ClearBuffer, FlowControl, SerialPort};

use crate::config::SerialDeviceConfig;
use crate::LinuxSerialError;

/// Longest a read waits for the first byte
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Open serial device
pub struct SerialDevice {
    port: Box<dyn SerialPort>,
    device: String,
}

impl SerialDevice {
    /// Baud rates the device can be opened with
    pub const SUPPORTED_BAUD_RATES: [u32; 6] = [4_800, 9_600, 19_200, 38_400, 57_600, 115_200];

    pub fn check_baud_rate(baudrate: u32) -> Result<(), LinuxSerialError> {
        if Self::SUPPORTED_BAUD_RATES.contains(&baudrate) {
            Ok(())
        } else {
            Err(LinuxSerialError::UnsupportedBaudRate(baudrate))
        }
    }

    /// Open `device` at `baudrate`, 8N1
    pub fn open(device: &str, baudrate: u32) -> Result<Self, LinuxSerialError> {
        Self::open_with(&SerialDeviceConfig::new(device, baudrate))
    }

    /// Open the device described by `config`
    ///
    /// The baud rate is validated before the device is touched. Pending
    /// input and output are discarded after opening.
    pub fn open_with(config: &SerialDeviceConfig) -> Result<Self, LinuxSerialError> {
        let uart = &config.uart;
        Self::check_baud_rate(uart.baudrate)?;

        let open_error = |source| LinuxSerialError::Open {
            device: config.device.clone(),
            source,
        };

        let port = serialport::new(config.device.as_str(), uart.baudrate)
            .data_bits(match uart.data_bits {
                DataBits::Seven => serialport::DataBits::Seven,
                DataBits::Eight => serialport::DataBits::Eight,
            })
            .parity(match uart.parity {
                Parity::None => serialport::Parity::None,
                Parity::Even => serialport::Parity::Even,
                Parity::Odd => serialport::Parity::Odd,
            })
            .stop_bits(match uart.stop_bits {
                StopBits::One => serialport::StopBits::One,
                StopBits::Two => serialport::StopBits::Two,
            })
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(open_error)?;

        port.clear(ClearBuffer::All).map_err(open_error)?;

        log::info!(
            "opened {} at {} baud ({:?}, {:?}, {:?})",
            config.device,
            uart.baudrate,
            uart.data_bits,
            uart.parity,
            uart.stop_bits
        );

        Ok(Self {
            port,
            device: config.device.clone(),
        })
    }

    /// Device node this port was opened from
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Baud rate currently set on the device
    pub fn baud_rate(&self) -> Result<u32, LinuxSerialError> {
        self.port
            .baud_rate()
            .map_err(|err| LinuxSerialError::Io(err.into()))
    }

    /// Read what is available, waiting up to [`READ_TIMEOUT`] for a byte
    ///
    /// A timeout is not an error and yields `Ok(0)`.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinuxSerialError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(err) if matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {
                Ok(0)
            }
            Err(err) => {
                log::warn!("{}: read failed: {}", self.device, err);
                Err(err.into())
            }
        }
    }

    /// Write `data`, returning how much the kernel accepted
    pub fn write(&mut self, data: &[u8]) -> Result<usize, LinuxSerialError> {
        self.port.write(data).map_err(|err| {
            log::warn!("{}: write failed: {}", self.device, err);
            err.into()
        })
    }

    /// Write `text` up to its first NUL byte
    pub fn write_string(&mut self, text: &str) -> Result<usize, LinuxSerialError> {
        self.write_text(text)
    }
}

impl UartTx for SerialDevice {
    type Error = LinuxSerialError;

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        SerialDevice::write(self, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.port.flush()?;
        Ok(())
    }
}

impl UartRx for SerialDevice {
    type Error = LinuxSerialError;

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        SerialDevice::read(self, buf)
    }
}

impl Drop for SerialDevice {
    fn drop(&mut self) {
        log::debug!("closing {}", self.device);
    }
}
