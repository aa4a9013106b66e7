use std::fmt;

/// Errors from the Linux serial backend
#[derive(Debug)]
pub enum LinuxSerialError {
    /// Baud rate outside the supported set
    UnsupportedBaudRate(u32),
    /// The device could not be opened or configured
    Open {
        device: String,
        source: serialport::Error,
    },
    /// Read or write failed
    Io(std::io::Error),
    /// Configuration file could not be parsed
    Config(toml::de::Error),
}

impl fmt::Display for LinuxSerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinuxSerialError::UnsupportedBaudRate(baud) => {
                write!(f, "unsupported baud rate {baud}")
            }
            LinuxSerialError::Open { device, source } => {
                write!(f, "failed to open {device}: {source}")
            }
            LinuxSerialError::Io(err) => write!(f, "serial I/O error: {err}"),
            LinuxSerialError::Config(err) => write!(f, "invalid serial config: {err}"),
        }
    }
}

impl std::error::Error for LinuxSerialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinuxSerialError::UnsupportedBaudRate(_) => None,
            LinuxSerialError::Open { source, .. } => Some(source),
            LinuxSerialError::Io(err) => Some(err),
            LinuxSerialError::Config(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for LinuxSerialError {
    fn from(err: std::io::Error) -> Self {
        LinuxSerialError::Io(err)
    }
}

impl From<toml::de::Error> for LinuxSerialError {
    fn from(err: toml::de::Error) -> Self {
        LinuxSerialError::Config(err)
    }
}
