//! Linux backend for the Kestrel serial stack
//!
//! Two ways to talk serial from a Linux host:
//!
//! - [`SerialDevice`] - a real tty (USB adapter, on-board UART) opened raw
//!   via `serialport`, configured from code or a TOML file
//!   ([`SerialDeviceConfig`])
//! - [`SimulatedUsart`] - an in-memory peripheral that runs the MCU
//!   transport from `kestrel-core` unchanged, with a dispatcher thread in
//!   place of the interrupt controller
//!
//! Logging goes through the `log` facade; install any logger to see it.

pub mod config;
pub mod delay;
pub mod device;
mod error;
pub mod sim;

pub use config::SerialDeviceConfig;
pub use delay::StdDelay;
pub use device::SerialDevice;
pub use error::LinuxSerialError;
pub use sim::SimulatedUsart;
