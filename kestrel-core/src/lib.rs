//! Board-agnostic core of the Kestrel HAL
//!
//! This crate contains the parts of the serial stack that do not depend on
//! a specific chip:
//!
//! - Fixed-capacity buffers ([`buffer::Fifo`], [`buffer::HistoryBuffer`])
//! - Interrupt-driven USART transport ([`usart::Usart`]) built on the
//!   `kestrel-hal` traits
//!
//! Everything is statically allocated and usable from a `static`.

#![no_std]

pub mod buffer;
pub mod usart;

pub use buffer::{Fifo, HistoryBuffer};
pub use usart::{Receiver, Transmitter, Usart, UsartError};
