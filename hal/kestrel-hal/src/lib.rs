//! Hardware traits for the Kestrel serial stack
//!
//! Defines the seams used by the interrupt-driven
//! serial transport in `kestrel-core`. Chip-specific crates implement them
//! on real registers; host crates implement them in software.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application                            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  kestrel-core (Fifo, Usart driver)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  kestrel-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ kestrel-hal-  │       │ kestrel-hal-  │
//! │     avr       │       │    linux      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`interrupt::InterruptControl`] - Per-source interrupt masking
//! - [`uart::DataRegister`] - Byte-wide serial data port
//! - [`uart::UartTx`], [`uart::UartRx`] - Blocking serial communication
//! - [`memory::ByteSource`] - Byte access to RAM or program memory

#![no_std]
#![deny(unsafe_code)]

pub mod interrupt;
pub mod memory;
pub mod uart;

pub use interrupt::{FlagInterrupts, InterruptControl, IrqSource};
pub use memory::{ByteSource, MemoryLocation};
pub use uart::{DataBits, DataRegister, Parity, StopBits, UartConfig, UartRx, UartTx};
