//! Interrupt-driven USART transport
//!
//! Two FIFOs connect the serial data register with application code:
//!
//! ```text
//!            receive interrupt                  Receiver
//! data reg ─────────────────────▶ [rx fifo] ─────────────▶ application
//!
//!            transmit interrupt                 Transmitter
//! data reg ◀───────────────────── [tx fifo] ◀───────────── application
//! ```
//!
//! Each FIFO has one producer and one consumer, fixed by direction. The
//! application side masks the interrupt source of the FIFO it touches for
//! the duration of the access; the handler side needs no protection since
//! an interrupt cannot preempt itself.
//!
//! Overflow policies differ on purpose:
//! - receive drops bytes that arrive while the FIFO is full, the handler
//!   must never wait;
//! - transmit blocks the writer until space frees up, nothing is lost.
//!
//! # Usage
//!
//! ```ignore
//! static SERIAL: Usart<Usart0> = Usart::new(unsafe { Usart0::new() });
//!
//! SERIAL.peripheral().init(Baud::<16_000_000, 19_200>::UBRR);
//! SERIAL.start();
//! let (mut rx, mut tx) = SERIAL.split(CycleDelay::<16_000_000>).unwrap();
//! tx.write_string("ready\n");
//! ```
//!
//! The platform binds its receive-complete and data-register-empty vectors
//! to [`Usart::on_receive`] and [`Usart::on_transmit_ready`].

mod cell;
mod guard;
mod receive;
mod transmit;

#[cfg(test)]
mod mock;

use portable_atomic::{AtomicBool, AtomicUsize, Ordering};

use embedded_hal::delay::DelayNs;
use kestrel_hal::{DataRegister, InterruptControl, IrqSource};

use self::cell::IrqCell;
use crate::buffer::Fifo;

pub use receive::Receiver;
pub use transmit::{Transmitter, DEFAULT_RETRY_INTERVAL_MS};

/// Default receive FIFO size in bytes
pub const DEFAULT_RX_BUFFER: usize = 64;

/// Default transmit FIFO size in bytes
pub const DEFAULT_TX_BUFFER: usize = 64;

/// Errors from USART read operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartError {
    /// Fewer bytes than requested were delivered
    Shortfall { requested: usize, read: usize },
    /// The request can never fit in the receive FIFO
    ExceedsCapacity { requested: usize, capacity: usize },
}

impl core::fmt::Display for UsartError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UsartError::Shortfall { requested, read } => {
                write!(f, "read {read} of {requested} requested bytes")
            }
            UsartError::ExceedsCapacity {
                requested,
                capacity,
            } => write!(
                f,
                "{requested} bytes requested but receive buffer holds {capacity}"
            ),
        }
    }
}

/// Interrupt-driven USART with receive and transmit FIFOs
///
/// Meant to live in a `static` for the whole program. Application code
/// works through the [`Receiver`] and [`Transmitter`] handles returned by
/// [`split`](Self::split); interrupt handlers call
/// [`on_receive`](Self::on_receive) and
/// [`on_transmit_ready`](Self::on_transmit_ready).
pub struct Usart<P, const RX: usize = DEFAULT_RX_BUFFER, const TX: usize = DEFAULT_TX_BUFFER> {
    periph: P,
    receive: IrqCell<Fifo<u8, RX>>,
    /// Unconsumed `\n` bytes in the receive FIFO
    lines: AtomicUsize,
    transmit: IrqCell<Fifo<u8, TX>>,
    split: AtomicBool,
}

impl<P, const RX: usize, const TX: usize> Usart<P, RX, TX> {
    pub const fn new(periph: P) -> Self {
        Self {
            periph,
            receive: IrqCell::new(Fifo::new()),
            lines: AtomicUsize::new(0),
            transmit: IrqCell::new(Fifo::new()),
            split: AtomicBool::new(false),
        }
    }

    /// The underlying peripheral, e.g. for baud rate setup
    pub fn peripheral(&self) -> &P {
        &self.periph
    }
}

impl<P, const RX: usize, const TX: usize> Usart<P, RX, TX>
where
    P: InterruptControl + DataRegister,
{
    /// Enable the receive interrupt
    ///
    /// The transmit interrupt is enabled on demand by writes.
    pub fn start(&self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("usart: rx fifo {} bytes, tx fifo {} bytes", RX, TX);

        self.periph.enable(IrqSource::Receive);
    }

    /// Hand out the receive consumer and transmit producer handles
    ///
    /// Succeeds once; later calls return `None` so that each FIFO keeps a
    /// single application-side user.
    pub fn split<D: DelayNs>(
        &self,
        delay: D,
    ) -> Option<(Receiver<'_, P, RX>, Transmitter<'_, P, D, TX>)> {
        if self.split.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some((
            Receiver::new(&self.periph, &self.receive, &self.lines),
            Transmitter::new(&self.periph, &self.transmit, delay),
        ))
    }

    /// Receive-complete interrupt handler
    ///
    /// Moves the received byte into the receive FIFO. When the FIFO is full
    /// the byte is discarded.
    ///
    /// # Safety
    ///
    /// Must only be called from the receive interrupt handler, which cannot
    /// run while a [`Receiver`] operation holds the receive source masked.
    /// Calls must not overlap each other.
    pub unsafe fn on_receive(&self) {
        let byte = self.periph.read_data();
        // SAFETY: we are the receive handler; the consumer side masks this
        // source around every access
        let fifo = unsafe { self.receive.get() };
        if !fifo.is_full() {
            fifo.write(byte);
            if byte == b'\n' {
                let lines = self.lines.load(Ordering::Relaxed);
                self.lines.store(lines + 1, Ordering::Release);
            }
        }
    }

    /// Data-register-empty interrupt handler
    ///
    /// Sends the next pending byte, or disables the transmit interrupt once
    /// the FIFO has drained.
    ///
    /// # Safety
    ///
    /// Must only be called from the transmit interrupt handler, which cannot
    /// run while a [`Transmitter`] operation holds the transmit source
    /// masked. Calls must not overlap each other.
    pub unsafe fn on_transmit_ready(&self) {
        // SAFETY: we are the transmit handler; the producer side masks this
        // source around every access
        let fifo = unsafe { self.transmit.get() };
        if fifo.is_empty() {
            self.periph.disable(IrqSource::Transmit);
        } else {
            self.periph.write_data(fifo.read());
        }
    }
}
