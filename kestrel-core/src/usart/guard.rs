//! Scoped masking of one interrupt source
//!
//! A guard captures the enable bit of its source, clears it, and restores
//! the captured state when dropped. While a guard is alive the handler of
//! that source cannot run, so the guard may hand out `&mut` access to the
//! buffer the handler shares with mainline code.
//!
//! Receive and transmit have separate guard types: each masks only its own
//! source, leaving the other pipeline running.

use core::sync::atomic::{compiler_fence, Ordering};

use kestrel_hal::{InterruptControl, IrqSource};

use super::cell::IrqCell;
use crate::buffer::Fifo;

/// Masked interrupt source, restored on drop
struct Masked<'a, P: InterruptControl> {
    periph: &'a P,
    source: IrqSource,
    was_enabled: bool,
}

impl<'a, P: InterruptControl> Masked<'a, P> {
    fn new(periph: &'a P, source: IrqSource) -> Self {
        let was_enabled = periph.suspend(source);
        // Buffer accesses must not be hoisted above the mask
        compiler_fence(Ordering::SeqCst);
        Self {
            periph,
            source,
            was_enabled,
        }
    }
}

impl<P: InterruptControl> Drop for Masked<'_, P> {
    fn drop(&mut self) {
        // ...nor sunk below the unmask
        compiler_fence(Ordering::SeqCst);
        self.periph.restore(self.source, self.was_enabled);
    }
}

/// Exclusive access to the receive FIFO with the receive interrupt masked
pub(crate) struct ReceiveGuard<'a, P: InterruptControl, const N: usize> {
    cell: &'a IrqCell<Fifo<u8, N>>,
    _mask: Masked<'a, P>,
}

impl<'a, P: InterruptControl, const N: usize> ReceiveGuard<'a, P, N> {
    pub(crate) fn new(periph: &'a P, cell: &'a IrqCell<Fifo<u8, N>>) -> Self {
        Self {
            _mask: Masked::new(periph, IrqSource::Receive),
            cell,
        }
    }

    pub(crate) fn fifo(&mut self) -> &mut Fifo<u8, N> {
        // SAFETY: the receive source is masked for the guard's lifetime and
        // the returned borrow is tied to `&mut self`, so it is unique.
        unsafe { self.cell.get() }
    }
}

/// Exclusive access to the transmit FIFO with the transmit interrupt masked
pub(crate) struct TransmitGuard<'a, P: InterruptControl, const N: usize> {
    cell: &'a IrqCell<Fifo<u8, N>>,
    mask: Masked<'a, P>,
}

impl<'a, P: InterruptControl, const N: usize> TransmitGuard<'a, P, N> {
    pub(crate) fn new(periph: &'a P, cell: &'a IrqCell<Fifo<u8, N>>) -> Self {
        Self {
            mask: Masked::new(periph, IrqSource::Transmit),
            cell,
        }
    }

    pub(crate) fn fifo(&mut self) -> &mut Fifo<u8, N> {
        // SAFETY: the transmit source is masked except inside
        // `while_resumed`, which also needs `&mut self`.
        unsafe { self.cell.get() }
    }

    /// Let the transmit handler run for the duration of `f`
    ///
    /// The FIFO cannot be borrowed while `f` runs.
    pub(crate) fn while_resumed<R>(&mut self, f: impl FnOnce() -> R) -> R {
        compiler_fence(Ordering::SeqCst);
        self.mask.periph.enable(IrqSource::Transmit);
        let result = f();
        self.mask.periph.disable(IrqSource::Transmit);
        compiler_fence(Ordering::SeqCst);
        result
    }
}
