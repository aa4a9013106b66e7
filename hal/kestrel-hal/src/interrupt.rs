//! Interrupt source masking
//!
//! The serial transport protects each of its buffers by masking only the
//! interrupt source that touches it. This module defines the sources and
//! the trait a platform implements to mask them.

use portable_atomic::{AtomicBool, Ordering};

/// Interrupt sources of a serial peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqSource {
    /// A byte has been received (receive complete)
    Receive,
    /// The data register can accept another byte (data register empty)
    Transmit,
}

/// Per-source interrupt enable control
///
/// Methods take `&self` because the enable bits live in hardware registers
/// (or atomics) shared between mainline code and interrupt handlers.
///
/// Masking one source must never change the enable bit of the other.
pub trait InterruptControl {
    /// Check whether the source is currently enabled
    fn is_enabled(&self, source: IrqSource) -> bool;

    /// Enable (unmask) the source
    fn enable(&self, source: IrqSource);

    /// Disable (mask) the source
    fn disable(&self, source: IrqSource);

    /// Disable the source and return whether it was enabled before
    fn suspend(&self, source: IrqSource) -> bool {
        let was_enabled = self.is_enabled(source);
        self.disable(source);
        was_enabled
    }

    /// Restore a state captured by [`suspend`](Self::suspend)
    ///
    /// Only re-enables; a source that was disabled before stays as it is.
    fn restore(&self, source: IrqSource, was_enabled: bool) {
        if was_enabled {
            self.enable(source);
        }
    }
}

impl<T: InterruptControl + ?Sized> InterruptControl for &T {
    fn is_enabled(&self, source: IrqSource) -> bool {
        (**self).is_enabled(source)
    }

    fn enable(&self, source: IrqSource) {
        (**self).enable(source)
    }

    fn disable(&self, source: IrqSource) {
        (**self).disable(source)
    }
}

/// Interrupt enable bits held in atomic flags
///
/// Substitute for hardware enable registers when the handler is polled
/// from the same thread that masks it, e.g. in unit tests.
///
/// Masking does not wait for a handler that is already running, so it is
/// not enough for a handler on another thread. Use
/// `kestrel_hal_linux::SimulatedUsart` for that.
#[derive(Debug, Default)]
pub struct FlagInterrupts {
    receive: AtomicBool,
    transmit: AtomicBool,
}

impl FlagInterrupts {
    /// Create with both sources disabled
    pub const fn new() -> Self {
        Self {
            receive: AtomicBool::new(false),
            transmit: AtomicBool::new(false),
        }
    }

    fn flag(&self, source: IrqSource) -> &AtomicBool {
        match source {
            IrqSource::Receive => &self.receive,
            IrqSource::Transmit => &self.transmit,
        }
    }
}

impl InterruptControl for FlagInterrupts {
    fn is_enabled(&self, source: IrqSource) -> bool {
        self.flag(source).load(Ordering::Acquire)
    }

    fn enable(&self, source: IrqSource) {
        self.flag(source).store(true, Ordering::Release);
    }

    fn disable(&self, source: IrqSource) {
        self.flag(source).store(false, Ordering::Release);
    }

    fn suspend(&self, source: IrqSource) -> bool {
        self.flag(source).swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_start_disabled() {
        let irq = FlagInterrupts::new();
        assert!(!irq.is_enabled(IrqSource::Receive));
        assert!(!irq.is_enabled(IrqSource::Transmit));
    }

    #[test]
    fn test_sources_are_independent() {
        let irq = FlagInterrupts::new();
        irq.enable(IrqSource::Receive);
        irq.enable(IrqSource::Transmit);

        irq.disable(IrqSource::Receive);

        assert!(!irq.is_enabled(IrqSource::Receive));
        assert!(irq.is_enabled(IrqSource::Transmit));
    }

    #[test]
    fn test_suspend_restore_enabled() {
        let irq = FlagInterrupts::new();
        irq.enable(IrqSource::Transmit);

        let was = irq.suspend(IrqSource::Transmit);
        assert!(was);
        assert!(!irq.is_enabled(IrqSource::Transmit));

        irq.restore(IrqSource::Transmit, was);
        assert!(irq.is_enabled(IrqSource::Transmit));
    }

    #[test]
    fn test_restore_keeps_disabled_source_disabled() {
        let irq = FlagInterrupts::new();

        let was = irq.suspend(IrqSource::Receive);
        assert!(!was);

        irq.restore(IrqSource::Receive, was);
        assert!(!irq.is_enabled(IrqSource::Receive));
    }

    #[test]
    fn test_default_suspend_through_reference() {
        let irq = FlagInterrupts::new();
        irq.enable(IrqSource::Receive);

        let by_ref = &irq;
        let was = InterruptControl::suspend(&by_ref, IrqSource::Receive);

        assert!(was);
        assert!(!irq.is_enabled(IrqSource::Receive));
    }
}
