use core::cell::UnsafeCell;

/// Storage shared between mainline code and a single interrupt handler
///
/// Exclusive access is established by masking the handler's interrupt
/// source (see [`super::guard`]) or by running inside that handler.
pub(crate) struct IrqCell<T> {
    inner: UnsafeCell<T>,
}

// SAFETY: every access goes through `get`, whose contract requires that
// the other party (handler or mainline) cannot run concurrently. On the
// single-core targets this is written for, masking the interrupt source
// provides that; host implementations of `InterruptControl` must provide
// the same exclusion (see kestrel-hal-linux's simulated peripheral).
unsafe impl<T: Send> Sync for IrqCell<T> {}

impl<T> IrqCell<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self {
            inner: UnsafeCell::new(value),
        }
    }

    /// Get exclusive access to the contents
    ///
    /// # Safety
    ///
    /// No other reference to the contents may be live. The caller either
    /// runs inside the interrupt handler that owns the other end of this
    /// cell, or has that handler's interrupt source masked for as long as
    /// the returned reference is used.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn get(&self) -> &mut T {
        // SAFETY: exclusivity is guaranteed by the caller
        unsafe { &mut *self.inner.get() }
    }
}
