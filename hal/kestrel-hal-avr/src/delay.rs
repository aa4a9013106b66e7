//! Busy-wait delay calibrated to the CPU clock

use embedded_hal::delay::DelayNs;

/// Approximate CPU cycles per iteration of the spin loop
const CYCLES_PER_SPIN: u32 = 4;

/// Cycle-counting delay for a core clocked at `F_CPU` Hz
///
/// Interrupts that fire during the wait lengthen it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleDelay<const F_CPU: u32>;

impl<const F_CPU: u32> CycleDelay<F_CPU> {
    pub const fn new() -> Self {
        Self
    }

    /// Spin iterations covering `us` microseconds
    pub const fn spins_for_us(us: u32) -> u32 {
        let cycles = (us as u64 * F_CPU as u64) / 1_000_000;
        let spins = cycles / CYCLES_PER_SPIN as u64;
        if spins > u32::MAX as u64 {
            u32::MAX
        } else {
            spins as u32
        }
    }

    fn spin(iterations: u32) {
        for i in 0..iterations {
            core::hint::black_box(i);
        }
    }
}

impl<const F_CPU: u32> DelayNs for CycleDelay<F_CPU> {
    fn delay_ns(&mut self, ns: u32) {
        Self::spin(Self::spins_for_us(ns.div_ceil(1_000)));
    }

    fn delay_us(&mut self, us: u32) {
        Self::spin(Self::spins_for_us(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            Self::spin(Self::spins_for_us(1_000));
        }
    }
}
