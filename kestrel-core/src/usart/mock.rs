//! Host-side stand-ins for the serial peripheral and its interrupts

use core::cell::{Cell, RefCell};

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use kestrel_hal::{DataRegister, InterruptControl, IrqSource};

use super::Usart;

/// Peripheral with enable bits in cells and a captured output wire
#[derive(Default)]
pub(crate) struct MockPeripheral {
    receive: Cell<bool>,
    transmit: Cell<bool>,
    rx_data: Cell<u8>,
    wire: RefCell<Vec<u8, 512>>,
}

impl MockPeripheral {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Everything written to the data register so far
    pub(crate) fn sent(&self) -> Vec<u8, 512> {
        self.wire.borrow().clone()
    }

    fn flag(&self, source: IrqSource) -> &Cell<bool> {
        match source {
            IrqSource::Receive => &self.receive,
            IrqSource::Transmit => &self.transmit,
        }
    }
}

impl InterruptControl for MockPeripheral {
    fn is_enabled(&self, source: IrqSource) -> bool {
        self.flag(source).get()
    }

    fn enable(&self, source: IrqSource) {
        self.flag(source).set(true);
    }

    fn disable(&self, source: IrqSource) {
        self.flag(source).set(false);
    }
}

impl DataRegister for MockPeripheral {
    fn read_data(&self) -> u8 {
        self.rx_data.get()
    }

    fn write_data(&self, byte: u8) {
        self.wire
            .borrow_mut()
            .push(byte)
            .expect("mock wire full");
    }
}

/// Deliver bytes as if each raised a receive interrupt
pub(crate) fn receive_bytes<const RX: usize, const TX: usize>(
    usart: &Usart<MockPeripheral, RX, TX>,
    bytes: &[u8],
) {
    for &byte in bytes {
        usart.peripheral().rx_data.set(byte);
        // SAFETY: single-threaded; no receive guard is alive between calls
        unsafe { usart.on_receive() };
    }
}

/// Run the transmit handler until it disables itself
pub(crate) fn drain<const RX: usize, const TX: usize>(
    usart: &Usart<MockPeripheral, RX, TX>,
) -> Vec<u8, 512> {
    while usart.peripheral().is_enabled(IrqSource::Transmit) {
        // SAFETY: single-threaded; no transmit guard is alive here
        unsafe { usart.on_transmit_ready() };
    }
    usart.peripheral().sent()
}

/// Delay that returns immediately
pub(crate) struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Delay that lets the transmit interrupt fire while "waiting"
///
/// Each call sends up to `per_tick` bytes if the transmit source is enabled,
/// the way the hardware would during a real delay.
pub(crate) struct DrainingDelay<'a, const RX: usize, const TX: usize> {
    pub(crate) usart: &'a Usart<MockPeripheral, RX, TX>,
    pub(crate) per_tick: usize,
    pub(crate) ticks: &'a Cell<usize>,
}

impl<const RX: usize, const TX: usize> DrainingDelay<'_, RX, TX> {
    fn tick(&mut self) {
        self.ticks.set(self.ticks.get() + 1);
        for _ in 0..self.per_tick {
            if !self.usart.peripheral().is_enabled(IrqSource::Transmit) {
                break;
            }
            // SAFETY: the writer only calls delays inside `while_resumed`,
            // where it holds no borrow of the transmit fifo
            unsafe { self.usart.on_transmit_ready() };
        }
    }
}

impl<const RX: usize, const TX: usize> DelayNs for DrainingDelay<'_, RX, TX> {
    fn delay_ns(&mut self, _ns: u32) {
        self.tick();
    }

    fn delay_ms(&mut self, _ms: u32) {
        self.tick();
    }
}

mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "mock wire full")]
    fn test_wire_overflow_panics() {
        let periph = MockPeripheral::new();
        for byte in 0..=512u16 {
            periph.write_data(byte as u8);
        }
    }
}
