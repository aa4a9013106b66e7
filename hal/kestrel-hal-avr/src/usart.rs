//! USART0 register driver
//!
//! Memory-mapped registers of the ATmega328P's only USART. Everything else
//! (buffering, interrupt handlers) lives in [`kestrel_core::usart`], which
//! drives this type through the `kestrel-hal` traits.

#[cfg(not(test))]
use core::ptr::{read_volatile, write_volatile};

use kestrel_hal::{DataBits, DataRegister, InterruptControl, IrqSource, Parity, StopBits};

use crate::baud::Ubrr;

// Register addresses (data space)
const UCSR0A: usize = 0xC0;
const UCSR0B: usize = 0xC1;
const UCSR0C: usize = 0xC2;
const UBRR0L: usize = 0xC4;
const UBRR0H: usize = 0xC5;
const UDR0: usize = 0xC6;
const DDRD: usize = 0x2A;

// UCSR0A bits
const UDRE0: u8 = 1 << 5;

// UCSR0B bits
const RXCIE0: u8 = 1 << 7;
const UDRIE0: u8 = 1 << 5;
const RXEN0: u8 = 1 << 4;
const TXEN0: u8 = 1 << 3;

// UCSR0C bits
const UPM01: u8 = 1 << 5;
const UPM00: u8 = 1 << 4;
const USBS0: u8 = 1 << 3;
const UCSZ01: u8 = 1 << 2;
const UCSZ00: u8 = 1 << 1;

// Port D pins
const PIN_RXD: u8 = 1 << 0;
const PIN_TXD: u8 = 1 << 1;

/// USART0 peripheral
pub struct Usart0 {
    _private: (),
}

impl Usart0 {
    /// Take the USART0 registers
    ///
    /// # Safety
    ///
    /// - Only one instance may exist
    /// - Nothing else may access the USART0 registers or PD0/PD1
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    #[cfg(not(test))]
    #[inline]
    fn read_reg(&self, addr: usize) -> u8 {
        // SAFETY: fixed USART0/PORTD register address on ATmega328P
        unsafe { read_volatile(addr as *const u8) }
    }

    #[cfg(not(test))]
    #[inline]
    fn write_reg(&self, addr: usize, value: u8) {
        // SAFETY: as above
        unsafe { write_volatile(addr as *mut u8, value) }
    }

    #[cfg(test)]
    fn read_reg(&self, addr: usize) -> u8 {
        registers::read(addr)
    }

    #[cfg(test)]
    fn write_reg(&self, addr: usize, value: u8) {
        registers::write(addr, value)
    }

    /// Read-modify-write with global interrupts off
    ///
    /// UCSR0B is also modified by the transmit handler, so an update from
    /// mainline code must not be split by it.
    fn modify_reg(&self, addr: usize, f: impl FnOnce(u8) -> u8) {
        critical_section::with(|_| {
            let value = self.read_reg(addr);
            self.write_reg(addr, f(value));
        });
    }

    /// Set the baud rate and bring up the pins, transmitter and receiver
    ///
    /// Frames are asynchronous 8N1. Interrupts stay disabled until
    /// [`Usart::start`](kestrel_core::Usart::start) and the first write.
    pub fn init(&self, ubrr: Ubrr) {
        let [high, low] = ubrr.value().to_be_bytes();
        self.write_reg(UBRR0H, high);
        self.write_reg(UBRR0L, low);

        self.modify_reg(DDRD, |ddr| (ddr | PIN_TXD) & !PIN_RXD);
        self.modify_reg(UCSR0B, |b| b | TXEN0 | RXEN0);
        self.set_frame(DataBits::Eight, Parity::None, StopBits::One);

        #[cfg(feature = "defmt")]
        defmt::debug!("usart0: ubrr={}", ubrr.value());
    }

    /// Select the frame format
    pub fn set_frame(&self, data_bits: DataBits, parity: Parity, stop_bits: StopBits) {
        let mut c = match data_bits {
            DataBits::Seven => UCSZ01,
            DataBits::Eight => UCSZ01 | UCSZ00,
        };
        c |= match parity {
            Parity::None => 0,
            Parity::Even => UPM01,
            Parity::Odd => UPM01 | UPM00,
        };
        if stop_bits == StopBits::Two {
            c |= USBS0;
        }
        self.write_reg(UCSR0C, c);
    }

    /// True when the data register can take another byte
    pub fn is_data_register_empty(&self) -> bool {
        self.read_reg(UCSR0A) & UDRE0 != 0
    }

    fn enable_bit(source: IrqSource) -> u8 {
        match source {
            IrqSource::Receive => RXCIE0,
            IrqSource::Transmit => UDRIE0,
        }
    }
}

impl InterruptControl for Usart0 {
    fn is_enabled(&self, source: IrqSource) -> bool {
        self.read_reg(UCSR0B) & Self::enable_bit(source) != 0
    }

    fn enable(&self, source: IrqSource) {
        let bit = Self::enable_bit(source);
        self.modify_reg(UCSR0B, |b| b | bit);
    }

    fn disable(&self, source: IrqSource) {
        let bit = Self::enable_bit(source);
        self.modify_reg(UCSR0B, |b| b & !bit);
    }
}

impl DataRegister for Usart0 {
    fn read_data(&self) -> u8 {
        self.read_reg(UDR0)
    }

    fn write_data(&self, byte: u8) {
        self.write_reg(UDR0, byte);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn usart() -> Usart0 {
        registers::clear();
        // SAFETY: registers are thread-local in tests
        unsafe { Usart0::new() }
    }

    #[test]
    fn test_init_writes_ubrr_and_8n1() {
        let usart = usart();
        registers::write(DDRD, PIN_RXD | 1 << 7);

        usart.init(Ubrr::checked(16_000_000, 9_600).unwrap());

        assert_eq!(registers::read(UBRR0H), 0);
        assert_eq!(registers::read(UBRR0L), 103);
        assert_eq!(registers::read(DDRD), PIN_TXD | 1 << 7);
        assert_eq!(registers::read(UCSR0B), TXEN0 | RXEN0);
        assert_eq!(registers::read(UCSR0C), UCSZ01 | UCSZ00);
    }

    #[test]
    fn test_init_splits_wide_ubrr() {
        let usart = usart();
        // 300 baud at 16 MHz needs UBRR = 3332 = 0x0D04
        usart.init(Ubrr::checked(16_000_000, 300).unwrap());

        assert_eq!(registers::read(UBRR0H), 0x0D);
        assert_eq!(registers::read(UBRR0L), 0x04);
    }

    #[test]
    fn test_frame_seven_even_two() {
        let usart = usart();
        usart.set_frame(DataBits::Seven, Parity::Even, StopBits::Two);

        assert_eq!(registers::read(UCSR0C), UPM01 | USBS0 | UCSZ01);
    }

    #[test]
    fn test_frame_eight_odd_one() {
        let usart = usart();
        usart.set_frame(DataBits::Eight, Parity::Odd, StopBits::One);

        assert_eq!(registers::read(UCSR0C), UPM01 | UPM00 | UCSZ01 | UCSZ00);
    }

    #[test]
    fn test_sources_map_to_their_enable_bits() {
        let usart = usart();

        usart.enable(IrqSource::Receive);
        assert_eq!(registers::read(UCSR0B), RXCIE0);
        assert!(usart.is_enabled(IrqSource::Receive));
        assert!(!usart.is_enabled(IrqSource::Transmit));

        usart.enable(IrqSource::Transmit);
        assert_eq!(registers::read(UCSR0B), RXCIE0 | UDRIE0);
    }

    #[test]
    fn test_suspending_receive_keeps_transmit_enabled() {
        let usart = usart();
        registers::write(UCSR0B, TXEN0 | RXEN0);
        usart.enable(IrqSource::Receive);
        usart.enable(IrqSource::Transmit);

        let was = usart.suspend(IrqSource::Receive);

        assert!(was);
        assert_eq!(registers::read(UCSR0B), TXEN0 | RXEN0 | UDRIE0);

        usart.restore(IrqSource::Receive, was);
        assert_eq!(registers::read(UCSR0B), TXEN0 | RXEN0 | RXCIE0 | UDRIE0);
    }

    #[test]
    fn test_disabling_transmit_keeps_receive_enabled() {
        let usart = usart();
        usart.enable(IrqSource::Receive);
        usart.enable(IrqSource::Transmit);

        usart.disable(IrqSource::Transmit);

        assert_eq!(registers::read(UCSR0B), RXCIE0);
    }

    #[test]
    fn test_data_register() {
        let usart = usart();

        usart.write_data(b'k');
        assert_eq!(registers::read(UDR0), b'k');

        registers::write(UDR0, b'z');
        assert_eq!(usart.read_data(), b'z');
    }

    #[test]
    fn test_data_register_empty_flag() {
        let usart = usart();
        assert!(!usart.is_data_register_empty());

        registers::write(UCSR0A, UDRE0);
        assert!(usart.is_data_register_empty());
    }
}
