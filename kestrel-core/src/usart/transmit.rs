//! Transmit side: feeding the transmit FIFO from application code

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use kestrel_hal::{ByteSource, InterruptControl, IrqSource, UartTx};

use super::cell::IrqCell;
use super::guard::TransmitGuard;
use crate::buffer::Fifo;

/// Wait between attempts to push into a full transmit FIFO
pub const DEFAULT_RETRY_INTERVAL_MS: u32 = 50;

const FLUSH_POLL_US: u32 = 100;

/// Producer end of the transmit FIFO
///
/// Writes block while the FIFO is full. During the wait the transmit
/// interrupt is unmasked so the hardware keeps draining.
pub struct Transmitter<'a, P, D, const N: usize> {
    periph: &'a P,
    fifo: &'a IrqCell<Fifo<u8, N>>,
    delay: D,
    retry_interval_ms: u32,
}

impl<'a, P, D, const N: usize> Transmitter<'a, P, D, N> {
    pub(crate) fn new(periph: &'a P, fifo: &'a IrqCell<Fifo<u8, N>>, delay: D) -> Self {
        Self {
            periph,
            fifo,
            delay,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }

    /// Change the wait between attempts on a full FIFO
    pub fn with_retry_interval_ms(mut self, interval_ms: u32) -> Self {
        self.retry_interval_ms = interval_ms;
        self
    }

    pub fn retry_interval_ms(&self) -> u32 {
        self.retry_interval_ms
    }
}

impl<P: InterruptControl, D: DelayNs, const N: usize> Transmitter<'_, P, D, N> {
    /// Queue bytes from `source` for transmission
    ///
    /// With `Some(length)` up to `length` bytes are queued; with `None`
    /// queuing stops at the first NUL byte. Either way the end of the
    /// source ends the write.
    ///
    /// The transmit interrupt is enabled afterwards whatever its state was,
    /// so an idle line starts sending.
    ///
    /// Returns the number of bytes queued.
    pub fn write_from<S: ByteSource + ?Sized>(&mut self, source: &S, length: Option<usize>) -> usize {
        let mut written = 0;
        {
            let mut guard = TransmitGuard::new(self.periph, self.fifo);
            loop {
                if length.is_some_and(|limit| written >= limit) {
                    break;
                }
                let Some(byte) = source.byte_at(written) else {
                    break;
                };
                if length.is_none() && byte == 0 {
                    break;
                }

                while guard.fifo().is_full() {
                    let interval_ms = self.retry_interval_ms;
                    let delay = &mut self.delay;
                    guard.while_resumed(|| delay.delay_ms(interval_ms));
                }
                guard.fifo().write(byte);
                written += 1;
            }
        }

        self.periph.enable(IrqSource::Transmit);
        written
    }

    /// Queue all of `data`
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.write_from(data, Some(data.len()))
    }

    /// Queue `text` up to its first NUL byte
    pub fn write_string(&mut self, text: &str) -> usize {
        self.write_from(text, None)
    }

    /// Bytes queued but not yet handed to the hardware
    pub fn pending(&self) -> usize {
        let mut guard = TransmitGuard::new(self.periph, self.fifo);
        guard.fifo().len()
    }

    /// Block until the FIFO has drained
    ///
    /// The last byte may still be shifting out of the data register.
    pub fn wait_drained(&mut self) {
        while self.pending() > 0 {
            self.delay.delay_us(FLUSH_POLL_US);
        }
    }
}

impl<P: InterruptControl, D: DelayNs, const N: usize> core::fmt::Write for Transmitter<'_, P, D, N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.write_from(s, Some(s.len()));
        Ok(())
    }
}

impl<P, D, const N: usize> embedded_io::ErrorType for Transmitter<'_, P, D, N> {
    type Error = Infallible;
}

impl<P: InterruptControl, D: DelayNs, const N: usize> embedded_io::Write for Transmitter<'_, P, D, N> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(self.write_from(buf, Some(buf.len())))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.wait_drained();
        Ok(())
    }
}

impl<P: InterruptControl, D: DelayNs, const N: usize> embedded_io::WriteReady
    for Transmitter<'_, P, D, N>
{
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        let mut guard = TransmitGuard::new(self.periph, self.fifo);
        Ok(!guard.fifo().is_full())
    }
}

impl<P: InterruptControl, D: DelayNs, const N: usize> UartTx for Transmitter<'_, P, D, N> {
    type Error = Infallible;

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        Ok(self.write_from(data, Some(data.len())))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.wait_drained();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::super::mock::{drain, DrainingDelay, MockPeripheral, NoDelay};
    use super::super::Usart;
    use super::*;
    use kestrel_hal::MemoryLocation;

    /// Byte string standing in for data kept in program memory
    struct Flash(&'static [u8]);

    impl ByteSource for Flash {
        fn byte_at(&self, index: usize) -> Option<u8> {
            self.0.get(index).copied()
        }

        fn location(&self) -> MemoryLocation {
            MemoryLocation::ProgramSpace
        }
    }

    #[test]
    fn test_write_enables_transmit_and_drains() {
        let usart: Usart<MockPeripheral> = Usart::new(MockPeripheral::new());
        let (_rx, mut tx) = usart.split(NoDelay).unwrap();

        assert_eq!(tx.write(b"hello"), 5);
        assert!(usart.peripheral().is_enabled(IrqSource::Transmit));
        assert_eq!(tx.pending(), 5);

        assert_eq!(&drain(&usart)[..], b"hello");
        assert!(!usart.peripheral().is_enabled(IrqSource::Transmit));
        assert_eq!(tx.pending(), 0);
    }

    #[test]
    fn test_empty_write_still_enables_transmit() {
        let usart: Usart<MockPeripheral> = Usart::new(MockPeripheral::new());
        let (_rx, mut tx) = usart.split(NoDelay).unwrap();

        assert_eq!(tx.write(&[]), 0);
        assert!(usart.peripheral().is_enabled(IrqSource::Transmit));

        // SAFETY: single-threaded test standing in for the interrupt
        unsafe { usart.on_transmit_ready() };
        assert!(!usart.peripheral().is_enabled(IrqSource::Transmit));
        assert!(usart.peripheral().sent().is_empty());
    }

    #[test]
    fn test_full_fifo_blocks_until_drained() {
        let ticks = Cell::new(0);
        let usart: Usart<MockPeripheral, 16, 8> = Usart::new(MockPeripheral::new());
        let delay = DrainingDelay {
            usart: &usart,
            per_tick: 2,
            ticks: &ticks,
        };
        let (_rx, mut tx) = usart.split(delay).unwrap();

        let message = b"twenty bytes of text";
        assert_eq!(tx.write(message), message.len());
        assert!(ticks.get() > 0);
        // Enabled at the end of every write
        assert!(usart.peripheral().is_enabled(IrqSource::Transmit));

        assert_eq!(&drain(&usart)[..], &message[..]);
    }

    #[test]
    fn test_short_write_does_not_wait() {
        let ticks = Cell::new(0);
        let usart: Usart<MockPeripheral, 16, 8> = Usart::new(MockPeripheral::new());
        let delay = DrainingDelay {
            usart: &usart,
            per_tick: 1,
            ticks: &ticks,
        };
        let (_rx, mut tx) = usart.split(delay).unwrap();

        tx.write(b"1234567");
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn test_write_string_stops_at_nul() {
        let usart: Usart<MockPeripheral> = Usart::new(MockPeripheral::new());
        let (_rx, mut tx) = usart.split(NoDelay).unwrap();

        assert_eq!(tx.write_string("abc\0def"), 3);
        assert_eq!(&drain(&usart)[..], b"abc");
    }

    #[test]
    fn test_write_with_length_sends_nul_bytes() {
        let usart: Usart<MockPeripheral> = Usart::new(MockPeripheral::new());
        let (_rx, mut tx) = usart.split(NoDelay).unwrap();

        assert_eq!(tx.write(&[1, 0, 2]), 3);
        assert_eq!(&drain(&usart)[..], &[1u8, 0, 2]);
    }

    #[test]
    fn test_write_from_program_space() {
        let usart: Usart<MockPeripheral> = Usart::new(MockPeripheral::new());
        let (_rx, mut tx) = usart.split(NoDelay).unwrap();

        let banner = Flash(b"boot ok\0garbage");
        assert_eq!(tx.write_from(&banner, None), 7);
        assert_eq!(tx.write_from(&banner, Some(4)), 4);
        assert_eq!(&drain(&usart)[..], b"boot okboot");
    }

    #[test]
    fn test_length_past_end_of_source() {
        let usart: Usart<MockPeripheral> = Usart::new(MockPeripheral::new());
        let (_rx, mut tx) = usart.split(NoDelay).unwrap();

        assert_eq!(tx.write_from(b"xy", Some(10)), 2);
    }

    #[test]
    fn test_fmt_write() {
        use core::fmt::Write as _;

        let usart: Usart<MockPeripheral> = Usart::new(MockPeripheral::new());
        let (_rx, mut tx) = usart.split(NoDelay).unwrap();

        write!(tx, "t={}C", 21).unwrap();
        assert_eq!(&drain(&usart)[..], b"t=21C");
    }

    #[test]
    fn test_embedded_io_flush_waits_for_drain() {
        let ticks = Cell::new(0);
        let usart: Usart<MockPeripheral, 16, 16> = Usart::new(MockPeripheral::new());
        let delay = DrainingDelay {
            usart: &usart,
            per_tick: 1,
            ticks: &ticks,
        };
        let (_rx, mut tx) = usart.split(delay).unwrap();

        assert_eq!(embedded_io::WriteReady::write_ready(&mut tx), Ok(true));
        assert_eq!(embedded_io::Write::write(&mut tx, b"abcd"), Ok(4));
        assert_eq!(embedded_io::Write::flush(&mut tx), Ok(()));

        assert_eq!(tx.pending(), 0);
        assert_eq!(ticks.get(), 4);
        assert_eq!(&usart.peripheral().sent()[..], b"abcd");
    }

    #[test]
    fn test_retry_interval() {
        let usart: Usart<MockPeripheral> = Usart::new(MockPeripheral::new());
        let (_rx, tx) = usart.split(NoDelay).unwrap();

        assert_eq!(tx.retry_interval_ms(), DEFAULT_RETRY_INTERVAL_MS);
        assert_eq!(tx.with_retry_interval_ms(5).retry_interval_ms(), 5);
    }
}
