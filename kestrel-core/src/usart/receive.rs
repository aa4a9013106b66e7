//! Receive side: draining the receive FIFO into caller buffers

use core::convert::Infallible;

use heapless::Vec;
use kestrel_hal::{InterruptControl, UartRx};
use portable_atomic::{AtomicUsize, Ordering};

use super::cell::IrqCell;
use super::guard::ReceiveGuard;
use super::UsartError;
use crate::buffer::Fifo;

/// Consumer end of the receive FIFO
///
/// Every operation masks the receive interrupt while it touches the FIFO,
/// so bytes arriving in the meantime are latched by the hardware and
/// delivered afterwards.
pub struct Receiver<'a, P, const N: usize> {
    periph: &'a P,
    fifo: &'a IrqCell<Fifo<u8, N>>,
    lines: &'a AtomicUsize,
}

impl<'a, P, const N: usize> Receiver<'a, P, N> {
    pub(crate) fn new(
        periph: &'a P,
        fifo: &'a IrqCell<Fifo<u8, N>>,
        lines: &'a AtomicUsize,
    ) -> Self {
        Self {
            periph,
            fifo,
            lines,
        }
    }

    /// True if at least one complete line is waiting
    ///
    /// Reads the newline counter without masking the interrupt.
    pub fn is_line_available(&self) -> bool {
        self.lines.load(Ordering::Acquire) > 0
    }

    fn newline_consumed(&self) {
        let lines = self.lines.load(Ordering::Acquire);
        self.lines.store(lines.saturating_sub(1), Ordering::Release);
    }
}

impl<P: InterruptControl, const N: usize> Receiver<'_, P, N> {
    /// Number of buffered bytes
    pub fn bytes_available(&self) -> usize {
        let mut guard = ReceiveGuard::new(self.periph, self.fifo);
        guard.fifo().len()
    }

    /// Move buffered bytes into `buf`
    ///
    /// With `terminator` set to a non-zero byte this works in string mode:
    /// one byte of `buf` is kept for a trailing NUL, and reading stops after
    /// the terminator is consumed. The terminator itself is not counted and
    /// its position receives the NUL. `None` or `Some(0)` selects binary
    /// mode, which copies up to `buf.len()` bytes as they are.
    ///
    /// Returns the number of bytes copied, excluding the NUL.
    pub fn read_until(&mut self, buf: &mut [u8], terminator: Option<u8>) -> usize {
        let terminator = terminator.filter(|&t| t != 0);
        let limit = match terminator {
            Some(_) => match buf.len().checked_sub(1) {
                Some(limit) => limit,
                None => return 0,
            },
            None => buf.len(),
        };

        let mut count = 0;
        {
            let mut guard = ReceiveGuard::new(self.periph, self.fifo);
            let fifo = guard.fifo();
            while count < limit && !fifo.is_empty() {
                let byte = fifo.read();
                buf[count] = byte;
                if byte == b'\n' {
                    self.newline_consumed();
                }
                if Some(byte) == terminator {
                    break;
                }
                count += 1;
            }
        }

        if terminator.is_some() {
            buf[count] = 0;
        }
        count
    }

    /// Binary read of whatever is buffered, up to `buf.len()` bytes
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        self.read_until(buf, None)
    }

    /// Read one line into `buf` as a NUL-terminated string
    ///
    /// The newline is consumed but not stored. If no full line is buffered
    /// this returns what is there; check
    /// [`is_line_available`](Self::is_line_available) first to avoid
    /// partial lines.
    pub fn read_line(&mut self, buf: &mut [u8]) -> usize {
        self.read_until(buf, Some(b'\n'))
    }

    /// Read one line into a fixed-capacity vector, without the newline
    ///
    /// Stops early when the vector is full; the rest of the line stays
    /// buffered.
    pub fn read_line_vec<const M: usize>(&mut self) -> Vec<u8, M> {
        let mut line = Vec::new();
        let mut guard = ReceiveGuard::new(self.periph, self.fifo);
        let fifo = guard.fifo();
        while !fifo.is_empty() && !line.is_full() {
            let byte = fifo.read();
            if byte == b'\n' {
                self.newline_consumed();
                break;
            }
            let _ = line.push(byte);
        }
        line
    }

    /// Block until `buf.len()` bytes are buffered, then read exactly that
    ///
    /// Requests larger than the FIFO can hold are rejected up front instead
    /// of waiting forever.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), UsartError> {
        let requested = buf.len();
        let capacity = Fifo::<u8, N>::USABLE_CAPACITY;
        if requested > capacity {
            return Err(UsartError::ExceedsCapacity {
                requested,
                capacity,
            });
        }

        while self.bytes_available() < requested {
            core::hint::spin_loop();
        }

        let read = self.read_until(buf, None);
        if read == requested {
            Ok(())
        } else {
            Err(UsartError::Shortfall { requested, read })
        }
    }
}

impl<P, const N: usize> embedded_io::ErrorType for Receiver<'_, P, N> {
    type Error = Infallible;
}

impl<P: InterruptControl, const N: usize> embedded_io::Read for Receiver<'_, P, N> {
    /// Blocks until at least one byte is buffered
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.bytes_available() == 0 {
            core::hint::spin_loop();
        }
        Ok(self.read_until(buf, None))
    }
}

impl<P: InterruptControl, const N: usize> embedded_io::ReadReady for Receiver<'_, P, N> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bytes_available() > 0)
    }
}

impl<P: InterruptControl, const N: usize> UartRx for Receiver<'_, P, N> {
    type Error = Infallible;

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.read_until(buf, None))
    }
}
