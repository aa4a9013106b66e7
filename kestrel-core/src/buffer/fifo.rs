//! Single-producer / single-consumer FIFO
//!
//! Fullness is detected by index equality, so one slot always stays unused:
//! a `Fifo<T, 8>` holds at most 7 elements.

use super::Capacity;

/// Fixed-capacity first-in first-out queue
///
/// Not synchronized. One producer and one consumer may use it from
/// different execution contexts only under an external guard discipline
/// (see [`crate::usart`]).
#[derive(Debug, Clone)]
pub struct Fifo<T, const N: usize> {
    read_index: usize,
    write_index: usize,
    buffer: [T; N],
}

impl<T: Copy + Default, const N: usize> Default for Fifo<T, N> {
    fn default() -> Self {
        Self::filled_with(T::default())
    }
}

impl<const N: usize> Fifo<u8, N> {
    /// Create an empty byte FIFO
    ///
    /// `const` so it can be placed in a `static`.
    pub const fn new() -> Self {
        Self::filled_with(0)
    }
}

impl<T, const N: usize> Fifo<T, N> {
    /// Number of slots in the backing array
    pub const CAPACITY: usize = N;

    /// Number of elements the FIFO can hold at once
    pub const USABLE_CAPACITY: usize = N - 1;

    /// Size of the backing array (`N`)
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Maximum number of buffered elements (`N - 1`)
    pub const fn usable_capacity(&self) -> usize {
        N - 1
    }

    /// Number of buffered elements
    pub fn len(&self) -> usize {
        self.write_index.wrapping_sub(self.read_index) & Capacity::<N>::MASK
    }

    pub fn is_empty(&self) -> bool {
        self.read_index == self.write_index
    }

    /// True when a further [`write`](Self::write) would be rejected
    pub fn is_full(&self) -> bool {
        Self::advance(self.write_index) == self.read_index
    }

    fn advance(index: usize) -> usize {
        (index + 1) & Capacity::<N>::MASK
    }
}

impl<T: Copy, const N: usize> Fifo<T, N> {
    /// Create an empty FIFO whose unused slots hold `fill`
    pub const fn filled_with(fill: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Capacity::<N>::POWER_OF_TWO;
        Self {
            read_index: 0,
            write_index: 0,
            buffer: [fill; N],
        }
    }

    /// Append a value
    ///
    /// Returns `false` and leaves the FIFO unchanged if it is full.
    pub fn write(&mut self, value: T) -> bool {
        let next = Self::advance(self.write_index);
        if next == self.read_index {
            return false;
        }
        self.buffer[self.write_index] = value;
        self.write_index = next;
        true
    }
}

impl<T: Copy + Default, const N: usize> Fifo<T, N> {
    /// Remove and return the oldest value
    ///
    /// An empty FIFO yields `T::default()` without signalling anything;
    /// check [`is_empty`](Self::is_empty) first when that matters.
    pub fn read(&mut self) -> T {
        if self.is_empty() {
            return T::default();
        }
        let value = self.buffer[self.read_index];
        self.read_index = Self::advance(self.read_index);
        value
    }
}
