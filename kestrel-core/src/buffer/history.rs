//! Overwriting circular buffer
//!
//! Keeps the last `N` samples, e.g. for moving averages over sensor
//! readings. Unlike [`Fifo`](super::Fifo) it never rejects a value.

use super::Capacity;

/// Circular buffer that overwrites its oldest entry once full
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T, const N: usize> {
    write_index: usize,
    len: usize,
    buffer: [T; N],
}

impl<T: Copy + Default, const N: usize> Default for HistoryBuffer<T, N> {
    fn default() -> Self {
        Self::filled_with(T::default())
    }
}

impl<T: Copy, const N: usize> HistoryBuffer<T, N> {
    /// Create an empty buffer whose slots hold `fill`
    pub const fn filled_with(fill: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Capacity::<N>::POWER_OF_TWO;
        Self {
            write_index: 0,
            len: 0,
            buffer: [fill; N],
        }
    }

    /// Store a value, overwriting the oldest one when full
    pub fn add(&mut self, value: T) {
        self.buffer[self.write_index] = value;
        self.write_index = (self.write_index + 1) & Capacity::<N>::MASK;
        if self.len < N {
            self.len += 1;
        }
    }

    /// Value stored in slot `index`
    ///
    /// Slots are raw positions in the backing array; use
    /// [`last_inserted_index`](Self::last_inserted_index) to locate the
    /// newest one.
    ///
    /// # Panics
    /// If `index >= N`.
    pub fn element_at(&self, index: usize) -> T {
        self.buffer[index]
    }

    /// Slot of the most recently added value
    pub fn last_inserted_index(&self) -> usize {
        self.write_index.wrapping_sub(1) & Capacity::<N>::MASK
    }

    /// Number of filled slots, at most `N`
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Iterate over the filled slots in storage order
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.buffer[..self.len].iter().copied()
    }
}
