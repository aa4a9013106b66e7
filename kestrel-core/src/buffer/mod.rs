//! Fixed-capacity circular buffers
//!
//! Both buffers index their backing array by masking with `N - 1`, so the
//! capacity must be a power of two. This is checked when the buffer is
//! constructed, at compile time.

mod fifo;
mod history;

pub use fifo::Fifo;
pub use history::HistoryBuffer;

/// Compile-time capacity check shared by the buffers
pub(crate) struct Capacity<const N: usize>;

impl<const N: usize> Capacity<N> {
    /// Evaluating this fails the build unless `N` is a power of two ≥ 2
    pub(crate) const POWER_OF_TWO: () = assert!(
        N >= 2 && N.is_power_of_two(),
        "buffer capacity must be a power of two"
    );

    pub(crate) const MASK: usize = N - 1;
}
