//! Byte sources in different memory spaces
//!
//! Harvard-architecture chips keep constant strings in program memory,
//! which is not reachable through ordinary pointers. Writers that accept a
//! [`ByteSource`] work with both RAM data and such program-space data.

/// Memory space a byte source lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryLocation {
    /// Ordinary data memory
    Ram,
    /// Read-only program (flash) memory
    ProgramSpace,
}

/// Indexed read access to a sequence of bytes
pub trait ByteSource {
    /// Byte at `index`, or `None` past the end of the source
    fn byte_at(&self, index: usize) -> Option<u8>;

    /// Memory space the bytes are read from
    fn location(&self) -> MemoryLocation {
        MemoryLocation::Ram
    }
}

impl ByteSource for [u8] {
    fn byte_at(&self, index: usize) -> Option<u8> {
        self.get(index).copied()
    }
}

impl<const N: usize> ByteSource for [u8; N] {
    fn byte_at(&self, index: usize) -> Option<u8> {
        self.get(index).copied()
    }
}

impl ByteSource for str {
    fn byte_at(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }
}
