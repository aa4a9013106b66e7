//! Constant data in program memory
//!
//! Flash is a separate address space on AVR; reading it takes the `lpm`
//! instruction. [`ProgramSpace`] wraps such data as a
//! [`ByteSource`](kestrel_hal::ByteSource) so it can be written to the
//! serial port without first copying it to RAM.

use kestrel_hal::{ByteSource, MemoryLocation};

/// Byte string stored in program memory
#[derive(Debug, Clone, Copy)]
pub struct ProgramSpace {
    start: *const u8,
    len: usize,
}

impl ProgramSpace {
    /// Wrap bytes that were placed in program memory
    ///
    /// # Safety
    ///
    /// On AVR `bytes` must live in the `.progmem` section, see
    /// [`progmem!`](crate::progmem). Elsewhere any static slice works.
    pub const unsafe fn new(bytes: &'static [u8]) -> Self {
        Self {
            start: bytes.as_ptr(),
            len: bytes.len(),
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl ByteSource for ProgramSpace {
    fn byte_at(&self, index: usize) -> Option<u8> {
        if index >= self.len {
            return None;
        }
        // SAFETY: in bounds, and `new` requires the data to be in flash
        Some(unsafe { load(self.start.add(index)) })
    }

    fn location(&self) -> MemoryLocation {
        MemoryLocation::ProgramSpace
    }
}

#[cfg(target_arch = "avr")]
unsafe fn load(addr: *const u8) -> u8 {
    let byte: u8;
    // SAFETY: `lpm` only reads flash; the caller guarantees the address
    unsafe {
        core::arch::asm!("lpm {}, Z", out(reg) byte, in("Z") addr, options(readonly, nostack));
    }
    byte
}

#[cfg(not(target_arch = "avr"))]
unsafe fn load(addr: *const u8) -> u8 {
    // SAFETY: the caller guarantees the address is readable
    unsafe { addr.read() }
}

/// Place a byte string literal in program memory
///
/// ```ignore
/// let banner = kestrel_hal_avr::progmem!(b"kestrel ready\n");
/// tx.write_from(&banner, None);
/// ```
#[macro_export]
macro_rules! progmem {
    ($bytes:literal) => {{
        #[cfg_attr(target_arch = "avr", link_section = ".progmem.data")]
        static BYTES: [u8; $bytes.len()] = *$bytes;
        // SAFETY: `BYTES` sits in the progmem section on AVR
        unsafe { $crate::ProgramSpace::new(&BYTES) }
    }};
}
