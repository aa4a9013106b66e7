//! Baud rate register computation
//!
//! The USART runs in normal (16x oversampling) asynchronous mode:
//!
//! ```text
//! UBRR = round(F_CPU / (16 * BAUD)) - 1
//! real = F_CPU / (16 * (UBRR + 1))
//! ```
//!
//! A rate is accepted only if `real` is within 1% of the requested baud.

/// Largest value the 12-bit UBRR register holds
pub const UBRR_MAX: u16 = 0x0FFF;

/// Accepted band for `real * 1000 / requested`
const PERMILLE_MIN: u32 = 990;
const PERMILLE_MAX: u32 = 1010;

/// Why a baud rate cannot be configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaudError {
    /// The divisor falls outside the UBRR register
    Unreachable,
    /// The nearest rate deviates too far, `permille` is real/requested x1000
    TooInaccurate { permille: u32 },
}

impl core::fmt::Display for BaudError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BaudError::Unreachable => write!(f, "baud rate divisor out of range"),
            BaudError::TooInaccurate { permille } => {
                write!(f, "baud rate error too large ({permille}\u{2030} of requested)")
            }
        }
    }
}

/// Validated baud rate register value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ubrr(u16);

impl Ubrr {
    /// Compute and validate the register value for `baud` at `f_cpu` Hz
    pub const fn checked(f_cpu: u32, baud: u32) -> Result<Self, BaudError> {
        if baud == 0 {
            return Err(BaudError::Unreachable);
        }
        let f_cpu = f_cpu as u64;
        let baud = baud as u64;

        let rounded = (f_cpu + baud * 8) / (baud * 16);
        if rounded == 0 || rounded - 1 > UBRR_MAX as u64 {
            return Err(BaudError::Unreachable);
        }
        let ubrr = rounded - 1;

        let real = f_cpu / (16 * (ubrr + 1));
        let permille = (real * 1000 / baud) as u32;
        if permille < PERMILLE_MIN || permille > PERMILLE_MAX {
            return Err(BaudError::TooInaccurate { permille });
        }
        Ok(Self(ubrr as u16))
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// Baud rate actually produced at `f_cpu` Hz
    pub const fn real_baud(self, f_cpu: u32) -> u32 {
        f_cpu / (16 * (self.0 as u32 + 1))
    }
}

/// Baud rate fixed at compile time
///
/// `Baud::<16_000_000, 19_200>::UBRR` fails to compile if the rate is not
/// reachable within 1% at that clock.
pub struct Baud<const F_CPU: u32, const BAUD: u32>;

impl<const F_CPU: u32, const BAUD: u32> Baud<F_CPU, BAUD> {
    pub const UBRR: Ubrr = match Ubrr::checked(F_CPU, BAUD) {
        Ok(ubrr) => ubrr,
        Err(BaudError::Unreachable) => panic!("baud rate divisor out of range"),
        Err(BaudError::TooInaccurate { .. }) => {
            panic!("systematic baud rate error is too large, it must be lower than 1%")
        }
    };
}
