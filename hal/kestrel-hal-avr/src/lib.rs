//! ATmega328P backend for the Kestrel serial stack
//!
//! Provides the USART0 register driver behind the `kestrel-hal` traits,
//! compile-time checked baud rates, program memory byte sources and a
//! cycle-counting delay.
//!
//! # Usage
//!
//! ```ignore
//! #![feature(abi_avr_interrupt)]
//!
//! use kestrel_hal_avr::{Baud, CycleDelay, Usart0, Usart0Driver};
//!
//! const F_CPU: u32 = 16_000_000;
//!
//! static SERIAL: Usart0Driver = Usart0Driver::new(unsafe { Usart0::new() });
//! kestrel_hal_avr::usart0_interrupts!(SERIAL);
//!
//! fn main() -> ! {
//!     SERIAL.peripheral().init(Baud::<F_CPU, 19_200>::UBRR);
//!     SERIAL.start();
//!     unsafe { avr_device::interrupt::enable() };
//!
//!     let (mut rx, mut tx) = SERIAL.split(CycleDelay::<F_CPU>::new()).unwrap();
//!     let mut line = [0u8; 32];
//!     loop {
//!         if rx.is_line_available() {
//!             let n = rx.read_line(&mut line);
//!             tx.write(&line[..n]);
//!             tx.write(b"\n");
//!         }
//!     }
//! }
//! ```
//!
//! Register updates from mainline code run inside
//! `critical_section::with`, so the firmware must link a critical-section
//! implementation (e.g. `avr-device` with `critical-section-impl`).
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support

#![no_std]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod baud;
pub mod delay;
pub mod progmem;
pub mod usart;

pub use baud::{Baud, BaudError, Ubrr};
pub use delay::CycleDelay;
pub use progmem::ProgramSpace;
pub use usart::Usart0;

/// Buffered, interrupt-driven USART0
pub type Usart0Driver<
    const RX: usize = { kestrel_core::usart::DEFAULT_RX_BUFFER },
    const TX: usize = { kestrel_core::usart::DEFAULT_TX_BUFFER },
> = kestrel_core::Usart<Usart0, RX, TX>;

/// Bind the USART0 interrupt vectors to a driver in a `static`
///
/// Defines the receive-complete (`USART_RX`, vector 18) and
/// data-register-empty (`USART_UDRE`, vector 19) handlers. The invoking
/// crate needs `#![feature(abi_avr_interrupt)]`.
#[macro_export]
macro_rules! usart0_interrupts {
    ($driver:path) => {
        #[doc(hidden)]
        #[no_mangle]
        pub unsafe extern "avr-interrupt" fn __vector_18() {
            // SAFETY: this is the USART0 receive-complete vector
            unsafe { $driver.on_receive() }
        }

        #[doc(hidden)]
        #[no_mangle]
        pub unsafe extern "avr-interrupt" fn __vector_19() {
            // SAFETY: this is the USART0 data-register-empty vector
            unsafe { $driver.on_transmit_ready() }
        }
    };
}
