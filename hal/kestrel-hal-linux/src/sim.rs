//! Simulated USART peripheral for host threads
//!
//! Runs the interrupt-driven transport from `kestrel-core` on a PC. A
//! dispatcher thread plays the interrupt controller: it calls the USART
//! handlers whenever their source is enabled and there is work. Masking a
//! source from mainline code waits for an in-flight handler of the
//! simulation to finish, which gives the same exclusion a single-core MCU
//! gets for free.
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use kestrel_core::Usart;
//! use kestrel_hal_linux::{sim, SimulatedUsart, StdDelay};
//!
//! let usart: Usart<SimulatedUsart> = Usart::new(SimulatedUsart::new());
//! let stop = AtomicBool::new(false);
//! std::thread::scope(|s| {
//!     s.spawn(|| sim::dispatch_until(&usart, &stop));
//!     usart.start();
//!     let (_rx, mut tx) = usart.split(StdDelay).unwrap();
//!     tx.write(b"hello\n");
//!     tx.wait_drained();
//!     stop.store(true, std::sync::atomic::Ordering::Release);
//! });
//! assert_eq!(usart.peripheral().take_output(), b"hello\n");
//! ```

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use kestrel_core::Usart;
use kestrel_hal::{DataRegister, InterruptControl, IrqSource};

thread_local! {
    static IN_HANDLER: Cell<bool> = const { Cell::new(false) };
}

#[derive(Default)]
struct Wire {
    incoming: VecDeque<u8>,
    outgoing: Vec<u8>,
    data: u8,
}

/// USART peripheral backed by in-memory byte queues
#[derive(Default)]
pub struct SimulatedUsart {
    receive: AtomicBool,
    transmit: AtomicBool,
    /// Held while a handler runs
    dispatch: Mutex<()>,
    wire: Mutex<Wire>,
}

impl SimulatedUsart {
    pub const fn new() -> Self {
        Self {
            receive: AtomicBool::new(false),
            transmit: AtomicBool::new(false),
            dispatch: Mutex::new(()),
            wire: Mutex::new(Wire {
                incoming: VecDeque::new(),
                outgoing: Vec::new(),
                data: 0,
            }),
        }
    }

    /// Queue bytes as if they arrived on the line
    pub fn feed(&self, bytes: &[u8]) {
        log::trace!("sim: {} bytes incoming", bytes.len());
        self.wire().incoming.extend(bytes);
    }

    /// Bytes that arrived but were not yet received by the handler
    pub fn pending_input(&self) -> usize {
        self.wire().incoming.len()
    }

    /// Everything transmitted since the last call
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.wire().outgoing)
    }

    fn wire(&self) -> MutexGuard<'_, Wire> {
        self.wire.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flag(&self, source: IrqSource) -> &AtomicBool {
        match source {
            IrqSource::Receive => &self.receive,
            IrqSource::Transmit => &self.transmit,
        }
    }

    /// Wait out a handler that may have started before the mask
    fn quiesce(&self) {
        if !IN_HANDLER.with(Cell::get) {
            drop(self.dispatch.lock().unwrap_or_else(PoisonError::into_inner));
        }
    }
}

impl InterruptControl for SimulatedUsart {
    fn is_enabled(&self, source: IrqSource) -> bool {
        self.flag(source).load(Ordering::Acquire)
    }

    fn enable(&self, source: IrqSource) {
        self.flag(source).store(true, Ordering::Release);
    }

    fn disable(&self, source: IrqSource) {
        self.flag(source).store(false, Ordering::Release);
        self.quiesce();
    }

    fn suspend(&self, source: IrqSource) -> bool {
        let was_enabled = self.flag(source).swap(false, Ordering::AcqRel);
        self.quiesce();
        was_enabled
    }
}

impl DataRegister for SimulatedUsart {
    fn read_data(&self) -> u8 {
        self.wire().data
    }

    fn write_data(&self, byte: u8) {
        self.wire().outgoing.push(byte);
    }
}

/// Run each enabled handler once if it has work
///
/// Returns whether any handler ran.
pub fn service<const RX: usize, const TX: usize>(usart: &Usart<SimulatedUsart, RX, TX>) -> bool {
    let sim = usart.peripheral();
    let _dispatch = sim.dispatch.lock().unwrap_or_else(PoisonError::into_inner);
    IN_HANDLER.with(|flag| flag.set(true));

    let mut ran = false;
    if sim.is_enabled(IrqSource::Receive) {
        let arrived = sim.wire().incoming.pop_front();
        if let Some(byte) = arrived {
            sim.wire().data = byte;
            // SAFETY: handlers only run under the dispatch lock, which the
            // receive guard waits for after masking
            unsafe { usart.on_receive() };
            ran = true;
        }
    }
    if sim.is_enabled(IrqSource::Transmit) {
        // SAFETY: as above, for the transmit guard
        unsafe { usart.on_transmit_ready() };
        ran = true;
    }

    IN_HANDLER.with(|flag| flag.set(false));
    ran
}

/// Dispatch handlers until `stop` is set
pub fn dispatch_until<const RX: usize, const TX: usize>(
    usart: &Usart<SimulatedUsart, RX, TX>,
    stop: &AtomicBool,
) {
    log::debug!("sim: dispatcher running");
    while !stop.load(Ordering::Acquire) {
        if !service(usart) {
            std::thread::yield_now();
        }
    }
    log::debug!("sim: dispatcher stopped");
}
