//! Shared expander handle
//!
//! The LCD session and the switch poller run on different threads but talk
//! to the same chip. Each register access takes the lock for that access
//! only; a read-modify-write holds it for both halves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use picad_hal::{PortExpander, Register};

/// Clonable handle to one expander device
pub struct SharedExpander<P> {
    device: Arc<Mutex<P>>,
    closed: Arc<AtomicBool>,
}

impl<P> SharedExpander<P> {
    pub fn new(device: P) -> Self {
        Self {
            device: Arc::new(Mutex::new(device)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Exclusive access to the device
    ///
    /// A poisoned lock is recovered: the device holds no invariants a
    /// panicking holder could have broken.
    pub fn lock(&self) -> MutexGuard<'_, P> {
        self.device.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check whether the board closed the device
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl<P> Clone for SharedExpander<P> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<P: PortExpander> PortExpander for SharedExpander<P> {
    type Error = P::Error;

    fn read_register(&mut self, reg: Register, hw_address: u8) -> Result<u8, Self::Error> {
        self.lock().read_register(reg, hw_address)
    }

    fn write_register(
        &mut self,
        value: u8,
        reg: Register,
        hw_address: u8,
    ) -> Result<(), Self::Error> {
        self.lock().write_register(value, reg, hw_address)
    }

    fn read_bit(&mut self, bit: u8, reg: Register, hw_address: u8) -> Result<bool, Self::Error> {
        self.lock().read_bit(bit, reg, hw_address)
    }

    fn write_bit(
        &mut self,
        set: bool,
        bit: u8,
        reg: Register,
        hw_address: u8,
    ) -> Result<(), Self::Error> {
        self.lock().write_bit(set, bit, reg, hw_address)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.lock().close()
    }
}
