//! Port expander register access
//!
//! Provides the byte and bit level register operations the board driver
//! consumes. Errors from the implementation are handed back to callers
//! unchanged; nothing in this workspace retries them.

use crate::register::Register;

/// Highest hardware address selectable through the A2..A0 pins
pub const MAX_HW_ADDRESS: u8 = 7;

/// Opened port expander device
///
/// Every call carries the hardware address of the chip on the shared
/// chip-select line.
pub trait PortExpander {
    /// Error type for register operations
    type Error;

    /// Read a full 8-bit register
    fn read_register(&mut self, reg: Register, hw_address: u8) -> Result<u8, Self::Error>;

    /// Write a full 8-bit register
    fn write_register(&mut self, value: u8, reg: Register, hw_address: u8)
        -> Result<(), Self::Error>;

    /// Read a single bit (0-7) of a register
    fn read_bit(&mut self, bit: u8, reg: Register, hw_address: u8) -> Result<bool, Self::Error> {
        let value = self.read_register(reg, hw_address)?;
        Ok((value >> (bit & 0x7)) & 1 == 1)
    }

    /// Set or clear a single bit (0-7) of a register
    ///
    /// The default implementation is a read-modify-write of the full register.
    fn write_bit(
        &mut self,
        set: bool,
        bit: u8,
        reg: Register,
        hw_address: u8,
    ) -> Result<(), Self::Error> {
        let mask = 1 << (bit & 0x7);
        let value = self.read_register(reg, hw_address)?;
        let value = if set { value | mask } else { value & !mask };
        self.write_register(value, reg, hw_address)
    }

    /// Release the device handle
    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Opens port expander devices
pub trait ExpanderConnector {
    /// Device produced by a successful open
    type Device: PortExpander;

    /// Error type for open failures
    type Error;

    /// Open the expander on the given SPI bus and chip select
    fn open(&mut self, bus: u8, chip_select: u8) -> Result<Self::Device, Self::Error>;
}

impl<T: PortExpander + ?Sized> PortExpander for &mut T {
    type Error = T::Error;

    fn read_register(&mut self, reg: Register, hw_address: u8) -> Result<u8, Self::Error> {
        T::read_register(self, reg, hw_address)
    }

    fn write_register(
        &mut self,
        value: u8,
        reg: Register,
        hw_address: u8,
    ) -> Result<(), Self::Error> {
        T::write_register(self, value, reg, hw_address)
    }

    fn read_bit(&mut self, bit: u8, reg: Register, hw_address: u8) -> Result<bool, Self::Error> {
        T::read_bit(self, bit, reg, hw_address)
    }

    fn write_bit(
        &mut self,
        set: bool,
        bit: u8,
        reg: Register,
        hw_address: u8,
    ) -> Result<(), Self::Error> {
        T::write_bit(self, set, bit, reg, hw_address)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        T::close(self)
    }
}
