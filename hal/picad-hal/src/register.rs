//! MCP23S17 register map
//!
//! Addresses assume IOCON.BANK = 0 (paired A/B registers), which is the
//! power-on default and the layout the board is configured with.

/// MCP23S17 register addresses (BANK = 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// I/O direction A (1 = input)
    IoDirA = 0x00,
    /// I/O direction B
    IoDirB = 0x01,
    /// Input polarity A
    IPolA = 0x02,
    /// Input polarity B
    IPolB = 0x03,
    /// Interrupt-on-change enable A
    GpIntEnA = 0x04,
    /// Interrupt-on-change enable B
    GpIntEnB = 0x05,
    /// Default compare value A
    DefValA = 0x06,
    /// Default compare value B
    DefValB = 0x07,
    /// Interrupt control A
    IntConA = 0x08,
    /// Interrupt control B
    IntConB = 0x09,
    /// I/O configuration
    IoCon = 0x0A,
    /// I/O configuration (mirror of IOCON)
    IoConB = 0x0B,
    /// Pull-up enable A
    GpPuA = 0x0C,
    /// Pull-up enable B
    GpPuB = 0x0D,
    /// Interrupt flag A
    IntFA = 0x0E,
    /// Interrupt flag B
    IntFB = 0x0F,
    /// Interrupt capture A
    IntCapA = 0x10,
    /// Interrupt capture B
    IntCapB = 0x11,
    /// Port A
    GpioA = 0x12,
    /// Port B
    GpioB = 0x13,
    /// Output latch A
    OLatA = 0x14,
    /// Output latch B
    OLatB = 0x15,
}

impl Register {
    /// Register address as sent on the wire
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// One of the two 8-bit ports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
}

impl Port {
    /// Data register for this port
    pub const fn gpio(self) -> Register {
        match self {
            Port::A => Register::GpioA,
            Port::B => Register::GpioB,
        }
    }

    /// Direction register for this port
    pub const fn iodir(self) -> Register {
        match self {
            Port::A => Register::IoDirA,
            Port::B => Register::IoDirB,
        }
    }

    /// Pull-up register for this port
    pub const fn gppu(self) -> Register {
        match self {
            Port::A => Register::GpPuA,
            Port::B => Register::GpPuB,
        }
    }

    /// Interrupt-enable register for this port
    pub const fn gpinten(self) -> Register {
        match self {
            Port::A => Register::GpIntEnA,
            Port::B => Register::GpIntEnB,
        }
    }
}

/// IOCON bit values
pub mod iocon {
    /// Registers grouped per port instead of paired
    pub const BANK: u8 = 0x80;
    /// INTA/INTB pins internally connected
    pub const MIRROR: u8 = 0x40;
    /// Sequential operation disabled (address pointer does not increment)
    pub const SEQOP: u8 = 0x20;
    /// Slew rate control on SDA disabled
    pub const DISSLW: u8 = 0x10;
    /// Hardware address pins enabled
    pub const HAEN: u8 = 0x08;
    /// INT pin configured as open-drain
    pub const ODR: u8 = 0x04;
    /// INT pin active-high
    pub const INTPOL: u8 = 0x02;
}

/// Interrupt pin polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntPolarity {
    ActiveLow,
    ActiveHigh,
}

/// IOCON configuration
///
/// Written once when the device is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoConfig {
    /// BANK addressing mode (false = paired registers)
    pub bank: bool,
    /// Mirror INTA/INTB
    pub int_mirror: bool,
    /// Auto-increment the address pointer between transfers
    pub sequential: bool,
    /// Slew rate control enabled
    pub slew_rate: bool,
    /// Use the A2..A0 pins as a hardware address
    pub hardware_addressing: bool,
    /// INT pin as open-drain output
    pub open_drain: bool,
    /// INT pin polarity (ignored when open-drain)
    pub polarity: IntPolarity,
}

impl IoConfig {
    /// Configuration used by the PiFace Control and Display board
    pub const BOARD: Self = Self {
        bank: false,
        int_mirror: false,
        sequential: false,
        slew_rate: true,
        hardware_addressing: true,
        open_drain: false,
        polarity: IntPolarity::ActiveLow,
    };

    /// Encode as an IOCON register value
    pub const fn bits(&self) -> u8 {
        let mut value = 0;
        if self.bank {
            value |= iocon::BANK;
        }
        if self.int_mirror {
            value |= iocon::MIRROR;
        }
        if !self.sequential {
            value |= iocon::SEQOP;
        }
        if !self.slew_rate {
            value |= iocon::DISSLW;
        }
        if self.hardware_addressing {
            value |= iocon::HAEN;
        }
        if self.open_drain {
            value |= iocon::ODR;
        }
        if matches!(self.polarity, IntPolarity::ActiveHigh) {
            value |= iocon::INTPOL;
        }
        value
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self::BOARD
    }
}
