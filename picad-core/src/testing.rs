//! Test doubles shared by the unit tests in this crate

use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use picad_hal::{PortExpander, Register};

use crate::lcd::command::pin;

/// Error returned once the mock's failure point is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Register access as seen by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read(Register),
    Write(Register, u8),
}

/// One byte latched by the LCD controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// RS was high (data register)
    pub data: bool,
    pub byte: u8,
}

/// Register file backed expander that logs every access
pub struct RecordingExpander {
    pub regs: [u8; 0x16],
    pub ops: Vec<Op>,
    /// Fail every access once this many operations have been logged
    pub fail_after: Option<usize>,
}

impl RecordingExpander {
    pub fn new() -> Self {
        let mut regs = [0; 0x16];
        regs[Register::GpioA.addr() as usize] = 0xFF;
        Self {
            regs,
            ops: Vec::new(),
            fail_after: None,
        }
    }

    pub fn reg(&self, reg: Register) -> u8 {
        self.regs[reg.addr() as usize]
    }

    pub fn backlight(&self) -> bool {
        self.reg(Register::GpioB) & (1 << pin::BACKLIGHT) != 0
    }

    /// Nibbles latched on each rising edge of the enable line, with RS
    pub fn nibbles(&self) -> Vec<(bool, u8)> {
        let mut latched = Vec::new();
        let mut enable = false;

        for op in &self.ops {
            if let Op::Write(Register::GpioB, value) = *op {
                let high = value & (1 << pin::ENABLE) != 0;
                if high && !enable {
                    latched.push((value & (1 << pin::RS) != 0, value & 0x0F));
                }
                enable = high;
            }
        }
        latched
    }

    /// Latched nibbles paired into bytes (assumes 4-bit mode throughout)
    pub fn transfers(&self) -> Vec<Transfer> {
        self.nibbles()
            .chunks(2)
            .filter(|pair| pair.len() == 2)
            .map(|pair| Transfer {
                data: pair[0].0,
                byte: (pair[0].1 << 4) | pair[1].1,
            })
            .collect()
    }

    /// Command bytes only
    pub fn commands(&self) -> Vec<u8> {
        self.transfers()
            .into_iter()
            .filter(|t| !t.data)
            .map(|t| t.byte)
            .collect()
    }

    /// Data bytes only
    pub fn data(&self) -> Vec<u8> {
        self.transfers()
            .into_iter()
            .filter(|t| t.data)
            .map(|t| t.byte)
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.ops.clear();
    }

    fn check(&self) -> Result<(), MockError> {
        match self.fail_after {
            Some(limit) if self.ops.len() >= limit => Err(MockError),
            _ => Ok(()),
        }
    }
}

impl PortExpander for RecordingExpander {
    type Error = MockError;

    fn read_register(&mut self, reg: Register, _hw_address: u8) -> Result<u8, MockError> {
        self.check()?;
        self.ops.push(Op::Read(reg));
        Ok(self.reg(reg))
    }

    fn write_register(
        &mut self,
        value: u8,
        reg: Register,
        _hw_address: u8,
    ) -> Result<(), MockError> {
        self.check()?;
        self.ops.push(Op::Write(reg, value));
        self.regs[reg.addr() as usize] = value;
        Ok(())
    }
}

/// Delay that only accumulates the requested time
#[derive(Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}
