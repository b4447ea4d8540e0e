//! Test doubles for the runtime tests

use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::delay::DelayNs;
use picad_core::lcd::command::pin;
use picad_hal::{ExpanderConnector, PortExpander, Register};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

pub struct MockState {
    pub regs: [u8; 0x16],
    /// Every register write, in order
    pub writes: Vec<(Register, u8)>,
    pub closed: bool,
    pub fail_reads: bool,
    /// Writes fail once this many have succeeded
    pub fail_writes_after: Option<usize>,
    pub fail_close: bool,
}

/// Register file shared between the test and the code under test
#[derive(Clone)]
pub struct MockExpander {
    state: Arc<Mutex<MockState>>,
}

impl MockExpander {
    pub fn new() -> Self {
        let mut regs = [0; 0x16];
        regs[Register::GpioA.addr() as usize] = 0xFF;
        Self {
            state: Arc::new(Mutex::new(MockState {
                regs,
                writes: Vec::new(),
                closed: false,
                fail_reads: false,
                fail_writes_after: None,
                fail_close: false,
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn reg(&self, reg: Register) -> u8 {
        self.state().regs[reg.addr() as usize]
    }

    /// Set what the switch register reads back
    pub fn set_switches(&self, value: u8) {
        self.state().regs[Register::GpioA.addr() as usize] = value;
    }

    pub fn backlight(&self) -> bool {
        self.reg(Register::GpioB) & (1 << pin::BACKLIGHT) != 0
    }

    /// Writes to registers other than the LCD port
    pub fn config_writes(&self) -> Vec<(Register, u8)> {
        self.state()
            .writes
            .iter()
            .copied()
            .filter(|(reg, _)| *reg != Register::GpioB)
            .collect()
    }

    /// Command bytes latched by the LCD, decoded from the enable edges
    pub fn commands(&self) -> Vec<u8> {
        let state = self.state();
        let mut nibbles = Vec::new();
        let mut enable = false;

        for &(reg, value) in &state.writes {
            if reg != Register::GpioB {
                continue;
            }
            let high = value & (1 << pin::ENABLE) != 0;
            if high && !enable {
                nibbles.push((value & (1 << pin::RS) != 0, value & 0x0F));
            }
            enable = high;
        }

        nibbles
            .chunks(2)
            .filter(|pair| pair.len() == 2 && !pair[0].0)
            .map(|pair| (pair[0].1 << 4) | pair[1].1)
            .collect()
    }
}

impl PortExpander for MockExpander {
    type Error = MockError;

    fn read_register(&mut self, reg: Register, _hw_address: u8) -> Result<u8, MockError> {
        let state = self.state();
        if state.fail_reads {
            return Err(MockError);
        }
        Ok(state.regs[reg.addr() as usize])
    }

    fn write_register(
        &mut self,
        value: u8,
        reg: Register,
        _hw_address: u8,
    ) -> Result<(), MockError> {
        let mut state = self.state();
        if state.fail_writes_after.is_some_and(|n| state.writes.len() >= n) {
            return Err(MockError);
        }
        state.regs[reg.addr() as usize] = value;
        state.writes.push((reg, value));
        Ok(())
    }

    fn close(&mut self) -> Result<(), MockError> {
        let mut state = self.state();
        state.closed = true;
        if state.fail_close {
            return Err(MockError);
        }
        Ok(())
    }
}

/// Hands out a clone of one mock device
pub struct MockConnector {
    pub device: MockExpander,
    pub fail: bool,
    pub opened: Option<(u8, u8)>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            device: MockExpander::new(),
            fail: false,
            opened: None,
        }
    }
}

impl ExpanderConnector for MockConnector {
    type Device = MockExpander;
    type Error = MockError;

    fn open(&mut self, bus: u8, chip_select: u8) -> Result<MockExpander, MockError> {
        if self.fail {
            return Err(MockError);
        }
        self.opened = Some((bus, chip_select));
        Ok(self.device.clone())
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
