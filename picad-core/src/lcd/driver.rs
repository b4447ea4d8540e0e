//! HD44780 driver over the port expander
//!
//! Every byte goes out as two nibbles on port B, each latched by a pulse
//! on the enable line. The driver keeps a copy of the entry mode, function
//! set and display control bytes so a single attribute change can re-send
//! the complete instruction.
//!
//! # Usage
//!
//! ```ignore
//! let mut lcd = LcdDriver::new(expander, delay, 0, LcdTiming::BOARD);
//! lcd.init()?;
//! lcd.write("PiCAD\nready")?;
//! lcd.set_backlight(true)?;
//! ```

use embedded_hal::delay::DelayNs;
use picad_hal::{PortExpander, Register};

use super::address::{clamp_row, col_row_to_address, next_address};
use super::command::{
    cmd, flag, pin, FOUR_BIT_NIBBLE, GLYPH_ROWS, GLYPH_SLOTS, MAX_LINES, RESET_NIBBLE,
};
use crate::config::LcdTiming;

/// Port carrying the LCD bus
const LCD_PORT: Register = Register::GpioB;

/// Text flow after each character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

/// Cached controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LcdState {
    /// Current DDRAM address (0-79)
    pub address: u8,
    /// Current line (0 or 1)
    pub row: u8,
    /// Last entry mode flags sent
    pub entry_mode: u8,
    /// Last function set flags sent
    pub function_set: u8,
    /// Last display control flags sent
    pub display_control: u8,
}

/// HD44780 protocol driver
pub struct LcdDriver<P, D> {
    port: P,
    delay: D,
    hw_address: u8,
    timing: LcdTiming,
    state: LcdState,
}

impl<P, D> LcdDriver<P, D>
where
    P: PortExpander,
    D: DelayNs,
{
    /// Create a driver; nothing is sent until [`init`](Self::init)
    pub fn new(port: P, delay: D, hw_address: u8, timing: LcdTiming) -> Self {
        Self {
            port,
            delay,
            hw_address,
            timing,
            state: LcdState::default(),
        }
    }

    /// Run the power-on sequence
    ///
    /// Three 8-bit resets with decreasing waits, the switch to 4-bit mode,
    /// then function set, display off, clear, entry mode and display on.
    /// The order matters: some controllers only accept the mode switch
    /// before 4-bit mode is latched.
    pub fn init(&mut self) -> Result<(), P::Error> {
        self.state = LcdState::default();

        for wait_us in self.timing.setup_us {
            self.delay.delay_us(wait_us);
            self.write_raw_nibble(RESET_NIBBLE)?;
        }
        self.write_raw_nibble(FOUR_BIT_NIBBLE)?;

        self.state.function_set |= flag::MODE_4BIT | flag::LINES_2 | flag::DOTS_5X8;
        self.send_command(cmd::FUNCTION_SET | self.state.function_set)?;

        self.state.display_control |= flag::DISPLAY_OFF | flag::CURSOR_OFF | flag::BLINK_OFF;
        self.update_display_control()?;

        self.clear()?;

        self.state.entry_mode |= flag::ENTRY_LEFT | flag::ENTRY_SHIFT_DECREMENT;
        self.update_entry_mode()?;

        self.state.display_control |= flag::DISPLAY_ON | flag::CURSOR_ON | flag::BLINK_ON;
        self.update_display_control()
    }

    /// Write text from the current cursor position
    ///
    /// `\n` moves to column 0 of the next line (wrapping back to line 0).
    /// Text past the visible columns scrolls out of view; the address wraps
    /// at the end of DDRAM. Returns the resulting address.
    pub fn write(&mut self, text: &str) -> Result<u8, P::Error> {
        self.send_command(cmd::SET_DDRAM_ADDR | self.state.address)?;

        for c in text.chars() {
            if c == '\n' {
                let row = (self.state.row + 1) % MAX_LINES;
                self.set_cursor(0, row)?;
            } else {
                self.send_data(char_code(c))?;
                self.state.address = next_address(self.state.address);
            }
        }

        Ok(self.state.address)
    }

    /// Move the cursor, clamping out-of-range input
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<u8, P::Error> {
        let address = col_row_to_address(col, row);
        self.state.row = clamp_row(row);
        self.state.address = address;
        self.send_command(cmd::SET_DDRAM_ADDR | address)?;
        Ok(address)
    }

    /// Clear the screen and return to (0, 0)
    pub fn clear(&mut self) -> Result<(), P::Error> {
        self.send_command(cmd::CLEAR_DISPLAY)?;
        self.delay.delay_us(self.timing.clear_us);
        self.reset_position();
        Ok(())
    }

    /// Return the cursor to (0, 0) without clearing
    pub fn home(&mut self) -> Result<(), P::Error> {
        self.send_command(cmd::RETURN_HOME)?;
        self.delay.delay_us(self.timing.clear_us);
        self.reset_position();
        Ok(())
    }

    /// Switch the display on or off (DDRAM content is kept)
    pub fn set_display(&mut self, on: bool) -> Result<(), P::Error> {
        set_flag(&mut self.state.display_control, flag::DISPLAY_ON, on);
        self.update_display_control()
    }

    /// Show or hide the underline cursor
    pub fn set_cursor_visible(&mut self, on: bool) -> Result<(), P::Error> {
        set_flag(&mut self.state.display_control, flag::CURSOR_ON, on);
        self.update_display_control()
    }

    /// Enable or disable the blinking block cursor
    pub fn set_blink(&mut self, on: bool) -> Result<(), P::Error> {
        set_flag(&mut self.state.display_control, flag::BLINK_ON, on);
        self.update_display_control()
    }

    /// Shift the display with each character so new text stays in view
    pub fn set_autoscroll(&mut self, on: bool) -> Result<(), P::Error> {
        set_flag(&mut self.state.entry_mode, flag::ENTRY_SHIFT_INCREMENT, on);
        self.update_entry_mode()
    }

    /// Set which way the cursor moves after each character
    pub fn set_text_direction(&mut self, direction: TextDirection) -> Result<(), P::Error> {
        let left = direction == TextDirection::LeftToRight;
        set_flag(&mut self.state.entry_mode, flag::ENTRY_LEFT, left);
        self.update_entry_mode()
    }

    /// Drive the backlight pin
    pub fn set_backlight(&mut self, on: bool) -> Result<(), P::Error> {
        self.port
            .write_bit(on, pin::BACKLIGHT, LCD_PORT, self.hw_address)
    }

    /// Shift the display contents one position left
    pub fn move_cursor_left(&mut self) -> Result<(), P::Error> {
        self.send_command(cmd::CURSOR_SHIFT | flag::DISPLAY_MOVE | flag::MOVE_LEFT)
    }

    /// Shift the display contents one position right
    pub fn move_cursor_right(&mut self) -> Result<(), P::Error> {
        self.send_command(cmd::CURSOR_SHIFT | flag::DISPLAY_MOVE | flag::MOVE_RIGHT)
    }

    /// Store a 5x8 glyph in one of the eight CGRAM slots
    pub fn store_custom_bitmap(
        &mut self,
        location: u8,
        bitmap: &[u8; GLYPH_ROWS],
    ) -> Result<(), P::Error> {
        let location = location & (GLYPH_SLOTS - 1);
        self.send_command(cmd::SET_CGRAM_ADDR | (location << 3))?;

        for &row in bitmap {
            self.send_data(row)?;
        }
        Ok(())
    }

    /// Print the glyph stored at `location` at the cursor
    pub fn write_custom_bitmap(&mut self, location: u8) -> Result<u8, P::Error> {
        self.send_command(cmd::SET_DDRAM_ADDR | self.state.address)?;
        self.send_data(location & (GLYPH_SLOTS - 1))?;
        self.state.address = next_address(self.state.address);
        Ok(self.state.address)
    }

    /// Current DDRAM address
    pub fn address(&self) -> u8 {
        self.state.address
    }

    /// Current line
    pub fn row(&self) -> u8 {
        self.state.row
    }

    /// Snapshot of the cached controller state
    pub fn state(&self) -> LcdState {
        self.state
    }

    /// Access the underlying expander (e.g. to read the switch port)
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Give back the expander and delay
    pub fn release(self) -> (P, D) {
        (self.port, self.delay)
    }

    fn reset_position(&mut self) {
        self.state.address = 0;
        self.state.row = 0;
    }

    fn update_display_control(&mut self) -> Result<(), P::Error> {
        self.send_command(cmd::DISPLAY_CONTROL | self.state.display_control)
    }

    fn update_entry_mode(&mut self) -> Result<(), P::Error> {
        self.send_command(cmd::ENTRY_MODE_SET | self.state.entry_mode)
    }

    fn send_command(&mut self, command: u8) -> Result<(), P::Error> {
        self.set_rs(false)?;
        self.send_byte(command)?;
        self.delay.delay_us(self.timing.settle_us);
        Ok(())
    }

    fn send_data(&mut self, data: u8) -> Result<(), P::Error> {
        self.set_rs(true)?;
        self.send_byte(data)?;
        self.delay.delay_us(self.timing.settle_us);
        Ok(())
    }

    /// Send a byte as two nibbles, high first
    ///
    /// The control lines in the upper half of the port are preserved.
    fn send_byte(&mut self, byte: u8) -> Result<(), P::Error> {
        let current = self.port.read_register(LCD_PORT, self.hw_address)? & 0xF0;

        self.port
            .write_register(current | (byte >> 4), LCD_PORT, self.hw_address)?;
        self.pulse_enable()?;

        self.port
            .write_register(current | (byte & 0x0F), LCD_PORT, self.hw_address)?;
        self.pulse_enable()
    }

    /// Overwrite the whole port with a bare nibble (8-bit mode reset only)
    fn write_raw_nibble(&mut self, nibble: u8) -> Result<(), P::Error> {
        self.port
            .write_register(nibble & 0x0F, LCD_PORT, self.hw_address)?;
        self.pulse_enable()
    }

    fn set_rs(&mut self, data: bool) -> Result<(), P::Error> {
        self.port
            .write_bit(data, pin::RS, LCD_PORT, self.hw_address)
    }

    fn pulse_enable(&mut self) -> Result<(), P::Error> {
        self.port
            .write_bit(true, pin::ENABLE, LCD_PORT, self.hw_address)?;
        self.delay.delay_us(self.timing.pulse_us);
        self.port
            .write_bit(false, pin::ENABLE, LCD_PORT, self.hw_address)?;
        self.delay.delay_us(self.timing.pulse_us);
        Ok(())
    }
}

fn set_flag(byte: &mut u8, mask: u8, on: bool) {
    if on {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
}

/// Character ROM code for a char
///
/// Anything outside the single-byte range is shown as a space.
fn char_code(c: char) -> u8 {
    u8::try_from(u32::from(c)).unwrap_or(b' ')
}
