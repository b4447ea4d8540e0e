//! HD44780 instruction set and board wiring
//!
//! Port B of the expander drives the controller in 4-bit mode: the low
//! nibble carries D4..D7, the high nibble carries the control lines.

/// Instruction codes
pub mod cmd {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const RETURN_HOME: u8 = 0x02;
    pub const ENTRY_MODE_SET: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const CURSOR_SHIFT: u8 = 0x10;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const SET_CGRAM_ADDR: u8 = 0x40;
    pub const SET_DDRAM_ADDR: u8 = 0x80;
}

/// Instruction flags
pub mod flag {
    // Entry mode
    pub const ENTRY_RIGHT: u8 = 0x00;
    pub const ENTRY_LEFT: u8 = 0x02;
    pub const ENTRY_SHIFT_INCREMENT: u8 = 0x01;
    pub const ENTRY_SHIFT_DECREMENT: u8 = 0x00;

    // Display control
    pub const DISPLAY_ON: u8 = 0x04;
    pub const DISPLAY_OFF: u8 = 0x00;
    pub const CURSOR_ON: u8 = 0x02;
    pub const CURSOR_OFF: u8 = 0x00;
    pub const BLINK_ON: u8 = 0x01;
    pub const BLINK_OFF: u8 = 0x00;

    // Cursor / display shift
    pub const DISPLAY_MOVE: u8 = 0x08;
    pub const CURSOR_MOVE: u8 = 0x00;
    pub const MOVE_RIGHT: u8 = 0x04;
    pub const MOVE_LEFT: u8 = 0x00;

    // Function set
    pub const MODE_8BIT: u8 = 0x10;
    pub const MODE_4BIT: u8 = 0x00;
    pub const LINES_2: u8 = 0x08;
    pub const LINES_1: u8 = 0x00;
    pub const DOTS_5X10: u8 = 0x04;
    pub const DOTS_5X8: u8 = 0x00;
}

/// Port B bit assignments
pub mod pin {
    pub const D4: u8 = 0;
    pub const D5: u8 = 1;
    pub const D6: u8 = 2;
    pub const D7: u8 = 3;
    pub const ENABLE: u8 = 4;
    pub const RW: u8 = 5;
    pub const RS: u8 = 6;
    pub const BACKLIGHT: u8 = 7;
}

/// Number of display lines
pub const MAX_LINES: u8 = 2;

/// Visible columns
pub const WIDTH: u8 = 16;

/// DDRAM size across both lines
pub const RAM_WIDTH: u8 = 80;

/// Highest addressable column on a line
pub const MAX_COL: u8 = RAM_WIDTH / 2 - 1;

/// CGRAM glyph slots
pub const GLYPH_SLOTS: u8 = 8;

/// Rows per CGRAM glyph (5x8 font)
pub const GLYPH_ROWS: usize = 8;

/// Nibble written three times to force 8-bit mode from an unknown state
pub const RESET_NIBBLE: u8 = 0x03;

/// Nibble that latches 4-bit mode
pub const FOUR_BIT_NIBBLE: u8 = 0x02;
