//! DDRAM address arithmetic

use super::command::{MAX_COL, MAX_LINES, RAM_WIDTH};

/// Base DDRAM address of each line
pub const ROW_OFFSETS: [u8; MAX_LINES as usize] = [0x00, 0x40];

/// Clamp a column into the addressable range
pub fn clamp_col(col: u8) -> u8 {
    col.min(MAX_COL)
}

/// Clamp a row into the available lines
pub fn clamp_row(row: u8) -> u8 {
    row.min(MAX_LINES - 1)
}

/// Convert a column and row into a DDRAM address
///
/// Inputs are clamped first. The result wraps at the 80 byte DDRAM width,
/// which keeps the 16 visible columns of line 1 at 0x40..0x4F.
pub fn col_row_to_address(col: u8, row: u8) -> u8 {
    let address = clamp_col(col) as u16 + ROW_OFFSETS[clamp_row(row) as usize] as u16;
    (address % RAM_WIDTH as u16) as u8
}

/// Column component of an address
pub fn address_to_col(address: u8) -> u8 {
    address % ROW_OFFSETS[1]
}

/// Row component of an address
pub fn address_to_row(address: u8) -> u8 {
    if address >= ROW_OFFSETS[1] {
        1
    } else {
        0
    }
}

/// Address after writing one character
pub fn next_address(address: u8) -> u8 {
    ((address as u16 + 1) % RAM_WIDTH as u16) as u8
}
