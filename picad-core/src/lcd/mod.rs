//! HD44780 character LCD
//!
//! The display is wired to port B of the expander in 4-bit mode. See
//! [`command`] for the pin assignment.

pub mod address;
pub mod command;
pub mod driver;

pub use address::{address_to_col, address_to_row, col_row_to_address, ROW_OFFSETS};
pub use driver::{LcdDriver, LcdState, TextDirection};
