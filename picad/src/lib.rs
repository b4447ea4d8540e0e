//! PiCAD runtime
//!
//! Threads, timers and the board lifecycle on top of `picad-core`:
//!
//! ```text
//! Board ──┬── Display ──── DisplaySession ── LcdDriver ──┐
//!         │      └── OneShot (auto-off)                   ├── SharedExpander ── PortExpander
//!         └── InputPoller ── Periodic (switch sampling) ──┘
//! ```
//!
//! A typical program opens the board, which starts switch polling, then
//! registers button handlers that write to the display:
//!
//! ```ignore
//! let config = picad::config::load_file("board.toml")?;
//! let board = Board::open_system(&mut connector, config)?;
//!
//! let display = board.display().clone();
//! board.input().register_single(1, move || {
//!     display.write_for("Hello", Duration::from_secs(5))?;
//!     Ok(())
//! })?;
//! ```

#![deny(unsafe_code)]

pub mod board;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod shared;
mod timer;

#[cfg(test)]
mod testing;

pub use board::{Board, SystemDelay};
pub use display::{Display, DisplayPowerState};
pub use error::{Error, HandlerError, HandlerResult};
pub use input::{Handler, InputPoller, MAX_HANDLERS};
pub use shared::SharedExpander;

pub use picad_core::config::{BoardConfig, LcdTiming};
pub use picad_core::lcd::TextDirection;
pub use picad_core::session::PowerState;
