//! Board-agnostic core logic for the PiCAD display and switch panel
//!
//! This crate contains everything that does not depend on threads or an
//! operating system:
//!
//! - HD44780 protocol driver (nibble transfers over the port expander)
//! - Button address arithmetic and the handler map
//! - Switch debouncing and the poller state machine
//! - Display power bookkeeping
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod input;
pub mod lcd;
pub mod session;

#[cfg(test)]
mod testing;
