//! PiCAD Hardware Abstraction Layer
//!
//! This crate defines the register access contract for the MCP23S17 port
//! expander that sits between the host and the board. The expander driver
//! itself (SPI framing, device node handling) lives outside this workspace
//! and implements these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  picad (board, display, input poller)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  picad-core (HD44780 protocol, buttons) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  picad-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  external MCP23S17 driver (SPI)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`expander::ExpanderConnector`] - Open a device handle on a bus
//! - [`expander::PortExpander`] - Byte and bit register access

#![no_std]
#![deny(unsafe_code)]

pub mod expander;
pub mod register;

pub use expander::{ExpanderConnector, PortExpander, MAX_HW_ADDRESS};
pub use register::{IoConfig, Port, Register};
