//! Configuration types
//!
//! Board wiring and LCD timing. Loaded from TOML by the runtime crate.

pub mod board;

pub use board::*;
