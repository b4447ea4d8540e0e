//! Display session: LCD driver plus power bookkeeping

pub mod display;
pub mod power;

pub use display::DisplaySession;
pub use power::{DisplayPower, PowerState};
