//! Switch panel input
//!
//! Address arithmetic, handler registration and sampling state. The timer
//! that drives sampling lives in the runtime crate.

pub mod buttons;
pub mod poll;

pub use buttons::{
    pressed_buttons, ButtonAddress, ButtonMap, RegistrationError, BUTTON_COUNT, NO_BUTTONS,
};
pub use poll::{IntervalChange, PollState, PollerEvent, PollerState, SwitchDebouncer};
