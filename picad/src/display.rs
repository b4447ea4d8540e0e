//! Shared display handle with auto-off
//!
//! [`Display::write_for`] arms a one-shot timer that clears the screen and
//! switches it off when it expires. Any later write cancels a pending
//! timer first. Cancelling waits for a callback that is already running,
//! so it is done before the session lock is taken.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use picad_core::lcd::command::GLYPH_ROWS;
use picad_core::lcd::TextDirection;
use picad_core::session::{DisplaySession, PowerState};
use picad_hal::PortExpander;

use crate::error::Error;
use crate::shared::SharedExpander;
use crate::timer::OneShot;

/// Power snapshot reported by [`Display::power_state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayPowerState {
    pub display_on: bool,
    pub backlight_on: bool,
    /// An auto-off timer is armed
    pub timeout_active: bool,
}

type Session<P, D> = DisplaySession<SharedExpander<P>, D>;

struct Inner<P, D> {
    session: Mutex<Session<P, D>>,
    port: SharedExpander<P>,
    timer: Mutex<Option<OneShot>>,
}

impl<P, D> Inner<P, D> {
    fn session(&self) -> MutexGuard<'_, Session<P, D>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn timer(&self) -> MutexGuard<'_, Option<OneShot>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Display handle
///
/// Cheap to clone, so button handlers can capture one.
pub struct Display<P, D> {
    inner: Arc<Inner<P, D>>,
}

impl<P, D> Clone for Display<P, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, D> Display<P, D>
where
    P: PortExpander + Send + 'static,
    P::Error: fmt::Debug,
    D: DelayNs + Send + 'static,
{
    pub fn new(session: Session<P, D>, port: SharedExpander<P>) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(session),
                port,
                timer: Mutex::new(None),
            }),
        }
    }

    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut Session<P, D>) -> Result<T, P::Error>,
    ) -> Result<T, Error<P::Error>> {
        if self.inner.port.is_closed() {
            return Err(Error::Closed);
        }
        f(&mut self.inner.session()).map_err(Error::Io)
    }

    /// Write text, cancelling any pending auto-off
    ///
    /// Display and backlight are switched on first if needed. Returns the
    /// resulting DDRAM address.
    pub fn write(&self, text: &str) -> Result<u8, Error<P::Error>> {
        self.cancel_timeout();
        self.with_session(|s| s.write(text))
    }

    /// Write text and switch the display off after `timeout`
    pub fn write_for(&self, text: &str, timeout: Duration) -> Result<u8, Error<P::Error>> {
        let address = self.write(text)?;

        let weak: Weak<Inner<P, D>> = Arc::downgrade(&self.inner);
        let timer = OneShot::spawn("picad-display-off", timeout, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.port.is_closed() {
                return;
            }
            debug!("display timeout expired");
            let result = inner.session().power_down();
            if let Err(e) = result {
                warn!("failed to switch display off: {:?}", e);
            }
        })
        .map_err(Error::Spawn)?;

        // A concurrent write_for may have armed one in between
        let previous = self.inner.timer().replace(timer);
        if let Some(mut previous) = previous {
            previous.cancel();
        }
        Ok(address)
    }

    /// Cancel a pending auto-off
    ///
    /// Returns true if one was pending. Waits for the callback if it is
    /// already running.
    pub fn cancel_timeout(&self) -> bool {
        let timer = self.inner.timer().take();
        match timer {
            Some(mut timer) => {
                let pending = timer.is_pending();
                timer.cancel();
                if pending {
                    debug!("display timeout cancelled");
                }
                pending
            }
            None => false,
        }
    }

    /// Check whether an auto-off timer is armed
    pub fn timeout_pending(&self) -> bool {
        self.inner.timer().as_ref().is_some_and(OneShot::is_pending)
    }

    /// Current power bookkeeping
    pub fn power_state(&self) -> DisplayPowerState {
        let power = self.inner.session().power();
        DisplayPowerState {
            display_on: power.display_on,
            backlight_on: power.backlight_on,
            timeout_active: self.timeout_pending(),
        }
    }

    /// Switch the display on or off (off also darkens the backlight)
    pub fn toggle_display(&self, state: PowerState) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.toggle_display(state))
    }

    pub fn toggle_backlight(&self, state: PowerState) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.toggle_backlight(state))
    }

    pub fn flip_display(&self) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.flip_display())
    }

    pub fn flip_backlight(&self) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.flip_backlight())
    }

    /// Clear and switch off now
    pub fn power_down(&self) -> Result<(), Error<P::Error>> {
        self.cancel_timeout();
        self.with_session(|s| s.power_down())
    }

    pub fn clear(&self) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.clear())
    }

    pub fn home(&self) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.home())
    }

    /// Move the cursor; out-of-range values are clamped
    pub fn set_cursor(&self, col: u8, row: u8) -> Result<u8, Error<P::Error>> {
        self.with_session(|s| s.set_cursor(col, row))
    }

    pub fn set_cursor_visible(&self, on: bool) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.set_cursor_visible(on))
    }

    pub fn set_blink(&self, on: bool) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.set_blink(on))
    }

    pub fn set_autoscroll(&self, on: bool) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.set_autoscroll(on))
    }

    pub fn set_text_direction(&self, direction: TextDirection) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.set_text_direction(direction))
    }

    pub fn move_cursor_left(&self) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.move_cursor_left())
    }

    pub fn move_cursor_right(&self) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.move_cursor_right())
    }

    /// Store an 8-row glyph in CGRAM slot `location` (0-7)
    pub fn store_custom_bitmap(
        &self,
        location: u8,
        bitmap: &[u8; GLYPH_ROWS],
    ) -> Result<(), Error<P::Error>> {
        self.with_session(|s| s.store_custom_bitmap(location, bitmap))
    }

    /// Write a stored glyph at the cursor
    pub fn write_custom_bitmap(&self, location: u8) -> Result<u8, Error<P::Error>> {
        self.with_session(|s| s.write_custom_bitmap(location))
    }
}
