//! Display session
//!
//! Wraps the LCD driver with power bookkeeping so that repeated on/off
//! requests do not reach the controller and text is never written to a
//! dark screen.

use embedded_hal::delay::DelayNs;
use picad_hal::PortExpander;

use super::power::{DisplayPower, PowerState};
use crate::lcd::command::GLYPH_ROWS;
use crate::lcd::{LcdDriver, LcdState, TextDirection};

/// LCD driver plus power bookkeeping
pub struct DisplaySession<P, D> {
    lcd: LcdDriver<P, D>,
    power: DisplayPower,
}

impl<P, D> DisplaySession<P, D>
where
    P: PortExpander,
    D: DelayNs,
{
    /// Take over an initialised driver and put the display in a known state
    ///
    /// Clears the screen and switches cursor, blink, backlight and display
    /// off.
    pub fn new(lcd: LcdDriver<P, D>) -> Result<Self, P::Error> {
        let mut session = Self {
            lcd,
            power: DisplayPower::default(),
        };
        session.reset()?;
        Ok(session)
    }

    fn reset(&mut self) -> Result<(), P::Error> {
        self.lcd.clear()?;
        self.lcd.set_blink(false)?;
        self.lcd.set_cursor_visible(false)?;
        self.lcd.set_backlight(false)?;
        self.lcd.set_display(false)?;
        self.power = DisplayPower::default();
        Ok(())
    }

    /// Write text, switching display and backlight on first if needed
    pub fn write(&mut self, text: &str) -> Result<u8, P::Error> {
        if !self.power.fully_on() {
            self.power_up()?;
        }
        self.lcd.write(text)
    }

    /// Switch display and backlight on
    pub fn power_up(&mut self) -> Result<(), P::Error> {
        self.toggle_display(PowerState::On)?;
        self.toggle_backlight(PowerState::On)
    }

    /// Clear the screen and switch the display (and backlight) off
    pub fn power_down(&mut self) -> Result<(), P::Error> {
        if self.power.display_on {
            self.lcd.clear()?;
            self.toggle_display(PowerState::Off)?;
        }
        Ok(())
    }

    /// Switch the display on or off
    ///
    /// No-op if already in the requested state. Switching off also
    /// switches the backlight off.
    pub fn toggle_display(&mut self, state: PowerState) -> Result<(), P::Error> {
        match state {
            PowerState::On => {
                if !self.power.display_on {
                    self.lcd.set_display(true)?;
                    self.power.display_on = true;
                }
            }
            PowerState::Off => {
                if self.power.display_on {
                    if self.power.backlight_on {
                        self.toggle_backlight(PowerState::Off)?;
                    }
                    self.lcd.set_display(false)?;
                    self.power.display_on = false;
                }
            }
        }
        Ok(())
    }

    /// Switch the backlight on or off (no-op if already there)
    pub fn toggle_backlight(&mut self, state: PowerState) -> Result<(), P::Error> {
        if state.is_on() != self.power.backlight_on {
            self.lcd.set_backlight(state.is_on())?;
            self.power.backlight_on = state.is_on();
        }
        Ok(())
    }

    /// Flip the display state
    pub fn flip_display(&mut self) -> Result<(), P::Error> {
        self.toggle_display(self.power.display().flipped())
    }

    /// Flip the backlight state
    pub fn flip_backlight(&mut self) -> Result<(), P::Error> {
        self.toggle_backlight(self.power.backlight().flipped())
    }

    pub fn clear(&mut self) -> Result<(), P::Error> {
        self.lcd.clear()
    }

    pub fn home(&mut self) -> Result<(), P::Error> {
        self.lcd.home()
    }

    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<u8, P::Error> {
        self.lcd.set_cursor(col, row)
    }

    pub fn set_cursor_visible(&mut self, on: bool) -> Result<(), P::Error> {
        self.lcd.set_cursor_visible(on)
    }

    pub fn set_blink(&mut self, on: bool) -> Result<(), P::Error> {
        self.lcd.set_blink(on)
    }

    pub fn set_autoscroll(&mut self, on: bool) -> Result<(), P::Error> {
        self.lcd.set_autoscroll(on)
    }

    pub fn set_text_direction(&mut self, direction: TextDirection) -> Result<(), P::Error> {
        self.lcd.set_text_direction(direction)
    }

    pub fn move_cursor_left(&mut self) -> Result<(), P::Error> {
        self.lcd.move_cursor_left()
    }

    pub fn move_cursor_right(&mut self) -> Result<(), P::Error> {
        self.lcd.move_cursor_right()
    }

    pub fn store_custom_bitmap(
        &mut self,
        location: u8,
        bitmap: &[u8; GLYPH_ROWS],
    ) -> Result<(), P::Error> {
        self.lcd.store_custom_bitmap(location, bitmap)
    }

    pub fn write_custom_bitmap(&mut self, location: u8) -> Result<u8, P::Error> {
        self.lcd.write_custom_bitmap(location)
    }

    /// Current power bookkeeping
    pub fn power(&self) -> DisplayPower {
        self.power
    }

    /// Cached controller state
    pub fn lcd_state(&self) -> LcdState {
        self.lcd.state()
    }

    /// Direct access to the driver
    pub fn lcd_mut(&mut self) -> &mut LcdDriver<P, D> {
        &mut self.lcd
    }

    /// Give back the driver
    pub fn into_inner(self) -> LcdDriver<P, D> {
        self.lcd
    }
}
