//! Board lifecycle
//!
//! [`Board::open`] brings the expander and the LCD to a known state and
//! hands out the display and switch handles. [`Board::close`] (or dropping
//! the board) stops the timers and releases the expander.

use std::fmt;
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use picad_core::config::BoardConfig;
use picad_core::lcd::LcdDriver;
use picad_core::session::DisplaySession;
use picad_hal::{ExpanderConnector, IoConfig, Port, PortExpander, Register};

use crate::display::Display;
use crate::error::Error;
use crate::input::InputPoller;
use crate::shared::SharedExpander;

/// Delay backed by the OS scheduler
pub type SystemDelay = linux_embedded_hal::Delay;

/// An opened PiCAD board
pub struct Board<P, D>
where
    P: PortExpander + Send + 'static,
    P::Error: fmt::Debug + Send + 'static,
    D: DelayNs + Send + 'static,
{
    port: SharedExpander<P>,
    hw_address: u8,
    display: Display<P, D>,
    input: InputPoller<P>,
    closed: bool,
}

/// Port setup written on open
///
/// Switches on port A as pulled-up inputs with interrupt-on-change, the
/// LCD bus on port B as outputs.
fn configure_ports<P: PortExpander>(device: &mut P, hw_address: u8) -> Result<(), P::Error> {
    device.write_register(IoConfig::BOARD.bits(), Register::IoCon, hw_address)?;
    device.write_register(0xFF, Port::A.iodir(), hw_address)?;
    device.write_register(0xFF, Port::A.gppu(), hw_address)?;
    device.write_register(0x00, Port::B.iodir(), hw_address)?;
    device.write_register(0xFF, Port::A.gpinten(), hw_address)
}

/// Disable the switch interrupts if enabled, then close the handle
fn release<P: PortExpander>(device: &mut P, hw_address: u8) -> Result<(), P::Error> {
    let enabled = device.read_register(Port::A.gpinten(), hw_address)?;
    if enabled != 0 {
        device.write_register(0x00, Port::A.gpinten(), hw_address)?;
    }
    device.close()
}

fn close_after_failure<P>(port: &SharedExpander<P>)
where
    P: PortExpander,
    P::Error: fmt::Debug,
{
    port.mark_closed();
    let result = port.lock().close();
    if let Err(e) = result {
        warn!("error closing expander after failed open: {:?}", e);
    }
}

impl<P, D> Board<P, D>
where
    P: PortExpander + Send + 'static,
    P::Error: fmt::Debug + Send + 'static,
    D: DelayNs + Send + 'static,
{
    /// Open the expander, configure its ports and initialise the LCD
    ///
    /// The display comes up cleared and dark and switch polling starts at
    /// `config.poll_interval_ms`. On failure the device handle is closed
    /// again.
    pub fn open<C>(connector: &mut C, config: BoardConfig, delay: D) -> Result<Self, Error<P::Error>>
    where
        C: ExpanderConnector<Device = P>,
        C::Error: Into<P::Error>,
    {
        config.validate()?;
        let hw_address = config.hw_address;

        info!(
            "opening expander on spi{}.{} at address {}",
            config.bus, config.chip_select, hw_address
        );
        let mut device = connector
            .open(config.bus, config.chip_select)
            .map_err(|e| Error::Open(e.into()))?;

        if let Err(e) = configure_ports(&mut device, hw_address) {
            if let Err(close) = device.close() {
                warn!("error closing expander after failed open: {:?}", close);
            }
            return Err(Error::Open(e));
        }

        let port = SharedExpander::new(device);
        let mut lcd = LcdDriver::new(port.clone(), delay, hw_address, config.timing);
        let session = match lcd.init().and_then(|()| DisplaySession::new(lcd)) {
            Ok(session) => session,
            Err(e) => {
                close_after_failure(&port);
                return Err(Error::Open(e));
            }
        };

        let dispatch = Arc::new(Mutex::new(()));
        let display = Display::new(session, port.clone());
        let input = InputPoller::new(port.clone(), hw_address, config.poll_interval_ms, dispatch);
        if let Err(e) = input.start() {
            close_after_failure(&port);
            return Err(e);
        }

        info!("board open");
        Ok(Self {
            port,
            hw_address,
            display,
            input,
            closed: false,
        })
    }

    /// Display handle
    pub fn display(&self) -> &Display<P, D> {
        &self.display
    }

    /// Switch panel handle
    pub fn input(&self) -> &InputPoller<P> {
        &self.input
    }

    /// Expander hardware address
    pub fn hw_address(&self) -> u8 {
        self.hw_address
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stop polling, cancel the auto-off timer and release the expander
    ///
    /// Every step is attempted; the first error is returned. A fault that
    /// ended the poll loop earlier is reported here too. Closing twice is
    /// a no-op.
    pub fn close(&mut self) -> Result<(), Error<P::Error>> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut result = self.input.stop();
        self.display.cancel_timeout();
        self.port.mark_closed();

        let released = release(&mut *self.port.lock(), self.hw_address).map_err(Error::Io);
        if result.is_ok() {
            result = released;
        }
        info!("board closed");
        result
    }
}

impl<P, D> Drop for Board<P, D>
where
    P: PortExpander + Send + 'static,
    P::Error: fmt::Debug + Send + 'static,
    D: DelayNs + Send + 'static,
{
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("error closing board on drop: {}", e);
        }
    }
}

impl<P> Board<P, SystemDelay>
where
    P: PortExpander + Send + 'static,
    P::Error: fmt::Debug + Send + 'static,
{
    /// Open with the OS delay
    pub fn open_system<C>(connector: &mut C, config: BoardConfig) -> Result<Self, Error<P::Error>>
    where
        C: ExpanderConnector<Device = P>,
        C::Error: Into<P::Error>,
    {
        Self::open(connector, config, SystemDelay {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockConnector, MockError, NoDelay};
    use picad_core::config::{ConfigError, LcdTiming};
    use picad_core::lcd::command::cmd;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn config() -> BoardConfig {
        BoardConfig {
            poll_interval_ms: 5,
            timing: LcdTiming::ZERO,
            ..BoardConfig::default()
        }
    }

    fn open(connector: &mut MockConnector) -> Board<crate::testing::MockExpander, NoDelay> {
        Board::open(connector, config(), NoDelay).unwrap()
    }

    #[test]
    fn test_open_configures_ports() {
        let mut connector = MockConnector::new();
        let board = open(&mut connector);

        assert_eq!(connector.opened, Some((0, 1)));
        assert_eq!(
            connector.device.config_writes(),
            vec![
                (Register::IoCon, 0x28),
                (Register::IoDirA, 0xFF),
                (Register::GpPuA, 0xFF),
                (Register::IoDirB, 0x00),
                (Register::GpIntEnA, 0xFF),
            ]
        );

        // Reset nibbles pair up as 0x33 0x32; the session reset leaves it dark
        let commands = connector.device.commands();
        assert_eq!(&commands[..3], &[0x33, 0x32, 0x28]);
        assert_eq!(commands.last(), Some(&cmd::DISPLAY_CONTROL));
        assert!(!connector.device.backlight());
        assert!(!board.display().power_state().display_on);
        assert!(board.input().is_monitoring());
        assert_eq!(board.input().poll_interval(), 5);
        assert_eq!(board.hw_address(), 0);
    }

    #[test]
    fn test_open_failure() {
        let mut connector = MockConnector::new();
        connector.fail = true;

        let result = Board::open(&mut connector, config(), NoDelay);
        assert!(matches!(result, Err(Error::Open(MockError))));
        assert!(connector.device.state().writes.is_empty());
    }

    #[test]
    fn test_port_setup_failure_closes_device() {
        let mut connector = MockConnector::new();
        {
            let mut state = connector.device.state();
            state.fail_writes_after = Some(2);
            state.fail_close = true;
        }

        // The close error is only logged; the setup error is reported
        let result = Board::open(&mut connector, config(), NoDelay);
        assert!(matches!(result, Err(Error::Open(MockError))));
        assert!(connector.device.state().closed);
        assert_eq!(connector.device.state().writes.len(), 2);
    }

    #[test]
    fn test_lcd_init_failure_closes_device() {
        let mut connector = MockConnector::new();
        {
            let mut state = connector.device.state();
            state.fail_writes_after = Some(5);
            state.fail_close = true;
        }

        let result = Board::open(&mut connector, config(), NoDelay);
        assert!(matches!(result, Err(Error::Open(MockError))));
        assert!(connector.device.state().closed);
        assert_eq!(connector.device.config_writes().len(), 5);
    }

    #[test]
    fn test_invalid_config_rejected_before_open() {
        let mut connector = MockConnector::new();
        let config = BoardConfig {
            hw_address: 8,
            ..config()
        };

        let result = Board::open(&mut connector, config, NoDelay);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidHwAddress(8)))
        ));
        assert_eq!(connector.opened, None);
    }

    #[test]
    fn test_close_releases_device() {
        let mut connector = MockConnector::new();
        let mut board = open(&mut connector);

        board.close().unwrap();
        assert!(board.is_closed());
        assert!(!board.input().is_monitoring());
        assert_eq!(connector.device.reg(Register::GpIntEnA), 0x00);
        assert!(connector.device.state().closed);

        assert!(matches!(board.display().write("x"), Err(Error::Closed)));
        assert!(matches!(board.input().start(), Err(Error::Closed)));
        assert!(board.close().is_ok());
    }

    #[test]
    fn test_close_reports_poll_fault() {
        let mut connector = MockConnector::new();
        let mut board = open(&mut connector);
        board
            .input()
            .register_single(4, || Err("broken".into()))
            .unwrap();

        connector.device.set_switches(0b1111_0111);
        thread::sleep(Duration::from_millis(80));

        assert!(matches!(board.close(), Err(Error::Handler(_))));
        assert!(connector.device.state().closed);
    }

    #[test]
    fn test_drop_closes() {
        let mut connector = MockConnector::new();
        let board = open(&mut connector);
        drop(board);

        assert!(connector.device.state().closed);
        assert_eq!(connector.device.reg(Register::GpIntEnA), 0x00);
    }

    #[test]
    fn test_handlers_fire_without_start() {
        let mut connector = MockConnector::new();
        let board = open(&mut connector);
        let presses = Arc::new(AtomicUsize::new(0));

        let display = board.display().clone();
        let count = Arc::clone(&presses);
        board
            .input()
            .register_single(1, move || {
                count.fetch_add(1, Ordering::SeqCst);
                display.write("pressed")?;
                Ok(())
            })
            .unwrap();

        connector.device.set_switches(254);
        thread::sleep(Duration::from_millis(80));

        assert_eq!(presses.load(Ordering::SeqCst), 1);
        assert!(board.display().power_state().display_on);
        assert!(connector.device.backlight());
    }

    #[test]
    fn test_open_with_system_delay() {
        let mut connector = MockConnector::new();
        let board = Board::open_system(&mut connector, config()).unwrap();

        assert_eq!(board.display().write("ok").unwrap(), 2);
    }
}
