//! Switch panel poller
//!
//! A background thread samples port A every interval and dispatches the
//! handler registered for the new register value whenever it changes.
//! Handlers run on the poller thread, one at a time, under the board's
//! dispatch lock.
//!
//! A handler that returns an error, or a failed switch read, ends the loop.
//! The error is logged and handed back by the next [`InputPoller::stop`] or
//! [`InputPoller::take_fault`].

use std::fmt;
use std::any::Any;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use log::{debug, error, info, warn};
use picad_core::config::ConfigError;
use picad_core::input::{
    pressed_buttons, ButtonAddress, ButtonMap, IntervalChange, PollState, PollerEvent,
    RegistrationError, BUTTON_COUNT,
};
use picad_hal::{Port, PortExpander};

use crate::error::{Error, HandlerError, HandlerResult};
use crate::shared::SharedExpander;
use crate::timer::Periodic;

/// Upper bound on registered handlers
pub const MAX_HANDLERS: usize = 32;

/// Boxed button handler
pub type Handler = Box<dyn FnMut() -> HandlerResult + Send>;

type SharedHandler = Arc<Mutex<Handler>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Turn a caught handler panic into a handler error
fn panic_error(payload: Box<dyn Any + Send>) -> HandlerError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
    format!("handler panicked: {}", message).into()
}

struct Inner<P: PortExpander> {
    port: SharedExpander<P>,
    hw_address: u8,
    handlers: Mutex<ButtonMap<SharedHandler, MAX_HANDLERS>>,
    poll: Mutex<PollState>,
    dispatch: Arc<Mutex<()>>,
    fault: Mutex<Option<Error<P::Error>>>,
    timer: Mutex<Option<Periodic>>,
}

impl<P> Inner<P>
where
    P: PortExpander,
    P::Error: fmt::Debug,
{
    /// One sample of the switch register
    fn tick(&self) -> ControlFlow<()> {
        let sample = match self
            .port
            .lock()
            .read_register(Port::A.gpio(), self.hw_address)
        {
            Ok(sample) => sample,
            Err(e) => {
                error!("switch read failed, stopping poller: {:?}", e);
                return self.fail(Error::Io(e));
            }
        };

        let Some(state) = lock(&self.poll).debouncer.observe(sample) else {
            return ControlFlow::Continue(());
        };

        // Clone the handler out so the map stays free for registration
        let handler = lock(&self.handlers).get_mut(state).map(|h| Arc::clone(h));
        let Some(handler) = handler else {
            debug!("switch state {:#04x}, no handler", state);
            return ControlFlow::Continue(());
        };

        debug!("switch state {:#04x}, dispatching", state);
        let result = {
            let _dispatch = lock(&self.dispatch);
            let mut handler = lock(&handler);
            panic::catch_unwind(AssertUnwindSafe(|| (*handler)()))
                .unwrap_or_else(|payload| Err(panic_error(payload)))
        };

        match result {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                error!("handler for {:#04x} failed, stopping poller: {}", state, e);
                self.fail(Error::Handler(e))
            }
        }
    }

    fn fail(&self, err: Error<P::Error>) -> ControlFlow<()> {
        lock(&self.poll).apply(PollerEvent::Fault);
        *lock(&self.fault) = Some(err);
        ControlFlow::Break(())
    }
}

/// Switch panel poller
///
/// Cheap to clone; clones drive the same poller, so a handler can hold one
/// to stop polling or change the interval from inside the loop.
pub struct InputPoller<P: PortExpander> {
    inner: Arc<Inner<P>>,
}

impl<P: PortExpander> Clone for InputPoller<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> InputPoller<P>
where
    P: PortExpander + Send + 'static,
    P::Error: fmt::Debug + Send + 'static,
{
    /// Create an idle poller
    pub fn new(
        port: SharedExpander<P>,
        hw_address: u8,
        interval_ms: u32,
        dispatch: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                port,
                hw_address,
                handlers: Mutex::new(ButtonMap::new()),
                poll: Mutex::new(PollState::new(interval_ms)),
                dispatch,
                fault: Mutex::new(None),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Register a handler for one button (1-8)
    ///
    /// Returns `Ok(false)` if the button already had a handler; the first
    /// registration is kept.
    pub fn register_single<F>(&self, button: u8, handler: F) -> Result<bool, Error<P::Error>>
    where
        F: FnMut() -> HandlerResult + Send + 'static,
    {
        self.register(ButtonAddress::single(button)?, Box::new(handler))
    }

    /// Register a handler for a button combination
    ///
    /// See [`ButtonAddress::combo`] for how the indices map to an address.
    pub fn register_combo<F>(&self, buttons: &[u8], handler: F) -> Result<bool, Error<P::Error>>
    where
        F: FnMut() -> HandlerResult + Send + 'static,
    {
        self.register(ButtonAddress::combo(buttons)?, Box::new(handler))
    }

    fn register(&self, address: ButtonAddress, handler: Handler) -> Result<bool, Error<P::Error>> {
        let stored = lock(&self.inner.handlers).register(address, Arc::new(Mutex::new(handler)))?;
        if stored {
            debug!("registered handler for {:#04x}", address.value());
        } else {
            warn!(
                "handler for {:#04x} already registered, keeping the first",
                address.value()
            );
        }
        Ok(stored)
    }

    /// Start sampling (no-op if already running)
    pub fn start(&self) -> Result<(), Error<P::Error>> {
        if self.inner.port.is_closed() {
            return Err(Error::Closed);
        }

        let mut slot = lock(&self.inner.timer);
        // A faulted loop is already Idle even if its thread has not exited yet
        let polling = lock(&self.inner.poll).state.is_polling();
        if polling && slot.as_ref().is_some_and(Periodic::is_running) {
            return Ok(());
        }
        if let Some(mut old) = slot.take() {
            old.cancel();
        }

        let interval_ms = {
            let mut poll = lock(&self.inner.poll);
            poll.apply(PollerEvent::Start);
            poll.interval_ms
        };

        let weak: Weak<Inner<P>> = Arc::downgrade(&self.inner);
        let spawned = Periodic::spawn(
            "picad-poll",
            Duration::from_millis(u64::from(interval_ms)),
            move || match weak.upgrade() {
                Some(inner) => inner.tick(),
                None => ControlFlow::Break(()),
            },
        );

        match spawned {
            Ok(timer) => {
                *slot = Some(timer);
                info!("switch polling started every {} ms", interval_ms);
                Ok(())
            }
            Err(e) => {
                lock(&self.inner.poll).apply(PollerEvent::Stop);
                Err(Error::Spawn(e))
            }
        }
    }

    /// Stop sampling
    ///
    /// Waits for the loop to finish unless called from a handler. Returns
    /// the error that ended the loop, if one did.
    pub fn stop(&self) -> Result<(), Error<P::Error>> {
        self.halt();
        match self.take_fault() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn halt(&self) {
        let timer = lock(&self.inner.timer).take();
        if let Some(mut timer) = timer {
            timer.cancel();
            info!("switch polling stopped");
        }
        lock(&self.inner.poll).apply(PollerEvent::Stop);
    }

    /// Error that ended the poll loop, if any
    pub fn take_fault(&self) -> Option<Error<P::Error>> {
        lock(&self.inner.fault).take()
    }

    /// Check whether the poll loop is running
    pub fn is_monitoring(&self) -> bool {
        lock(&self.inner.poll).state.is_polling()
    }

    /// Change the sampling interval
    ///
    /// A running loop is stopped and restarted with the new interval.
    pub fn set_poll_interval(&self, interval_ms: u32) -> Result<(), Error<P::Error>> {
        if interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval.into());
        }

        let change = lock(&self.inner.poll).set_interval(interval_ms);
        if change == IntervalChange::Restart {
            debug!("restarting switch polling at {} ms", interval_ms);
            self.halt();
            self.start()?;
        }
        Ok(())
    }

    /// Current sampling interval in ms
    pub fn poll_interval(&self) -> u32 {
        lock(&self.inner.poll).interval_ms
    }

    /// Read the raw switch register (255 when nothing is pressed)
    pub fn read_switches(&self) -> Result<u8, Error<P::Error>> {
        if self.inner.port.is_closed() {
            return Err(Error::Closed);
        }
        self.inner
            .port
            .lock()
            .read_register(Port::A.gpio(), self.inner.hw_address)
            .map_err(Error::Io)
    }

    /// Buttons (1-8) currently held down
    pub fn pressed(&self) -> Result<Vec<u8>, Error<P::Error>> {
        Ok(pressed_buttons(self.read_switches()?).collect())
    }

    /// Check whether one button (1-8) is held down
    pub fn read_switch(&self, button: u8) -> Result<bool, Error<P::Error>> {
        if !(1..=BUTTON_COUNT).contains(&button) {
            return Err(RegistrationError::InvalidButton(button).into());
        }
        if self.inner.port.is_closed() {
            return Err(Error::Closed);
        }
        let high = self
            .inner
            .port
            .lock()
            .read_bit(button - 1, Port::A.gpio(), self.inner.hw_address)
            .map_err(Error::Io)?;
        Ok(!high)
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        lock(&self.inner.handlers).len()
    }
}
