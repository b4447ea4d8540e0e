//! Thread-backed timers
//!
//! [`Periodic`] drives the switch poller, [`OneShot`] the display auto-off.
//! Both wait on a condition variable so cancellation wakes them at once.
//! Cancelling joins the timer thread, except from the timer thread itself
//! (a callback stopping its own timer), where the loop is only signalled.

use std::io;
use std::ops::ControlFlow;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Cancellation flag a timer thread can sleep on
#[derive(Default)]
struct Signal {
    raised: Mutex<bool>,
    wake: Condvar,
}

impl Signal {
    fn raise(&self) {
        *self.raised.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }

    fn is_raised(&self) -> bool {
        *self.raised.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep until `deadline`; returns true if raised before then
    fn wait_until(&self, deadline: Instant) -> bool {
        let mut raised = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *raised {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            raised = self
                .wake
                .wait_timeout(raised, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// Raise the signal and wait for the thread, unless we are that thread
fn halt(signal: &Signal, handle: Option<JoinHandle<()>>) {
    signal.raise();
    if let Some(handle) = handle {
        if handle.thread().id() == thread::current().id() {
            // Detached; the loop sees the signal once the callback returns
            return;
        }
        if handle.join().is_err() {
            warn!("timer thread panicked");
        }
    }
}

/// Fixed-rate repeating timer
///
/// Ticks that fall due while the previous one is still running are
/// dropped, not queued.
pub struct Periodic {
    signal: Arc<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl Periodic {
    /// Start ticking; the first tick comes one interval from now
    ///
    /// The loop ends when `tick` returns `Break` or the timer is cancelled.
    pub fn spawn<F>(name: &str, interval: Duration, mut tick: F) -> io::Result<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let signal = Arc::new(Signal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                let mut next = Instant::now() + interval;
                while !thread_signal.wait_until(next) {
                    if tick().is_break() {
                        break;
                    }
                    next += interval;
                    let now = Instant::now();
                    if next <= now {
                        let missed = (now - next).as_nanos() / interval.as_nanos().max(1) + 1;
                        debug!("{} overran, dropping {} tick(s)", name_of_current(), missed);
                        next = now + interval;
                    }
                }
            })?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    /// Stop ticking
    pub fn cancel(&mut self) {
        halt(&self.signal, self.handle.take());
    }

    /// Check whether the loop is still alive
    pub fn is_running(&self) -> bool {
        !self.signal.is_raised()
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Periodic {
    fn drop(&mut self) {
        self.signal.raise();
    }
}

/// Single-shot timer
pub struct OneShot {
    signal: Arc<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl OneShot {
    /// Run `callback` once after `delay` unless cancelled first
    pub fn spawn<F>(name: &str, delay: Duration, callback: F) -> io::Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let signal = Arc::new(Signal::default());
        let thread_signal = Arc::clone(&signal);
        let deadline = Instant::now() + delay;

        let handle = thread::Builder::new().name(name.into()).spawn(move || {
            if !thread_signal.wait_until(deadline) {
                callback();
            }
        })?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    /// Cancel the timer
    ///
    /// If the callback is already running this waits for it to finish.
    pub fn cancel(&mut self) {
        halt(&self.signal, self.handle.take());
    }

    /// Check whether the callback is still to come
    pub fn is_pending(&self) -> bool {
        !self.signal.is_raised()
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for OneShot {
    fn drop(&mut self) {
        self.signal.raise();
    }
}

fn name_of_current() -> String {
    thread::current().name().unwrap_or("timer").to_owned()
}
