//! Runtime error type

use std::fmt;
use std::io;

use picad_core::config::ConfigError;
use picad_core::input::RegistrationError;

/// Error a button handler can return
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result a button handler returns
pub type HandlerResult = Result<(), HandlerError>;

/// Board errors
///
/// `E` is the expander driver's error type.
#[derive(Debug)]
pub enum Error<E> {
    /// Opening or configuring the expander failed
    Open(E),
    /// Register access failed
    Io(E),
    /// A button handler failed and the poll loop ended
    Handler(HandlerError),
    /// Handler registration rejected
    Registration(RegistrationError),
    /// Invalid configuration
    Config(ConfigError),
    /// Timer thread could not be started
    Spawn(io::Error),
    /// Board already closed
    Closed,
}

impl<E> From<RegistrationError> for Error<E> {
    fn from(e: RegistrationError) -> Self {
        Error::Registration(e)
    }
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Open(e) => write!(f, "failed to open port expander: {:?}", e),
            Error::Io(e) => write!(f, "port expander access failed: {:?}", e),
            Error::Handler(e) => write!(f, "button handler failed: {}", e),
            Error::Registration(e) => write!(f, "handler registration rejected: {:?}", e),
            Error::Config(e) => write!(f, "invalid configuration: {:?}", e),
            Error::Spawn(e) => write!(f, "failed to start timer thread: {}", e),
            Error::Closed => write!(f, "board is closed"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Handler(e) => Some(e.as_ref()),
            Error::Spawn(e) => Some(e),
            _ => None,
        }
    }
}
