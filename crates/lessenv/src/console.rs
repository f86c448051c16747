//! Log-backed console for output produced by the guest compiler.
//!
//! Everything the guest prints, and every guest exception the engine reports,
//! is routed through here to the `log` crate.

use crate::bindings::{HostLogger, LogLevel};
use log::{debug, error, info, trace, warn};

/// Console provides helper functions to print messages emitted by the guest
/// script and the engine itself, keeping output routing in one place.
pub struct Console;

impl Console {
    /// Print an informational line.
    #[inline]
    pub fn info<M: AsRef<str>>(message: M) {
        info!("[less]: {}", message.as_ref());
    }

    /// Print a warning line.
    #[inline]
    pub fn warn<M: AsRef<str>>(message: M) {
        warn!("[less]: {}", message.as_ref());
    }

    /// Print an error line.
    #[inline]
    pub fn error<M: AsRef<str>>(message: M) {
        error!("[less]: {}", message.as_ref());
    }

    /// Print an exception with optional stack trace.
    #[inline]
    pub fn exception<M: AsRef<str>>(message: M, stack: Option<&str>) {
        match stack {
            Some(stack_trace) if !stack_trace.is_empty() => {
                error!("[less]: {}\n{}", message.as_ref(), stack_trace);
            }
            _ => {
                error!("[less]: {}", message.as_ref());
            }
        }
    }
}

/// A `HostLogger` implementation that routes to the `Console` helpers.
pub struct ConsoleLogger;

impl HostLogger for ConsoleLogger {
    #[inline]
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => trace!("[less]: {message}"),
            LogLevel::Debug => debug!("[less]: {message}"),
            LogLevel::Info => Console::info(message),
            LogLevel::Warn => Console::warn(message),
            LogLevel::Error => Console::error(message),
        }
    }
}
