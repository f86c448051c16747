use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;

/// An engine-agnostic representation of JavaScript values.
/// Only the shapes the LESS environment actually exchanges with the guest are modelled.
#[derive(Clone, Debug, PartialEq)]
pub enum JSValue {
    /// The `undefined` value.
    Undefined,
    /// The `null` value.
    Null,
    /// A boolean primitive.
    Boolean(bool),
    /// A number (IEEE 754 double precision).
    Number(f64),
    /// A string value (UTF-8).
    String(String),
    /// A dense array of values.
    Array(Vec<JSValue>),
}

impl JSValue {
    /// Borrow the string payload, if this is a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Build a string value, or `null` when absent.
    #[inline]
    pub fn string_or_null(value: Option<&str>) -> Self {
        value.map_or(Self::Null, |text| Self::String(text.to_owned()))
    }
}

impl From<&str> for JSValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for JSValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for JSValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Error type used by host callbacks.
#[derive(Debug)]
pub enum JSError {
    /// A type error (for example, wrong argument types).
    TypeError(String),
    /// A host I/O failure (file writes, file and URL reads).
    Io(io::Error),
    /// An internal error not exposed to user code in detail.
    InternalError(String),
}

impl Display for JSError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JSError::TypeError(message) => write!(f, "TypeError: {}", message),
            JSError::Io(error) => write!(f, "IOError: {}", error),
            JSError::InternalError(message) => write!(f, "InternalError: {}", message),
        }
    }
}

impl Error for JSError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            JSError::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for JSError {
    fn from(error: io::Error) -> Self {
        JSError::Io(error)
    }
}

/// Log severity levels understood by the host logger.
#[derive(Copy, Clone, Debug)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}
