//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
    string::FromUtf8Error,
};

use crate::{diagnostic::Diagnostics, vm::RuntimeError};

pub type PascalResult<T> = std::result::Result<T, PascalError>;

#[derive(Debug)]
pub enum PascalError {
    /// Compilation reported one or more diagnostics.
    Compile(Diagnostics),
    /// VM error during interpreter loop.
    Runtime(RuntimeError),
    Io(io::Error),
    Utf8(FromUtf8Error),
    Fmt(fmt::Error),
    /// Configuration file could not be loaded.
    Conf(String),
}

impl Display for PascalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile(diagnostics) => {
                write!(f, "compilation failed with {} error(s)", diagnostics.len())
            }
            Self::Runtime(err) => write!(f, "runtime error: {}", err),
            Self::Io(err) => write!(f, "{}", err),
            Self::Utf8(err) => write!(f, "source is not valid UTF-8: {}", err),
            Self::Fmt(err) => write!(f, "{}", err),
            Self::Conf(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PascalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Runtime(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Utf8(err) => Some(err),
            Self::Fmt(err) => Some(err),
            Self::Compile(_) | Self::Conf(_) => None,
        }
    }
}

impl From<RuntimeError> for PascalError {
    fn from(err: RuntimeError) -> Self {
        PascalError::Runtime(err)
    }
}

impl From<io::Error> for PascalError {
    fn from(err: io::Error) -> Self {
        PascalError::Io(err)
    }
}

impl From<FromUtf8Error> for PascalError {
    fn from(err: FromUtf8Error) -> Self {
        PascalError::Utf8(err)
    }
}

impl From<fmt::Error> for PascalError {
    fn from(err: fmt::Error) -> Self {
        PascalError::Fmt(err)
    }
}
