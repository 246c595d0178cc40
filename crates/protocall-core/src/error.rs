//! Error types for protocall-core

use std::path::PathBuf;

use crate::module::LoadError;

/// Result type for protocall-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by a handler.
///
/// Handlers may fail with any error type. The resolver hands it back to
/// the caller unchanged inside [`Error::Handler`].
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while registering handlers or resolving data
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid protocol name '{protocol}': {reason}")]
    InvalidProtocol { protocol: String, reason: String },

    #[error("No handlers registered for protocol '{protocol}'")]
    EmptyChain { protocol: String },

    #[error(transparent)]
    Handler(HandlerError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} document at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl Error {
    pub fn invalid_protocol(protocol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProtocol {
            protocol: protocol.into(),
            reason: reason.into(),
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Returns the handler's own error when resolution failed inside a handler.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
