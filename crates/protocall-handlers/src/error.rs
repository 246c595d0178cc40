//! Error types for protocall-handlers

use std::path::PathBuf;

use protocall_core::LoadError;

/// Result type for handler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the default handlers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{protocol}: expected {expected} input")]
    InvalidInput {
        protocol: &'static str,
        expected: &'static str,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File at {path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    #[error("Invalid base64 input: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    GlobPattern { pattern: String, message: String },

    #[error("Failed to read glob match: {0}")]
    GlobMatch(#[from] glob::GlobError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("exec: unable to locate function in {value}")]
    ExecTarget { value: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn expected_string(protocol: &'static str) -> Self {
        Self::InvalidInput {
            protocol,
            expected: "string",
        }
    }
}
