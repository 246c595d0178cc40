//! `file:` protocol - read file contents

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use protocall_core::{ContinuationHandler, Handler, HandlerError, Value};

use crate::error::Error;
use crate::path::PathHandler;

/// How file contents are turned into a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileEncoding {
    /// Contents as a string; invalid UTF-8 is an error
    #[default]
    Utf8,
    /// Contents as an array of byte values
    Binary,
}

/// Reads the file named by its input, resolved like `path:`
///
/// Contents decode as UTF-8 text by default, so configuration files come
/// back as strings. Use [`FileEncoding::Binary`] to get the raw bytes as an
/// array of numbers instead.
#[derive(Debug, Clone)]
pub struct FileHandler {
    paths: PathHandler,
    encoding: FileEncoding,
}

impl FileHandler {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            paths: PathHandler::new(base_dir),
            encoding: FileEncoding::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: FileEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn into_handler(self) -> Handler {
        Handler::continuation(self)
    }
}

#[async_trait]
impl ContinuationHandler for FileHandler {
    async fn call(&self, input: Value, _filename: Option<&Path>) -> Result<Value, HandlerError> {
        let input = input.as_str().ok_or(Error::expected_string("file"))?;
        let path = self.paths.resolve(input);
        tracing::debug!(path = %path.display(), "Reading file");

        let bytes = tokio::fs::read(&path).await.map_err(|e| Error::io(&path, e))?;
        match self.encoding {
            FileEncoding::Utf8 => {
                let text = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { path })?;
                Ok(Value::String(text))
            }
            FileEncoding::Binary => Ok(bytes_to_value(bytes)),
        }
    }
}

/// Represent raw bytes as an array of numbers
pub(crate) fn bytes_to_value(bytes: Vec<u8>) -> Value {
    Value::Array(bytes.into_iter().map(Value::from).collect())
}
