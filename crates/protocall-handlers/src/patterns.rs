//! `glob:` protocol - expand file patterns

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use glob::Pattern;
use protocall_core::{ContinuationHandler, Handler, HandlerError, Value};

use crate::error::{Error, Result};
use crate::path::{PathHandler, normalize};

/// Expands glob patterns relative to a working directory into absolute paths
#[derive(Debug, Clone)]
pub struct GlobHandler {
    paths: PathHandler,
}

impl GlobHandler {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            paths: PathHandler::new(cwd),
        }
    }

    /// Expand one pattern into sorted, absolute matches.
    ///
    /// The working directory is matched literally, even when its name
    /// contains glob metacharacters.
    pub fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let absolute = self.anchor(pattern);
        let entries = glob::glob(&absolute).map_err(|e| Error::GlobPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let mut matches = entries.collect::<std::result::Result<Vec<_>, _>>()?;
        matches.sort();
        tracing::debug!(pattern, matches = matches.len(), "Expanded glob");
        Ok(matches)
    }

    /// Join a relative pattern onto the escaped working directory.
    ///
    /// Leading `..` segments climb out of the working directory before it
    /// is escaped.
    fn anchor(&self, pattern: &str) -> String {
        if Path::new(pattern).is_absolute() {
            return pattern.to_string();
        }

        let mut base = self.paths.base_dir().to_path_buf();
        let mut rest = PathBuf::new();
        for component in normalize(Path::new(pattern)).components() {
            match component {
                Component::ParentDir if rest.as_os_str().is_empty() => {
                    base.pop();
                }
                other => rest.push(other),
            }
        }

        let base = Pattern::escape(&base.to_string_lossy());
        if rest.as_os_str().is_empty() {
            base
        } else {
            format!("{base}/{}", rest.to_string_lossy())
        }
    }

    /// Expand a pattern or an array of patterns, keeping each path once.
    pub fn expand_value(&self, input: &Value) -> Result<Value> {
        let patterns: Vec<&str> = match input {
            Value::String(pattern) => vec![pattern.as_str()],
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().ok_or(Error::expected_string("glob")))
                .collect::<Result<_>>()?,
            _ => return Err(Error::expected_string("glob")),
        };

        let mut paths = Vec::new();
        for pattern in patterns {
            for path in self.expand(pattern)? {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        Ok(Value::Array(
            paths
                .into_iter()
                .map(|path| Value::String(path.to_string_lossy().into_owned()))
                .collect(),
        ))
    }

    pub fn into_handler(self) -> Handler {
        Handler::continuation(self)
    }
}

#[async_trait]
impl ContinuationHandler for GlobHandler {
    async fn call(&self, input: Value, _filename: Option<&Path>) -> std::result::Result<Value, HandlerError> {
        let handler = self.clone();
        let matches = tokio::task::spawn_blocking(move || handler.expand_value(&input)).await??;
        Ok(matches)
    }
}
