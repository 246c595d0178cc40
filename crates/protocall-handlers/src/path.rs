//! `path:` protocol - resolve paths against a base directory

use std::path::{Component, Path, PathBuf};

use protocall_core::{Handler, Value};

use crate::error::{Error, Result};

/// Resolves relative paths against a base directory.
///
/// Absolute inputs are returned unchanged. Relative inputs use `/` as the
/// separator and are folded lexically, so `../` segments may climb above
/// the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHandler {
    base_dir: PathBuf,
}

impl PathHandler {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: normalize(&base_dir.into()),
        }
    }

    /// Resolve against the process working directory
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        Ok(Self::new(cwd))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `input` to a path.
    pub fn resolve(&self, input: &str) -> PathBuf {
        let path = Path::new(input);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let mut joined = self.base_dir.clone();
        joined.extend(input.split('/').filter(|segment| !segment.is_empty()));
        normalize(&joined)
    }

    pub fn into_handler(self) -> Handler {
        Handler::transform(move |input: Value| {
            let input = input.as_str().ok_or(Error::expected_string("path"))?;
            Ok(Value::String(self.resolve(input).to_string_lossy().into_owned()))
        })
    }
}

/// Fold `.` and `..` components without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
