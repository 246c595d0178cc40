//! Module loading seam
//!
//! Loading code modules (for `require:`, `exec:` and module documents in
//! [`Resolver::resolve_file`](crate::Resolver::resolve_file)) is supplied by
//! the caller through a [`ModuleLoader`]. The engine only consumes the
//! exported values.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::HandlerError;

/// Callable export of a module
pub type ExportFn = Arc<dyn Fn() -> Result<Value, HandlerError> + Send + Sync>;

/// Errors reported by module loaders
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot find module '{specifier}'")]
    NotFound { specifier: String },

    #[error("Module '{specifier}' does not export a value")]
    NotAValue { specifier: String },

    #[error("Module '{specifier}' has no export named '{name}'")]
    MissingExport { specifier: String, name: String },

    #[error("Export '{name}' of module '{specifier}' is not a function")]
    NotAFunction { specifier: String, name: String },
}

impl LoadError {
    pub fn not_found(specifier: impl Into<String>) -> Self {
        Self::NotFound {
            specifier: specifier.into(),
        }
    }
}

/// What a module exports
#[derive(Clone)]
pub enum Export {
    Value(Value),
    Function(ExportFn),
    Namespace(IndexMap<String, Export>),
}

impl Export {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    /// Look up a named member of a namespace export.
    pub fn get(&self, name: &str) -> Option<&Export> {
        match self {
            Self::Namespace(members) => members.get(name),
            _ => None,
        }
    }

    /// Convert the export into plain data.
    ///
    /// Function members of a namespace are skipped; a bare function has no
    /// data representation.
    pub fn into_value(self, specifier: &str) -> Result<Value, LoadError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Function(_) => Err(LoadError::NotAValue {
                specifier: specifier.to_string(),
            }),
            Self::Namespace(members) => {
                let mut map = Map::new();
                for (name, member) in members {
                    match member {
                        Self::Function(_) => continue,
                        other => {
                            map.insert(name, other.into_value(specifier)?);
                        }
                    }
                }
                Ok(Value::Object(map))
            }
        }
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Function(_) => f.write_str("Function"),
            Self::Namespace(members) => f.debug_map().entries(members.iter()).finish(),
        }
    }
}

/// Source of loadable modules
pub trait ModuleLoader: Send + Sync {
    /// Load a module by specifier, failing with [`LoadError::NotFound`] if absent.
    fn load(&self, specifier: &str) -> Result<Export, LoadError>;

    /// Whether `path` names a module this loader can load, rather than a
    /// structured-data document.
    fn is_module(&self, _path: &Path) -> bool {
        false
    }
}
