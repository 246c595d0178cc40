//! In-memory module registry

use std::path::Path;

use indexmap::IndexMap;
use parking_lot::RwLock;
use protocall_core::{Export, LoadError, ModuleLoader, Value};

/// Modules registered by specifier.
///
/// Specifiers are matched exactly, so a module required through a
/// relative path must be registered under the absolute path the
/// `require:` handler resolves it to.
///
/// # Example
///
/// ```
/// use protocall_core::{Export, ModuleLoader};
/// use protocall_handlers::ModuleRegistry;
/// use serde_json::json;
///
/// let modules = ModuleRegistry::new();
/// modules.insert_value("defaults", json!({"port": 8080}));
/// assert!(modules.contains("defaults"));
/// assert!(modules.load("other").is_err());
/// ```
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<IndexMap<String, Export>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a module.
    pub fn insert(&self, specifier: impl Into<String>, export: Export) {
        let specifier = specifier.into();
        tracing::debug!(%specifier, "Registered module");
        self.modules.write().insert(specifier, export);
    }

    pub fn insert_value(&self, specifier: impl Into<String>, value: Value) {
        self.insert(specifier, Export::Value(value));
    }

    pub fn remove(&self, specifier: &str) -> Option<Export> {
        self.modules.write().shift_remove(specifier)
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.modules.read().contains_key(specifier)
    }

    pub fn specifiers(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load(&self, specifier: &str) -> Result<Export, LoadError> {
        self.modules
            .read()
            .get(specifier)
            .cloned()
            .ok_or_else(|| LoadError::not_found(specifier))
    }

    fn is_module(&self, path: &Path) -> bool {
        self.contains(&path.to_string_lossy())
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("specifiers", &self.specifiers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_registered_module() {
        let modules = ModuleRegistry::new();
        modules.insert_value("/app/defaults", json!({"retries": 3}));

        let export = modules.load("/app/defaults").unwrap();
        assert_eq!(export.into_value("/app/defaults").unwrap(), json!({"retries": 3}));
        assert!(modules.is_module(Path::new("/app/defaults")));
        assert!(!modules.is_module(Path::new("/app/other")));
    }

    #[test]
    fn test_missing_module_is_not_found() {
        let modules = ModuleRegistry::new();
        assert_eq!(
            modules.load("nope").unwrap_err(),
            LoadError::not_found("nope")
        );
    }

    #[test]
    fn test_remove_and_replace() {
        let modules = ModuleRegistry::new();
        modules.insert_value("a", json!(1));
        modules.insert_value("a", json!(2));
        assert_eq!(modules.specifiers(), vec!["a"]);
        assert!(modules.remove("a").is_some());
        assert!(!modules.contains("a"));
    }
}
