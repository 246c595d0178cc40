//! Default protocol handlers for protocall
//!
//! | Protocol | Handler | Resolves to |
//! |----------|---------|-------------|
//! | `path:` | [`PathHandler`] | absolute path string |
//! | `file:` | [`FileHandler`] | file contents |
//! | `base64:` | [`Base64Handler`] | decoded text or bytes |
//! | `env:` | [`EnvHandler`] | environment variable |
//! | `require:` | [`RequireHandler`] | data exported by a module |
//! | `exec:` | [`ExecHandler`] | result of an exported function |
//! | `glob:` | [`GlobHandler`] | matching paths (opt-in) |

pub mod decode;
pub mod env;
pub mod error;
pub mod file;
pub mod modules;
pub mod path;
pub mod patterns;
pub mod require;

use std::path::PathBuf;
use std::sync::Arc;

use protocall_core::{HandlerMap, HandlerSet, ModuleLoader, Resolver};

pub use decode::Base64Handler;
pub use env::{EnvHandler, EnvSource};
pub use error::{Error, Result};
pub use file::{FileEncoding, FileHandler};
pub use modules::ModuleRegistry;
pub use path::PathHandler;
pub use patterns::GlobHandler;
pub use require::{ExecHandler, RequireHandler};

/// Builder for a resolver preloaded with the default handlers.
///
/// # Example
///
/// ```
/// use protocall_handlers::{DefaultHandlers, EnvSource};
///
/// let resolver = DefaultHandlers::new("/srv")
///     .with_env(EnvSource::from_iter([("API_TOKEN", "xyz")]))
///     .build(None)
///     .unwrap();
/// assert!(resolver.supported_protocols().contains(&"env".to_string()));
/// ```
#[derive(Clone)]
pub struct DefaultHandlers {
    base_dir: PathBuf,
    modules: Arc<dyn ModuleLoader>,
    env: EnvSource,
    file_encoding: FileEncoding,
    glob: bool,
}

impl DefaultHandlers {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            modules: Arc::new(ModuleRegistry::new()),
            env: EnvSource::default(),
            file_encoding: FileEncoding::default(),
            glob: false,
        }
    }

    /// Use the process working directory as the base directory
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        Ok(Self::new(cwd))
    }

    /// Loader for `require:`, `exec:` and module paths in `resolve_file`
    pub fn with_modules(mut self, modules: Arc<dyn ModuleLoader>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    pub fn with_file_encoding(mut self, encoding: FileEncoding) -> Self {
        self.file_encoding = encoding;
        self
    }

    /// Also register `glob:`
    pub fn with_glob(mut self, enabled: bool) -> Self {
        self.glob = enabled;
        self
    }

    pub fn base_dir(&self) -> &std::path::Path {
        &self.base_dir
    }

    /// The handlers keyed by protocol name
    pub fn handler_map(&self) -> HandlerMap {
        let base = &self.base_dir;
        let mut map = HandlerMap::new();
        map.insert("path".into(), HandlerSet::from(PathHandler::new(base).into_handler()));
        map.insert(
            "file".into(),
            HandlerSet::from(
                FileHandler::new(base)
                    .with_encoding(self.file_encoding)
                    .into_handler(),
            ),
        );
        map.insert("base64".into(), HandlerSet::from(Base64Handler::new().into_handler()));
        map.insert(
            "env".into(),
            HandlerSet::from(EnvHandler::with_source(self.env.clone()).into_handler()),
        );
        map.insert(
            "require".into(),
            HandlerSet::from(RequireHandler::new(base, Arc::clone(&self.modules)).into_handler()),
        );
        map.insert(
            "exec".into(),
            HandlerSet::from(ExecHandler::new(base, Arc::clone(&self.modules)).into_handler()),
        );
        if self.glob {
            map.insert("glob".into(), HandlerSet::from(GlobHandler::new(base).into_handler()));
        }
        map
    }

    /// Build a resolver holding the default handlers, optionally inheriting
    /// from `parent`.
    pub fn build<'p>(&self, parent: Option<&'p Resolver<'p>>) -> protocall_core::Result<Resolver<'p>> {
        let resolver = match parent {
            Some(parent) => Resolver::child_of(parent),
            None => Resolver::new(),
        };
        resolver
            .with_module_loader(Arc::clone(&self.modules))
            .with_handlers(self.handler_map())
    }
}

/// Resolver with the default handlers rooted at `base_dir`.
pub fn default_resolver<'p>(
    base_dir: impl Into<PathBuf>,
    parent: Option<&'p Resolver<'p>>,
) -> protocall_core::Result<Resolver<'p>> {
    DefaultHandlers::new(base_dir).build(parent)
}
