//! `require:` and `exec:` protocols - values and functions from modules

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use protocall_core::{Export, Handler, ModuleLoader, Value};
use regex::Regex;

use crate::error::{Error, Result};
use crate::path::PathHandler;

/// Specifiers naming a file rather than a package: `/x`, `./x`, `../x`
static FILE_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.{0,2}/").expect("static regex is valid")
});

/// Loads a module and yields its exported data
#[derive(Clone)]
pub struct RequireHandler {
    paths: PathHandler,
    modules: Arc<dyn ModuleLoader>,
}

impl RequireHandler {
    pub fn new(base_dir: impl Into<PathBuf>, modules: Arc<dyn ModuleLoader>) -> Self {
        Self {
            paths: PathHandler::new(base_dir),
            modules,
        }
    }

    /// Turn a specifier into the key handed to the loader.
    ///
    /// File specifiers are resolved against the base directory; package
    /// names are passed through.
    pub fn specifier(&self, input: &str) -> String {
        if FILE_SPECIFIER.is_match(input) {
            self.paths.resolve(input).to_string_lossy().into_owned()
        } else {
            input.to_string()
        }
    }

    pub fn load(&self, input: &str) -> Result<Export> {
        let specifier = self.specifier(input);
        tracing::debug!(%specifier, "Loading module");
        Ok(self.modules.load(&specifier)?)
    }

    pub fn require(&self, input: &str) -> Result<Value> {
        let specifier = self.specifier(input);
        Ok(self.load(input)?.into_value(&specifier)?)
    }

    pub fn into_handler(self) -> Handler {
        Handler::transform(move |input: Value| {
            let input = input.as_str().ok_or(Error::expected_string("require"))?;
            Ok(self.require(input)?)
        })
    }
}

/// Calls a function exported by a module.
///
/// The input is `module#export`, or just `module` when the module itself
/// is the function.
#[derive(Clone)]
pub struct ExecHandler {
    require: RequireHandler,
}

impl ExecHandler {
    pub fn new(base_dir: impl Into<PathBuf>, modules: Arc<dyn ModuleLoader>) -> Self {
        Self {
            require: RequireHandler::new(base_dir, modules),
        }
    }

    pub fn exec(&self, input: &str) -> std::result::Result<Value, protocall_core::HandlerError> {
        let (module, export) = match input.split_once('#') {
            Some((module, export)) => (module, Some(export)),
            None => (input, None),
        };

        let loaded = self.require.load(module)?;
        let target = match export {
            Some(name) => loaded.get(name),
            None => Some(&loaded),
        };
        match target {
            Some(Export::Function(f)) => f(),
            _ => Err(Error::ExecTarget {
                value: input.to_string(),
            }
            .into()),
        }
    }

    pub fn into_handler(self) -> Handler {
        Handler::transform(move |input: Value| {
            let input = input.as_str().ok_or(Error::expected_string("exec"))?;
            self.exec(input)
        })
    }
}
