//! Command implementations for protocall-cli

pub mod protocols;
pub mod resolve;

use std::path::Path;

use protocall_core::{HandlerMap, Resolver};
use protocall_handlers::DefaultHandlers;

use crate::cli::ResolverArgs;
use crate::config::CliConfig;
use crate::error::{CliError, Result};

pub use protocols::run_protocols;
pub use resolve::run_resolve;

/// Build the default resolver for a command.
///
/// The base directory comes from the flags, then the config file, then
/// `fallback_dir`.
pub fn build_resolver(args: &ResolverArgs, cwd: &Path, fallback_dir: &Path) -> Result<Resolver<'static>> {
    let config = CliConfig::load(args.config.as_deref(), cwd)?.merge_args(args);
    let base_dir = config
        .base_dir
        .clone()
        .unwrap_or_else(|| fallback_dir.to_path_buf());

    let defaults = DefaultHandlers::new(base_dir).with_glob(config.glob);
    let mut handlers = defaults.handler_map();
    if let Some(allowed) = &config.protocols {
        handlers = select_protocols(handlers, allowed)?;
    }
    tracing::debug!(
        base_dir = %defaults.base_dir().display(),
        protocols = ?handlers.keys().collect::<Vec<_>>(),
        "Building resolver"
    );

    Ok(Resolver::new().with_handlers(handlers)?)
}

/// Keep only the `allowed` protocols, in the order they were registered.
fn select_protocols(mut handlers: HandlerMap, allowed: &[String]) -> Result<HandlerMap> {
    if let Some(unknown) = allowed.iter().find(|name| !handlers.contains_key(name.as_str())) {
        return Err(CliError::user(format!("Unknown protocol in config: {unknown}")));
    }
    handlers.retain(|name, _| allowed.contains(name));
    Ok(handlers)
}
