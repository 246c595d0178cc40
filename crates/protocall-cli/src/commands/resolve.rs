//! Resolve command implementation

use std::path::Path;

use protocall_core::Value;

use crate::cli::{OutputFormat, ResolverArgs};
use crate::error::{CliError, Result};

use super::build_resolver;

/// Run the resolve command
pub async fn run_resolve(
    cwd: &Path,
    file: &Path,
    format: OutputFormat,
    args: &ResolverArgs,
) -> Result<()> {
    let value = resolve_document(cwd, file, args).await?;
    println!("{}", render(&value, format)?);
    Ok(())
}

/// Resolve `file`, by default relative to the document's own directory.
pub async fn resolve_document(cwd: &Path, file: &Path, args: &ResolverArgs) -> Result<Value> {
    let file = cwd.join(file);
    let document_dir = file.parent().unwrap_or(cwd);
    let resolver = build_resolver(args, cwd, document_dir)?;

    tracing::info!(file = %file.display(), "Resolving document");
    Ok(resolver.resolve_file(&file).await?)
}

/// Serialise a resolved value for printing
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::Render(e.to_string()))
        }
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|e| CliError::Render(e.to_string())),
    }
}
