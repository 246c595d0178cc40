//! CLI configuration file (`protocall.toml`)
//!
//! ```toml
//! base_dir = "/srv/app"
//! glob = true
//! protocols = ["path", "env", "file"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::ResolverArgs;
use crate::error::{CliError, Result};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "protocall.toml";

/// Settings read from the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Base directory for relative paths
    pub base_dir: Option<PathBuf>,

    /// Register the glob: protocol
    pub glob: bool,

    /// Only keep these default protocols
    pub protocols: Option<Vec<String>>,
}

impl CliConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::user(format!("Invalid config: {e}")))
    }

    /// Load `explicit`, or the default file in `cwd` when it exists.
    ///
    /// A relative `base_dir` is taken relative to the config file.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = cwd.join(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        tracing::debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CliError::user(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let mut config = Self::parse(&content)?;
        if let Some(base_dir) = config.base_dir.take() {
            let dir = path.parent().unwrap_or(cwd);
            config.base_dir = Some(if base_dir.is_absolute() {
                base_dir
            } else {
                dir.join(base_dir)
            });
        }
        Ok(config)
    }

    /// Apply command-line flags, which take precedence over the file.
    pub fn merge_args(mut self, args: &ResolverArgs) -> Self {
        if let Some(base_dir) = &args.base_dir {
            self.base_dir = Some(base_dir.clone());
        }
        self.glob |= args.glob;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = CliConfig::parse(
            r#"
base_dir = "/srv"
glob = true
protocols = ["env", "path"]
"#,
        )
        .unwrap();

        assert_eq!(config.base_dir, Some(PathBuf::from("/srv")));
        assert!(config.glob);
        assert_eq!(
            config.protocols,
            Some(vec!["env".to_string(), "path".to_string()])
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(CliConfig::parse("colour = true").is_err());
    }

    #[test]
    fn test_missing_default_file_is_empty_config() {
        let temp = TempDir::new().unwrap();
        assert_eq!(CliConfig::load(None, temp.path()).unwrap(), CliConfig::default());
    }

    #[test]
    fn test_relative_base_dir_follows_config_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "base_dir = \"data\"").unwrap();

        let config = CliConfig::load(None, temp.path()).unwrap();
        assert_eq!(config.base_dir, Some(temp.path().join("data")));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(CliConfig::load(Some(&missing), temp.path()).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let config = CliConfig {
            base_dir: Some(PathBuf::from("/from-file")),
            glob: false,
            protocols: None,
        };
        let args = ResolverArgs {
            base_dir: Some(PathBuf::from("/from-flag")),
            config: None,
            glob: true,
        };

        let merged = config.merge_args(&args);
        assert_eq!(merged.base_dir, Some(PathBuf::from("/from-flag")));
        assert!(merged.glob);
    }
}
