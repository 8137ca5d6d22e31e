//! Configuration management for appmenu.
//!
//! This module defines the structure of the optional `appmenu.toml` file and
//! provides functionality to load and parse it. Every key is optional; missing keys
//! fall back to command-line flags or built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Top-level configuration structure corresponding to `appmenu.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for application descriptors.
    pub descriptor_dir: Option<PathBuf>,
    /// Selector command line; words after the program are passed before forwarded arguments.
    pub selector: Option<String>,
    /// Shell used to run the chosen command.
    pub shell: Option<PathBuf>,
    /// File listing entry names to hide.
    pub ignore_file: Option<PathBuf>,
    /// File holding the most-recently-used order.
    pub cache_file: Option<PathBuf>,
    /// Maximum time in milliseconds to wait for the selector.
    pub selector_timeout_ms: Option<u64>,
}

/// Loads and parses the configuration from a file path.
pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Splits a selector command line into the program and its leading arguments.
pub fn split_selector(value: &str) -> Result<(PathBuf, Vec<String>)> {
    let mut parts =
        shell_words::split(value).with_context(|| format!("failed to parse selector {}", value))?;
    if parts.is_empty() {
        return Err(anyhow!("empty selector command"));
    }
    let program = parts.remove(0);
    Ok((PathBuf::from(program), parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_optional_fields() {
        let raw = r#"
descriptor_dir = "/opt/apps"
selector = "/usr/bin/dmenu -i -l 20"
shell = "/bin/bash"
ignore_file = "/tmp/ignore"
cache_file = "/tmp/cache"
selector_timeout_ms = 30000
"#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.descriptor_dir, Some(PathBuf::from("/opt/apps")));
        assert_eq!(config.selector.as_deref(), Some("/usr/bin/dmenu -i -l 20"));
        assert_eq!(config.shell, Some(PathBuf::from("/bin/bash")));
        assert_eq!(config.ignore_file, Some(PathBuf::from("/tmp/ignore")));
        assert_eq!(config.cache_file, Some(PathBuf::from("/tmp/cache")));
        assert_eq!(config.selector_timeout_ms, Some(30000));
    }

    #[test]
    fn empty_config_is_valid() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.descriptor_dir.is_none());
        assert!(config.selector.is_none());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<Config>("colour = \"red\"").is_err());
    }

    #[test]
    fn split_selector_handles_quotes() {
        let (program, args) = split_selector("dmenu -p 'Run app' -i").unwrap();
        assert_eq!(program, PathBuf::from("dmenu"));
        assert_eq!(args, vec!["-p", "Run app", "-i"]);
        assert!(split_selector("   ").is_err());
    }
}
