//! Default file locations.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

pub const DEFAULT_DESCRIPTOR_DIR: &str = "/usr/share/applications";
pub const DEFAULT_SELECTOR: &str = "/usr/local/bin/dmenu";
pub const DEFAULT_SHELL: &str = "/bin/sh";

const APP_DIR: &str = "dmenu";
const IGNORE_FILE: &str = "ignoreapplications";
const CACHE_FILE: &str = "applicationlist";
const CONFIG_FILE: &str = "appmenu.toml";

/// User cache and config roots resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    pub cache: PathBuf,
    pub config: PathBuf,
}

impl Roots {
    /// Resolves `$XDG_CACHE_HOME` and `$XDG_CONFIG_HOME`, falling back to
    /// `~/.cache` and `~/.config`.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| env::var(key).ok())
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let home = || {
            var("HOME")
                .map(PathBuf::from)
                .or_else(dirs::home_dir)
                .ok_or_else(|| anyhow!("could not determine the home directory"))
        };
        let cache = match var("XDG_CACHE_HOME") {
            Some(path) => PathBuf::from(path),
            None => home()?.join(".cache"),
        };
        let config = match var("XDG_CONFIG_HOME") {
            Some(path) => PathBuf::from(path),
            None => home()?.join(".config"),
        };
        Ok(Self { cache, config })
    }

    pub fn ignore_file(&self) -> PathBuf {
        self.config.join(APP_DIR).join(IGNORE_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config.join(APP_DIR).join(CONFIG_FILE)
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache.join(APP_DIR).join(CACHE_FILE)
    }
}
