//! User-maintained list of entry names to keep out of the menu.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::entry::MAX_NAME_LEN;

/// Set of entry names that the scanner must never produce.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    names: HashSet<String>,
}

impl IgnoreList {
    /// Loads the list from `path`, one name per line.
    ///
    /// A missing file yields an empty list. Any other read failure is an error, since
    /// proceeding without the real ignore set could show entries the user suppressed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no ignore file");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read ignore file {}", path.display()))
            }
        };
        let list = Self::parse(&raw);
        debug!(path = %path.display(), count = list.len(), "loaded ignore list");
        Ok(list)
    }

    fn parse(raw: &str) -> Self {
        let mut names = HashSet::new();
        for line in raw.lines() {
            let name = line.strip_suffix('\r').unwrap_or(line);
            if name.is_empty() {
                continue;
            }
            if name.len() > MAX_NAME_LEN {
                warn!(
                    len = name.len(),
                    max = MAX_NAME_LEN,
                    "skipping overlong ignore entry '{}'",
                    name
                );
                continue;
            }
            names.insert(name.to_string());
        }
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
