//! Most-recently-used ordering of entry names, persisted between runs.
//!
//! The cache is a plain file with one entry name per line, most recently launched
//! first. Every change is staged in a temp file next to the cache and renamed over
//! it, so an interrupted rewrite leaves the previous file intact.

use std::collections::HashSet;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::entry::Repository;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file {} does not exist", path.display())]
    Missing { path: PathBuf },
    #[error("failed to create cache directory {}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read cache file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write cache file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persistent MRU order stored at a fixed path.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the directory tree holding the cache file.
    pub fn prepare(&self) -> Result<(), CacheError> {
        let dir = self.dir();
        std::fs::create_dir_all(&dir).map_err(|source| CacheError::Directory { path: dir, source })
    }

    /// Merges the stored order with the current entries, rewrites the cache and
    /// returns the merged order.
    ///
    /// Stored names keep their positions whether or not they still resolve to an
    /// entry. Entries missing from the stored order are appended in scan order.
    /// Without a cache file, the scan order becomes the initial order.
    pub fn load(&self, repo: &Repository) -> Result<Vec<String>, CacheError> {
        let stored = self.read_lines()?;
        let created = stored.is_none();
        let stored = stored.unwrap_or_default();
        let order = merge_order(stored.iter().map(String::as_str), repo);

        let staged = self.stage(&order)?;
        self.commit(staged)?;
        if created {
            debug!(path = %self.path.display(), count = order.len(), "created cache");
        } else {
            debug!(
                path = %self.path.display(),
                stored = stored.len(),
                count = order.len(),
                "merged cache"
            );
        }
        Ok(order)
    }

    /// Moves `name` to the front of the stored order.
    ///
    /// The cache must already exist; `load` always runs first, so a missing file
    /// means something removed it underneath us.
    pub fn promote(&self, name: &str) -> Result<(), CacheError> {
        let stored = self.read_lines()?.ok_or_else(|| CacheError::Missing {
            path: self.path.clone(),
        })?;
        let order = promoted_order(stored, name);
        let staged = self.stage(&order)?;
        self.commit(staged)?;
        debug!(path = %self.path.display(), name, "promoted entry");
        Ok(())
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn read_lines(&self) -> Result<Option<Vec<String>>, CacheError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(
                raw.lines()
                    .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
                    .collect(),
            )),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes `lines` into a temp file beside the cache. Dropping the returned file
    /// without committing discards it.
    fn stage(&self, lines: &[String]) -> Result<NamedTempFile, CacheError> {
        let write_err = |source: std::io::Error| CacheError::Write {
            path: self.path.clone(),
            source,
        };
        let prefix = format!(
            ".{}.",
            self.path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "cache".to_string())
        );
        let mut temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(self.dir())
            .map_err(write_err)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            for line in lines {
                writeln!(writer, "{}", line).map_err(write_err)?;
            }
            writer.flush().map_err(write_err)?;
        }
        temp.as_file().sync_all().map_err(write_err)?;
        Ok(temp)
    }

    fn commit(&self, staged: NamedTempFile) -> Result<(), CacheError> {
        staged
            .persist(&self.path)
            .map(|_| ())
            .map_err(|err| CacheError::Write {
                path: self.path.clone(),
                source: err.error,
            })
    }
}

/// Combines a stored order with the current entries.
///
/// Blank lines and repeated names are dropped; the first occurrence wins.
pub fn merge_order<'a>(
    stored: impl IntoIterator<Item = &'a str>,
    repo: &Repository,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for name in stored {
        if !name.is_empty() && seen.insert(name) {
            order.push(name.to_string());
        }
    }
    for name in repo.names() {
        if seen.insert(name) {
            order.push(name.to_string());
        }
    }
    order
}

fn promoted_order(stored: Vec<String>, name: &str) -> Vec<String> {
    let mut order = Vec::with_capacity(stored.len() + 1);
    order.push(name.to_string());
    order.extend(
        stored
            .into_iter()
            .filter(|line| !line.is_empty() && line != name),
    );
    order
}
