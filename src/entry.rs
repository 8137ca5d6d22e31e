//! Data structures for launchable application entries.
//!
//! This module defines a single launchable entry (`Entry`), the validation rules for
//! its fields, and the per-run collection of entries (`Repository`) that the menu and
//! the launcher resolve names against.

use thiserror::Error;

/// Maximum length of an entry name, in bytes.
pub const MAX_NAME_LEN: usize = 127;
/// Maximum length of an entry command, in bytes.
pub const MAX_COMMAND_LEN: usize = 255;

/// Which field of an entry failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Command,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Name => f.write_str("name"),
            Field::Command => f.write_str("command"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry {field} is empty")]
    Empty { field: Field },
    #[error("entry {field} for '{name}' is {len} bytes, limit is {max}")]
    TooLong {
        field: Field,
        name: String,
        len: usize,
        max: usize,
    },
}

/// A launchable application: the name shown in the menu and the shell command it runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    name: String,
    command: String,
}

impl Entry {
    /// Creates an entry, rejecting empty or overlong fields instead of truncating them.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Result<Self, EntryError> {
        let name = name.into();
        let command = command.into();
        if name.is_empty() {
            return Err(EntryError::Empty { field: Field::Name });
        }
        if command.is_empty() {
            return Err(EntryError::Empty {
                field: Field::Command,
            });
        }
        if name.len() > MAX_NAME_LEN {
            return Err(EntryError::TooLong {
                field: Field::Name,
                len: name.len(),
                max: MAX_NAME_LEN,
                name,
            });
        }
        if command.len() > MAX_COMMAND_LEN {
            return Err(EntryError::TooLong {
                field: Field::Command,
                len: command.len(),
                max: MAX_COMMAND_LEN,
                name,
            });
        }
        Ok(Self { name, command })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

/// All entries discovered during one run, in scan order.
///
/// Duplicate names are kept as scanned; lookups resolve to the first one.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    entries: Vec<Entry>,
}

impl Repository {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Returns the entry registered first under `name`.
    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Entry names in scan order, including duplicates.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_rejects_empty_fields() {
        assert_eq!(
            Entry::new("", "true"),
            Err(EntryError::Empty { field: Field::Name })
        );
        assert_eq!(
            Entry::new("Foo", ""),
            Err(EntryError::Empty {
                field: Field::Command
            })
        );
    }

    #[test]
    fn entry_enforces_length_limits() {
        let name = "n".repeat(MAX_NAME_LEN);
        let command = "c".repeat(MAX_COMMAND_LEN);
        assert!(Entry::new(name.clone(), command.clone()).is_ok());

        let err = Entry::new(format!("{}x", name), "true").unwrap_err();
        assert!(matches!(
            err,
            EntryError::TooLong {
                field: Field::Name,
                len: 128,
                ..
            }
        ));

        let err = Entry::new("Foo", format!("{}x", command)).unwrap_err();
        assert!(matches!(
            err,
            EntryError::TooLong {
                field: Field::Command,
                len: 256,
                ..
            }
        ));
    }

    #[test]
    fn lookup_returns_first_match() {
        let repo = Repository::new(vec![
            Entry::new("Editor", "vim").unwrap(),
            Entry::new("Browser", "firefox").unwrap(),
            Entry::new("Editor", "emacs").unwrap(),
        ]);
        assert_eq!(repo.lookup("Editor").unwrap().command(), "vim");
        assert!(repo.contains("Browser"));
        assert!(!repo.contains("Terminal"));
        assert_eq!(
            repo.names().collect::<Vec<_>>(),
            vec!["Editor", "Browser", "Editor"]
        );
    }
}
