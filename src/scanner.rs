//! Descriptor directory scanning.
//!
//! Each regular file directly inside the descriptor directory is read as an
//! application descriptor. Only the `Name` and `Exec` keys and a handful of
//! visibility markers are interpreted; everything else in the file is ignored.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::entry::{Entry, EntryError, Repository};
use crate::ignore::IgnoreList;

/// Markers that keep a descriptor out of the menu entirely.
const HIDDEN_MARKERS: &[&str] = &[
    "OnlyShowIn",
    "NotShowIn",
    "NoDisplay=true",
    "Hidden=true",
    "Terminal=true",
];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("could not open descriptor directory {}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid descriptor {}", path.display())]
    Entry {
        path: PathBuf,
        #[source]
        source: EntryError,
    },
}

/// Outcome of parsing a single descriptor file.
#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    Entry(Entry),
    Hidden,
    Ignored(String),
    Incomplete,
}

/// Scans `dir` and returns the visible, non-ignored entries sorted by file name.
///
/// An unreadable directory and an overlong name or command are fatal; a descriptor
/// that cannot be read is skipped.
pub fn scan(dir: &Path, ignore: &IgnoreList) -> Result<Repository, ScanError> {
    let read_dir = std::fs::read_dir(dir).map_err(|source| ScanError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for item in read_dir {
        let item = item.map_err(|source| ScanError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = item.path();
        // Follow symlinks: a link to a regular descriptor counts.
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => paths.push(path),
            Ok(_) => debug!(path = %path.display(), "skipping non-regular file"),
            Err(err) => warn!(path = %path.display(), "skipping descriptor: {}", err),
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), "skipping descriptor: {}", err);
                continue;
            }
        };
        match parse_descriptor(&raw, ignore) {
            Ok(Parsed::Entry(entry)) => entries.push(entry),
            Ok(Parsed::Hidden) => debug!(path = %path.display(), "hidden descriptor"),
            Ok(Parsed::Ignored(name)) => debug!(path = %path.display(), %name, "ignored"),
            Ok(Parsed::Incomplete) => debug!(path = %path.display(), "no usable Name/Exec"),
            Err(EntryError::Empty { field }) => {
                debug!(path = %path.display(), %field, "empty field")
            }
            Err(source) => return Err(ScanError::Entry { path, source }),
        }
    }

    debug!(dir = %dir.display(), count = entries.len(), "scanned descriptors");
    Ok(Repository::new(entries))
}

fn parse_descriptor(raw: &str, ignore: &IgnoreList) -> Result<Parsed, EntryError> {
    if is_hidden(raw) {
        return Ok(Parsed::Hidden);
    }

    let mut name: Option<&str> = None;
    let mut command: Option<String> = None;
    for line in raw.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.strip_suffix('\r').unwrap_or(value);
        match key.trim() {
            "Name" => {
                if ignore.contains(value) {
                    return Ok(Parsed::Ignored(value.to_string()));
                }
                name = Some(value);
            }
            "Exec" => {
                // Exec before Name ends the search.
                if name.is_some() {
                    command = Some(strip_field_codes(value));
                }
                break;
            }
            _ => {}
        }
    }

    match (name, command) {
        (Some(name), Some(command)) => Entry::new(name, command).map(Parsed::Entry),
        _ => Ok(Parsed::Incomplete),
    }
}

fn is_hidden(raw: &str) -> bool {
    raw.lines()
        .any(|line| HIDDEN_MARKERS.iter().any(|marker| line.contains(marker)))
}

/// Cuts the command at the first whitespace-preceded `%x` field code; this launcher
/// never passes file or URL arguments.
fn strip_field_codes(command: &str) -> String {
    let bytes = command.as_bytes();
    let cut = bytes
        .windows(3)
        .position(|w| w[0].is_ascii_whitespace() && w[1] == b'%' && w[2].is_ascii_alphabetic())
        .unwrap_or(bytes.len());
    command[..cut].trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::entry::{MAX_COMMAND_LEN, MAX_NAME_LEN};

    fn write(dir: &Path, file: &str, body: &str) {
        std::fs::write(dir.join(file), body).unwrap();
    }

    fn pairs(repo: &Repository) -> HashSet<(String, String)> {
        repo.names()
            .filter_map(|name| repo.lookup(name))
            .map(|e| (e.name().to_string(), e.command().to_string()))
            .collect()
    }

    #[test]
    fn parses_name_and_exec() {
        let raw = "[Desktop Entry]\nType=Application\nGenericName=Web Browser\nName=Firefox\nTryExec=firefox\nExec=firefox %u\n";
        let parsed = parse_descriptor(raw, &IgnoreList::default()).unwrap();
        assert_eq!(parsed, Parsed::Entry(Entry::new("Firefox", "firefox").unwrap()));
    }

    #[test]
    fn strip_field_codes_keeps_literal_percent() {
        assert_eq!(strip_field_codes("gimp-2.10 %U"), "gimp-2.10");
        assert_eq!(strip_field_codes("app --flag %f --other"), "app --flag");
        assert_eq!(strip_field_codes("printf 100%%"), "printf 100%%");
        assert_eq!(strip_field_codes("plain"), "plain");
    }

    #[test]
    fn exec_before_name_yields_nothing() {
        let raw = "[Desktop Entry]\nExec=foo\nName=Foo\n";
        let parsed = parse_descriptor(raw, &IgnoreList::default()).unwrap();
        assert_eq!(parsed, Parsed::Incomplete);
    }

    #[test]
    fn hidden_markers_suppress_entry() {
        for marker in [
            "NoDisplay=true",
            "Terminal=true",
            "OnlyShowIn=GNOME;",
            "NotShowIn=KDE;",
            "Hidden=true",
        ] {
            let raw = format!("[Desktop Entry]\nName=Foo\nExec=foo\n{}\n", marker);
            let parsed = parse_descriptor(&raw, &IgnoreList::default()).unwrap();
            assert_eq!(parsed, Parsed::Hidden, "marker {}", marker);
        }
    }

    #[test]
    fn ignored_names_are_dropped() {
        let ignore: IgnoreList = ["Foo"].into_iter().collect();
        let parsed = parse_descriptor("Name=Foo\nExec=foo\n", &ignore).unwrap();
        assert_eq!(parsed, Parsed::Ignored("Foo".into()));
    }

    #[test]
    fn overlong_fields_are_errors() {
        let raw = format!("Name={}\nExec=foo\n", "n".repeat(MAX_NAME_LEN + 1));
        assert!(parse_descriptor(&raw, &IgnoreList::default()).is_err());
        let raw = format!("Name=Foo\nExec={}\n", "c".repeat(MAX_COMMAND_LEN + 1));
        assert!(parse_descriptor(&raw, &IgnoreList::default()).is_err());
    }

    #[test]
    fn scan_collects_visible_entries() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.desktop", "Name=B\nExec=b\n");
        write(dir.path(), "a.desktop", "Name=A\nExec=a %F\n");
        write(dir.path(), "hidden.desktop", "Name=H\nExec=h\nNoDisplay=true\n");
        write(dir.path(), "term.desktop", "Name=T\nExec=t\nTerminal=true\n");
        write(dir.path(), "ignored.desktop", "Name=Skip\nExec=skip\n");
        write(dir.path(), "broken.desktop", "Comment=nothing here\n");
        std::fs::create_dir(dir.path().join("subdir.desktop")).unwrap();

        let ignore: IgnoreList = ["Skip"].into_iter().collect();
        let repo = scan(dir.path(), &ignore).unwrap();
        assert_eq!(repo.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(repo.lookup("A").unwrap().command(), "a");
        assert!(!repo.contains("Skip"));
        assert!(!repo.contains("H"));
        assert!(!repo.contains("T"));

        let again = scan(dir.path(), &ignore).unwrap();
        assert_eq!(pairs(&repo), pairs(&again));
    }

    #[test]
    fn scan_skips_unusable_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.desktop", "Name=A\nExec=a\n");
        std::fs::write(dir.path().join("binary.desktop"), b"Name=\xff\nExec=x\n").unwrap();
        write(dir.path(), "empty-exec.desktop", "Name=E\nExec= %U\n");
        write(dir.path(), "empty-name.desktop", "Name=\nExec=n\n");
        write(dir.path(), "z.desktop", "Name=Z\nExec=z\n");

        let repo = scan(dir.path(), &IgnoreList::default()).unwrap();
        assert_eq!(repo.names().collect::<Vec<_>>(), vec!["A", "Z"]);
    }

    #[test]
    fn scan_fails_on_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan(&dir.path().join("missing"), &IgnoreList::default()).unwrap_err();
        assert!(matches!(err, ScanError::Directory { .. }));
    }

    #[test]
    fn scan_aborts_on_overlong_command() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.desktop", "Name=A\nExec=a\n");
        write(
            dir.path(),
            "long.desktop",
            &format!("Name=Long\nExec={}\n", "c".repeat(MAX_COMMAND_LEN + 1)),
        );
        let err = scan(dir.path(), &IgnoreList::default()).unwrap_err();
        assert!(matches!(err, ScanError::Entry { .. }));
    }
}
