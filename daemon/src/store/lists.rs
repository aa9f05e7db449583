//! Line-oriented path lists shared with the picker.
//!
//! One path per line, UTF-8, no escaping. Lines are trimmed and blank lines are skipped.
//! A missing file is the same as an empty one.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Reads every path listed in `path`, in file order.
///
/// # Errors
/// Returns an [`io::Error`] if the file exists but cannot be opened. Individual unreadable lines
/// are logged and skipped.
pub fn read_lines(path: &Path) -> io::Result<Vec<PathBuf>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let result = BufReader::new(file)
        .lines()
        .enumerate()
        .filter_map(|(line_no, line)| match line {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(trimmed))
                }
            }
            Err(err) => {
                log::warn!(
                    "{}:{} error: {}, skipping",
                    path.to_string_lossy(),
                    line_no + 1,
                    err,
                );
                None
            }
        })
        .collect();
    Ok(result)
}

/// Same as [`read_lines`], for lists where order does not matter.
///
/// # Errors
/// See [`read_lines`].
pub fn read_set(path: &Path) -> io::Result<HashSet<PathBuf>> {
    Ok(read_lines(path)?.into_iter().collect())
}

/// The text of `entry`, which must survive a round trip through the file unchanged.
fn line_of(entry: &Path) -> io::Result<&str> {
    entry.to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("`{}` is not valid UTF-8", entry.display()),
        )
    })
}

/// Replaces the contents of `path` with `entries`, creating parent directories as needed.
/// An empty list removes the file instead.
///
/// # Errors
/// Returns an [`io::Error`] if writing fails or an entry is not valid UTF-8. Nothing is
/// written in the latter case.
pub fn write_lines(path: &Path, entries: &[PathBuf]) -> io::Result<()> {
    let lines = entries
        .iter()
        .map(|entry| line_of(entry))
        .collect::<io::Result<Vec<_>>>()?;
    if lines.is_empty() {
        return match std::fs::remove_file(path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        };
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()
}

/// Appends `entry` unless it is already listed.
///
/// Returns whether the list changed.
///
/// # Errors
/// See [`read_lines`] and [`write_lines`].
pub fn insert(path: &Path, entry: &Path) -> io::Result<bool> {
    line_of(entry)?;
    let mut entries = read_lines(path)?;
    if entries.iter().any(|each| each == entry) {
        return Ok(false);
    }
    entries.push(entry.to_path_buf());
    write_lines(path, &entries)?;
    Ok(true)
}

/// Drops every occurrence of `entry`.
///
/// Returns whether the list changed.
///
/// # Errors
/// See [`read_lines`] and [`write_lines`].
pub fn remove(path: &Path, entry: &Path) -> io::Result<bool> {
    let mut entries = read_lines(path)?;
    let before = entries.len();
    entries.retain(|each| each != entry);
    if entries.len() == before {
        return Ok(false);
    }
    write_lines(path, &entries)?;
    Ok(true)
}
