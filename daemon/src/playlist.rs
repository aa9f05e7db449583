//! Decides what the slideshow rotates through.
//!
//! An explicit order list wins and is used as is, minus excluded entries. Without one, the
//! configured directories are scanned (not recursively) and the result is shuffled.

use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

const EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

#[derive(Debug, PartialEq, Error)]
pub enum PlaylistError {
    #[error("no wallpapers to rotate through")]
    Empty,
}

/// A directory that could not be listed. Never fatal.
#[derive(Debug, Error)]
#[error("cannot scan `{dir}`: {source}")]
pub struct ScanError {
    dir: PathBuf,
    source: std::io::Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    entries: Vec<PathBuf>,
    deterministic: bool,
}

impl Playlist {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Path> {
        self.entries.get(index).map(PathBuf::as_path)
    }

    #[must_use]
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Whether the order came from the user and must be kept.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Shuffles again, unless the order is the user's.
    pub fn reshuffle(&mut self) {
        if !self.deterministic {
            self.entries.shuffle(&mut rand::rng());
        }
    }
}

/// Builds the playlist for one daemon run.
///
/// # Errors
/// Returns [`PlaylistError::Empty`] if nothing is left to show.
pub fn build(
    dirs: &[PathBuf],
    excluded: &HashSet<PathBuf>,
    order: &[PathBuf],
) -> Result<Playlist, PlaylistError> {
    let playlist = if order.is_empty() {
        let mut entries: Vec<PathBuf> = scan(dirs)
            .into_iter()
            .filter(|path| !excluded.contains(path))
            .collect();
        entries.shuffle(&mut rand::rng());
        Playlist {
            entries,
            deterministic: false,
        }
    } else {
        Playlist {
            entries: order
                .iter()
                .filter(|path| !excluded.contains(*path))
                .cloned()
                .collect(),
            deterministic: true,
        }
    };

    if playlist.is_empty() {
        Err(PlaylistError::Empty)
    } else {
        Ok(playlist)
    }
}

/// Lists every image directly inside `dirs`. Unreadable directories are skipped with a warning.
#[must_use]
pub fn scan(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for dir in dirs {
        match scan_one(dir) {
            Ok(mut images) => {
                images.sort();
                found.append(&mut images);
            }
            Err(err) => log::warn!("{err}, skipping"),
        }
    }
    found
}

fn scan_one(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let read_dir = std::fs::read_dir(dir).map_err(|source| ScanError {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut images = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("`{}`: {err}, skipping entry", dir.display());
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_image(&path) {
            images.push(path);
        }
    }
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
