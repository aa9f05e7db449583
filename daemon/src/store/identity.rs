//! The singleton identity file.
//!
//! Holds the pid of the running daemon as a single decimal integer. The file only means
//! something while that process is alive; a stale file is removed as soon as it is noticed.

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct IdentityFile {
    path: PathBuf,
}

impl IdentityFile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored pid without checking it.
    ///
    /// Returns [`None`] if there is no file or its content is not a positive integer.
    #[must_use]
    pub fn read(&self) -> Option<Pid> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        match text.trim().parse::<i32>() {
            Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
            _ => None,
        }
    }

    /// Saves the pid, creating the parent directory if needed.
    ///
    /// # Errors
    /// Returns an [`io::Error`] if the file cannot be written.
    pub fn store(&self, pid: Pid) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(&self.path)?;
        write!(file, "{pid}")?;
        file.flush()
    }

    /// Deletes the file, a missing file is fine.
    ///
    /// # Errors
    /// Returns an [`io::Error`] for anything other than the file not existing.
    pub fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }

    /// Returns the pid of the running daemon, if there is one.
    ///
    /// A file naming a process that no longer exists, or holding garbage, is removed on the way.
    #[must_use]
    pub fn live(&self) -> Option<Pid> {
        if !self.path.exists() {
            return None;
        }
        match self.read() {
            Some(pid) if is_alive(pid) => Some(pid),
            stale => {
                log::debug!(
                    "Removing stale identity file `{}` ({:?})",
                    self.path.display(),
                    stale
                );
                if let Err(err) = self.clear() {
                    log::warn!("Cannot remove `{}`: {err}", self.path.display());
                }
                None
            }
        }
    }
}

/// Signal 0 only checks whether the process exists.
/// `EPERM` means it exists but belongs to someone else.
#[must_use]
pub fn is_alive(pid: Pid) -> bool {
    matches!(kill(pid, None), Ok(()) | Err(Errno::EPERM))
}
