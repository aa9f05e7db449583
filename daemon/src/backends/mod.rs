//! Programs that can actually put a wallpaper on screen.

mod command;

pub use command::CommandSetter;

use serde::Deserialize;
use std::future::Future;
use std::path::Path;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetterError {
    #[error("no supported wallpaper setter found in $PATH")]
    NotFound,
    #[error("cannot run `{0}`: {1}")]
    Spawn(&'static str, std::io::Error),
    #[error("`{0}` failed with {1}")]
    Failed(&'static str, ExitStatus),
}

/// Which program to use. `Auto` picks the first one installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetterKind {
    #[default]
    Auto,
    Feh,
    Swww,
    Gnome,
}

impl SetterKind {
    /// Candidates for `Auto`, in order of preference.
    pub const DETECTABLE: [SetterKind; 3] = [SetterKind::Feh, SetterKind::Swww, SetterKind::Gnome];

    #[must_use]
    pub fn binary(self) -> Option<&'static str> {
        match self {
            SetterKind::Auto => None,
            SetterKind::Feh => Some("feh"),
            SetterKind::Swww => Some("swww"),
            SetterKind::Gnome => Some("gsettings"),
        }
    }
}

/// Applies one wallpaper.
pub trait Setter {
    fn apply(&self, path: &Path) -> impl Future<Output = Result<(), SetterError>>;
}
