//! Utils for generating commands and running the wallpaper setter programs.

use smol::process::{Command, Stdio};
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::backends::{Setter, SetterError, SetterKind};

const GNOME_SCHEMA: &str = "org.gnome.desktop.background";

pub struct CommandSetter {
    kind: SetterKind,
    output: Option<String>,
    color_scheme: bool,
}

impl Setter for CommandSetter {
    async fn apply(&self, path: &Path) -> Result<(), SetterError> {
        let kind = self.resolve()?;
        let (binary, args) = arguments(kind, path, self.output.as_deref());
        run(binary, &args).await?;

        // GNOME 42+ keeps a separate URI for dark mode, older versions reject the key.
        if kind == SetterKind::Gnome {
            let uri = file_uri(path);
            let args = [GNOME_SCHEMA.into(), "picture-uri-dark".into(), uri];
            if let Err(err) = run(binary, &prefixed("set", &args)).await {
                log::debug!("{err}");
            }
        }

        if self.color_scheme {
            let args = ["-n".into(), "-q".into(), "-i".into(), path.as_os_str().to_owned()];
            if let Err(err) = run("wal", &args).await {
                log::warn!("Colour scheme not regenerated: {err}");
            }
        }
        Ok(())
    }
}

impl CommandSetter {
    #[must_use]
    pub fn new(kind: SetterKind, output: Option<String>, color_scheme: bool) -> Self {
        if output.is_some() && matches!(kind, SetterKind::Feh | SetterKind::Gnome) {
            log::warn!("{kind:?} cannot target a single output, ignoring `output`");
        }
        Self {
            kind,
            output,
            color_scheme,
        }
    }

    fn resolve(&self) -> Result<SetterKind, SetterError> {
        match self.kind {
            SetterKind::Auto => detect(env::var_os("PATH").as_deref()).ok_or(SetterError::NotFound),
            kind => Ok(kind),
        }
    }
}

/// Finds the first installed setter.
fn detect(path_var: Option<&OsStr>) -> Option<SetterKind> {
    let dirs: Vec<PathBuf> = env::split_paths(path_var?).collect();
    SetterKind::DETECTABLE.into_iter().find(|kind| {
        kind.binary()
            .is_some_and(|binary| dirs.iter().any(|dir| dir.join(binary).is_file()))
    })
}

/// Gets the program and arguments that set `path` as the wallpaper.
fn arguments(kind: SetterKind, path: &Path, output: Option<&str>) -> (&'static str, Vec<OsString>) {
    let image = path.as_os_str().to_owned();
    match kind {
        SetterKind::Feh | SetterKind::Auto => ("feh", vec!["--bg-fill".into(), image]),
        SetterKind::Swww => {
            let mut args: Vec<OsString> = vec!["img".into()];
            if let Some(value) = output {
                args.push("--outputs".into());
                args.push(value.into());
            }
            args.push(image);
            ("swww", args)
        }
        SetterKind::Gnome => (
            "gsettings",
            prefixed(
                "set",
                &[GNOME_SCHEMA.into(), "picture-uri".into(), file_uri(path)],
            ),
        ),
    }
}

fn prefixed(first: &str, rest: &[OsString]) -> Vec<OsString> {
    let mut args = vec![OsString::from(first)];
    args.extend_from_slice(rest);
    args
}

fn file_uri(path: &Path) -> OsString {
    let mut uri = OsString::from("file://");
    uri.push(path.as_os_str());
    uri
}

async fn run(binary: &'static str, args: &[OsString]) -> Result<(), SetterError> {
    log::debug!("Run: {binary} {args:?}");
    let status = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|err| SetterError::Spawn(binary, err))?;
    if status.success() {
        Ok(())
    } else {
        Err(SetterError::Failed(binary, status))
    }
}
