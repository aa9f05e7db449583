//! Reads `config.toml`.
//!
//! The daemon takes one snapshot at startup and never looks at the file again.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::backends::SetterKind;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{0}`: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("cannot parse config `{0}`: {1}")]
    Parse(PathBuf, toml::de::Error),
    #[error("invalid slideshow interval `{0}`")]
    InvalidInterval(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub wallpaper_dirs: Vec<PathBuf>,
    pub interval: Duration,
    pub setter: SetterKind,
    pub output: Option<String>,
    pub color_scheme: bool,
}

/// `slideshow_interval` is either plain minutes or a duration string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Interval {
    Minutes(u64),
    Text(String),
}

/// Sections the picker owns. Accepted and left alone.
const PICKER_KEYS: [&str; 1] = ["behavior"];

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    wallpaper_dirs: Option<Vec<String>>,
    #[serde(default)]
    slideshow_interval: Option<Interval>,
    #[serde(default)]
    setter: SetterKind,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    color_scheme: bool,
    #[serde(flatten)]
    rest: toml::Table,
}

impl Default for Config {
    fn default() -> Self {
        let home = env::var("HOME").ok();
        Self {
            wallpaper_dirs: vec![expand_home("~/Pictures", home.as_deref())],
            interval: DEFAULT_INTERVAL,
            setter: SetterKind::default(),
            output: None,
            color_scheme: false,
        }
    }
}

impl Config {
    /// Loads the config at `path`, falling back to defaults if there is no such file.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the file exists but cannot be read or understood.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text, env::var("HOME").ok().as_deref()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No config at `{}`, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Read(path.to_path_buf(), err)),
        }
    }

    fn parse(path: &Path, text: &str, home: Option<&str>) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|err| ConfigError::Parse(path.to_path_buf(), err))?;
        for key in raw.rest.keys() {
            if !PICKER_KEYS.contains(&key.as_str()) {
                log::warn!("Unknown key `{key}` in `{}`, ignoring", path.display());
            }
        }

        let wallpaper_dirs = match raw.wallpaper_dirs {
            Some(dirs) => dirs
                .iter()
                .map(|dir| expand_home(dir, home))
                .filter(|dir| {
                    let keep = dir.is_dir();
                    if !keep {
                        log::warn!("`{}` is not a directory, ignoring", dir.display());
                    }
                    keep
                })
                .collect(),
            None => vec![expand_home("~/Pictures", home)],
        };

        let interval = match raw.slideshow_interval {
            None => DEFAULT_INTERVAL,
            Some(Interval::Minutes(0)) => return Err(ConfigError::InvalidInterval("0".into())),
            Some(Interval::Minutes(minutes)) => Duration::from_secs(minutes.saturating_mul(60)),
            Some(Interval::Text(text)) => match duration_str::parse(&text) {
                Ok(duration) if !duration.is_zero() => duration,
                _ => return Err(ConfigError::InvalidInterval(text)),
            },
        };

        Ok(Self {
            wallpaper_dirs,
            interval,
            setter: raw.setter,
            output: raw.output,
            color_scheme: raw.color_scheme,
        })
    }
}

/// Expands a leading `~` the way a shell would.
fn expand_home(path: &str, home: Option<&str>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => PathBuf::from(home),
        (Some(rest), Some(home)) if rest.starts_with('/') => {
            PathBuf::from(format!("{home}{rest}"))
        }
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, home: &Path) -> Result<Config, ConfigError> {
        Config::parse(Path::new("config.toml"), text, home.to_str())
    }

    #[test]
    fn expanding_home() {
        assert_eq!(expand_home("~", Some("/home/u")), PathBuf::from("/home/u"));
        assert_eq!(
            expand_home("~/Pictures", Some("/home/u")),
            PathBuf::from("/home/u/Pictures")
        );
        assert_eq!(expand_home("~other/x", Some("/home/u")), PathBuf::from("~other/x"));
        assert_eq!(expand_home("~/x", None), PathBuf::from("~/x"));
        assert_eq!(expand_home("/abs", Some("/home/u")), PathBuf::from("/abs"));
    }

    #[test]
    fn interval_forms() {
        let home = tempfile::tempdir().unwrap();
        let config = parse("slideshow_interval = 5", home.path()).unwrap();
        assert_eq!(config.interval, Duration::from_secs(300));

        let config = parse("slideshow_interval = \"90s\"", home.path()).unwrap();
        assert_eq!(config.interval, Duration::from_secs(90));

        let config = parse("", home.path()).unwrap();
        assert_eq!(config.interval, DEFAULT_INTERVAL);

        assert!(matches!(
            parse("slideshow_interval = 0", home.path()),
            Err(ConfigError::InvalidInterval(_))
        ));
        assert!(matches!(
            parse("slideshow_interval = \"soon\"", home.path()),
            Err(ConfigError::InvalidInterval(_))
        ));
    }

    #[test]
    fn directories_are_expanded_and_checked() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join("walls")).unwrap();

        let config = parse(
            "wallpaper_dirs = [\"~/walls\", \"~/missing\"]",
            home.path(),
        )
        .unwrap();
        assert_eq!(config.wallpaper_dirs, vec![home.path().join("walls")]);
    }

    #[test]
    fn setter_and_extras() {
        let home = tempfile::tempdir().unwrap();
        let config = parse(
            "setter = \"swww\"\noutput = \"DP-1\"\ncolor_scheme = true",
            home.path(),
        )
        .unwrap();
        assert_eq!(config.setter, SetterKind::Swww);
        assert_eq!(config.output.as_deref(), Some("DP-1"));
        assert!(config.color_scheme);

        let config = parse("", home.path()).unwrap();
        assert_eq!(config.setter, SetterKind::Auto);
        assert_eq!(config.output, None);
        assert!(!config.color_scheme);
    }

    #[test]
    fn malformed() {
        let home = tempfile::tempdir().unwrap();
        assert!(matches!(
            parse("wallpaper_dirs = 3", home.path()),
            Err(ConfigError::Parse(..))
        ));
        assert!(matches!(
            parse("setter = \"xsetroot\"", home.path()),
            Err(ConfigError::Parse(..))
        ));
    }

    #[test]
    fn picker_sections_are_accepted() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join("walls")).unwrap();

        let config = parse(
            "wallpaper_dirs = [\"~/walls\"]\nslideshow_interval = 2\n\n[behavior]\nclose_on_unfocus = true\n",
            home.path(),
        )
        .unwrap();
        assert_eq!(config.wallpaper_dirs, vec![home.path().join("walls")]);
        assert_eq!(config.interval, Duration::from_secs(120));

        let config = parse("no_such_key = true", home.path()).unwrap();
        assert_eq!(config.interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.interval, DEFAULT_INTERVAL);
        assert_eq!(config.setter, SetterKind::Auto);
    }
}
