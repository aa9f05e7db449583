//! `papyrd` entry
//!
//! Resolves where everything lives, sets up logging, and runs one slideshow until the process
//! is terminated.
//! The exclusion and order lists are read exactly once here, so edits made by the picker while
//! the daemon runs only take effect after a restart.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use thiserror::Error;

use crate::backends::CommandSetter;
use crate::config::{Config, ConfigError};
use crate::control::{self, ControlError};
use crate::playlist::{self, PlaylistError};
use crate::runner::Slideshow;
use crate::store::lists;

pub static LOCATIONS: LazyLock<Locations> = LazyLock::new(Locations::from_env);

/// How often the loop looks at the mailbox while waiting.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error("cannot set up logging: {0}")]
    Logger(#[from] fern::InitError),
    #[error("cannot create `{0}`: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("cannot read `{0}`: {1}")]
    ReadList(PathBuf, std::io::Error),
}

/// Every file the picker and the daemon share.
#[derive(Debug, Clone, PartialEq)]
pub struct Locations {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl Locations {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            config_dir: sys_config_dir().unwrap_or_else(|| {
                log::warn!("Cannot find config path as $XDG_CONFIG_HOME and $HOME are not valid");
                PathBuf::from(".")
            }),
            cache_dir: sys_cache_dir(),
        }
    }

    /// Places everything under one directory, mostly for tests.
    #[must_use]
    pub fn rooted(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            cache_dir: root.join("cache"),
        }
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    #[must_use]
    pub fn exclude_list(&self) -> PathBuf {
        self.config_dir.join("exclude.list")
    }

    #[must_use]
    pub fn order_list(&self) -> PathBuf {
        self.config_dir.join("order.list")
    }

    #[must_use]
    pub fn pid_file(&self) -> PathBuf {
        self.cache_dir.join("daemon.pid")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.cache_dir.join("daemon.log")
    }
}

fn sys_cache_dir() -> PathBuf {
    if let Ok(mut value) = env::var("XDG_CACHE_HOME") {
        value.push_str("/papyr");
        return PathBuf::from(value);
    }
    if let Ok(mut value) = env::var("HOME") {
        value.push_str("/.cache/papyr");
        return PathBuf::from(value);
    }
    // This is not persistent anyhow
    PathBuf::from("/tmp/papyr")
}

fn sys_config_dir() -> Option<PathBuf> {
    let default;
    if let Ok(value) = env::var("XDG_CONFIG_HOME") {
        default = PathBuf::from(value + "/papyr");
    } else if let Ok(value) = env::var("HOME") {
        default = PathBuf::from(value + "/.config/papyr");
    } else {
        return None;
    }
    Some(default)
}

/// When detached, stdout goes nowhere, so everything is mirrored into the log file.
fn setup_logger(log_file: &Path) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                message
            ));
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .chain(fern::log_file(log_file)?)
        .apply()?;
    Ok(())
}

/// The real start.
///
/// Returns `Ok(())` without ever ticking if there is nothing to show.
///
/// # Errors
/// Fatal errors that prevent the loop from starting are returned here. Once the loop runs,
/// nothing short of a signal stops it.
pub fn run_loop(locations: &Locations) -> Result<(), DaemonError> {
    // Before anything slow, a control signal without a handler would end the process.
    let mailbox = control::install()?;
    if !locations.cache_dir.is_dir() {
        std::fs::create_dir_all(&locations.cache_dir).map_err(|err| {
            eprintln!("failed to create cache directory: {err}");
            DaemonError::CreateDir(locations.cache_dir.clone(), err)
        })?;
    }
    setup_logger(&locations.log_file())?;

    let config = Config::load(&locations.config_file()).inspect_err(|err| log::error!("{err}"))?;

    let exclude_path = locations.exclude_list();
    let excluded = lists::read_set(&exclude_path)
        .map_err(|err| DaemonError::ReadList(exclude_path, err))?;
    let order_path = locations.order_list();
    let order =
        lists::read_lines(&order_path).map_err(|err| DaemonError::ReadList(order_path, err))?;

    if order.is_empty() {
        log::info!("No order list found, scanning directories");
    } else {
        log::info!("Custom order list found, using it");
    }
    let playlist = match playlist::build(&config.wallpaper_dirs, &excluded, &order) {
        Ok(playlist) => playlist,
        Err(PlaylistError::Empty) => {
            log::warn!("No valid wallpapers found, exiting");
            return Ok(());
        }
    };
    log::info!(
        "Rotating {} wallpapers every {}s",
        playlist.len(),
        config.interval.as_secs()
    );

    let setter = CommandSetter::new(config.setter, config.output.clone(), config.color_scheme);
    let mut slideshow = Slideshow::new(playlist, setter, mailbox, config.interval, POLL_INTERVAL);
    smol::block_on(slideshow.run());
    Ok(())
}
