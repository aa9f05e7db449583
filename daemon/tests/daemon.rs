//! Runs the real `papyrd` binary and talks to it with signals

use std::env;
use std::path::Path;
use std::time::Duration;

use papyrd::Locations;
use papyrd::control::Event;
use papyrd::store::IdentityFile;
use papyrd::supervisor::{Entry, StartOutcome, StopOutcome, Supervisor};

mod common;

const TIMEOUT: Duration = Duration::from_secs(10);

fn log_contains(path: &Path, needle: &str) -> bool {
    common::wait_until(TIMEOUT, || {
        std::fs::read_to_string(path).is_ok_and(|log| log.contains(needle))
    })
}

fn write_config(config_dir: &Path, walls: &Path, extra: &str) {
    std::fs::create_dir_all(config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!("wallpaper_dirs = [\"{}\"]\n{extra}", walls.display()),
    )
    .unwrap();
}

fn empty_playlist_exits_cleanly(root: &Path) {
    let walls = root.join("empty");
    std::fs::create_dir(&walls).unwrap();
    std::fs::write(walls.join("notes.txt"), b"").unwrap();
    write_config(&root.join("papyr"), &walls, "");

    let status = std::process::Command::new(env!("CARGO_BIN_EXE_papyrd"))
        .env("XDG_CONFIG_HOME", root)
        .env("XDG_CACHE_HOME", root)
        .status()
        .unwrap();
    assert!(status.success());

    let log = std::fs::read_to_string(root.join("papyr").join("daemon.log")).unwrap();
    assert!(log.contains("No valid wallpapers found"));
}

fn detached_daemon_follows_signals(root: &Path) {
    let walls = root.join("walls");
    std::fs::create_dir(&walls).unwrap();
    for name in ["a.png", "b.png", "c.png"] {
        std::fs::write(walls.join(name), b"").unwrap();
    }
    let config_dir = root.join("config").join("papyr");
    write_config(&config_dir, &walls, "slideshow_interval = \"1h\"\nsetter = \"feh\"\n");

    // The child inherits this, and feh must not reach a real display.
    unsafe {
        env::set_var("XDG_CONFIG_HOME", root.join("config"));
        env::set_var("XDG_CACHE_HOME", root.join("cache"));
        env::remove_var("DISPLAY");
        env::remove_var("WAYLAND_DISPLAY");
    }
    let locations = Locations::from_env();
    assert_eq!(locations.config_dir, config_dir);
    let log = locations.log_file();

    let supervisor = Supervisor::new(
        IdentityFile::new(locations.pid_file()),
        Entry {
            program: env!("CARGO_BIN_EXE_papyrd").into(),
            args: Vec::new(),
        },
    );
    let StartOutcome::Started(pid) = supervisor.start().unwrap() else {
        panic!("nothing should be running yet");
    };
    assert!(log_contains(&log, "Setting wallpaper 1/3"));

    supervisor.send(Event::Next).unwrap();
    assert!(log_contains(&log, "Setting wallpaper 2/3"));
    supervisor.send(Event::Previous).unwrap();
    assert!(log_contains(&log, "Skipping to previous wallpaper"));
    supervisor.send(Event::TogglePause).unwrap();
    assert!(log_contains(&log, "Paused"));

    assert_eq!(supervisor.stop().unwrap(), StopOutcome::Stopped(pid));
    assert!(!locations.pid_file().exists());
}

// Both parts touch the process environment, so they run one after the other.
#[test]
fn daemon_binary() {
    let root = tempfile::tempdir().unwrap();
    empty_playlist_exits_cleanly(root.path());
    detached_daemon_follows_signals(root.path());
}
