//! cli parameters

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

use papyrd::control::Command;

/// Printed when no mode is given.
pub const NO_PICKER: &str =
    "The picker window is not part of this build; use --slideshow to control the daemon.";

/// Hidden flag the daemon is re-executed with.
pub const DAEMON_FLAG: &str = "--run-daemon-loop";

#[derive(Parser)]
#[command(
    version,
    about = "Wallpaper picker with a background slideshow.",
    after_help = NO_PICKER,
    group(
        ArgGroup::new("mode")
            .args(["slideshow", "exclude", "include", "order", "clear_order", "run_daemon_loop"])
    )
)]
pub struct Cli {
    #[arg(
        long = "slideshow",
        value_name = "ACTION",
        help = "Control the slideshow daemon."
    )]
    pub slideshow: Option<SlideshowAction>,

    #[arg(
        long = "exclude",
        value_name = "PATH",
        help = "Never show this wallpaper in the slideshow."
    )]
    pub exclude: Option<PathBuf>,

    #[arg(
        long = "include",
        value_name = "PATH",
        help = "Allow an excluded wallpaper again."
    )]
    pub include: Option<PathBuf>,

    #[arg(
        long = "order",
        value_name = "FILE",
        help = "Rotate through the paths listed in FILE, in that order, instead of shuffling."
    )]
    pub order: Option<PathBuf>,

    #[arg(long = "clear-order", help = "Go back to shuffling.")]
    pub clear_order: bool,

    #[arg(long = "run-daemon-loop", hide = true)]
    pub run_daemon_loop: bool,

    #[arg(long = "debug", help = "Print debug logs.")]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlideshowAction {
    Start,
    Stop,
    Pause,
    Resume,
    Next,
    #[value(alias = "previous")]
    Prev,
    Status,
}

impl From<SlideshowAction> for Command {
    fn from(action: SlideshowAction) -> Self {
        match action {
            SlideshowAction::Start => Command::Start,
            SlideshowAction::Stop => Command::Stop,
            SlideshowAction::Pause => Command::Pause,
            SlideshowAction::Resume => Command::Resume,
            SlideshowAction::Next => Command::Next,
            SlideshowAction::Prev => Command::Previous,
            SlideshowAction::Status => Command::Status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn slideshow_actions() {
        let cli = Cli::try_parse_from(["papyr", "--slideshow", "prev"]).unwrap();
        assert_eq!(cli.slideshow, Some(SlideshowAction::Prev));
        let cli = Cli::try_parse_from(["papyr", "--slideshow", "previous"]).unwrap();
        assert_eq!(Command::from(cli.slideshow.unwrap()), Command::Previous);
        assert!(Cli::try_parse_from(["papyr", "--slideshow", "sideways"]).is_err());
    }

    #[test]
    fn modes_are_exclusive() {
        let cli = Cli::try_parse_from(["papyr", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(cli.slideshow.is_none() && cli.exclude.is_none() && !cli.clear_order);
        assert!(
            Cli::try_parse_from(["papyr", "--slideshow", "start", "--exclude", "/w/a.png"]).is_err()
        );
        let cli = Cli::try_parse_from(["papyr", DAEMON_FLAG]).unwrap();
        assert!(cli.run_daemon_loop);
    }
}
