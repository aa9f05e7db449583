//! `papyr` entry
//!
//! Short-lived: every invocation does one thing and exits. The slideshow itself runs in a
//! detached copy of this binary started with the hidden daemon flag.

mod cli;

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

use cli::{Cli, DAEMON_FLAG, NO_PICKER, SlideshowAction};
use papyrd::config::Config;
use papyrd::control::{Command, ControlError};
use papyrd::store::{IdentityFile, lists};
use papyrd::supervisor::{Entry, StartOutcome, StopOutcome, SupervisorError};
use papyrd::{LOCATIONS, Supervisor};

fn setup_logger(level: log::LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                message
            ));
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The daemon sets up its own logging.
    if cli.run_daemon_loop {
        return match papyrd::run_loop(&LOCATIONS) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{err}");
                ExitCode::FAILURE
            }
        };
    }

    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    if let Err(err) = setup_logger(level) {
        eprintln!("{err}");
    }

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn Error>> {
    if let Some(action) = cli.slideshow {
        return slideshow(action);
    }
    if let Some(path) = &cli.exclude {
        let path = std::path::absolute(path)?;
        if lists::insert(&LOCATIONS.exclude_list(), &path)? {
            println!("Excluded {}.", path.display());
            hint_restart();
        } else {
            println!("{} is already excluded.", path.display());
        }
    } else if let Some(path) = &cli.include {
        let path = std::path::absolute(path)?;
        if lists::remove(&LOCATIONS.exclude_list(), &path)? {
            println!("{} is no longer excluded.", path.display());
            hint_restart();
        } else {
            println!("{} was not excluded.", path.display());
        }
    } else if let Some(file) = &cli.order {
        set_order(file)?;
    } else if cli.clear_order {
        lists::write_lines(&LOCATIONS.order_list(), &[])?;
        println!("Order list cleared, the slideshow will shuffle.");
        hint_restart();
    } else {
        eprintln!("{NO_PICKER}");
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn set_order(file: &Path) -> Result<(), Box<dyn Error>> {
    let entries = lists::read_lines(file)?
        .iter()
        .map(std::path::absolute)
        .collect::<Result<Vec<_>, _>>()?;
    if entries.is_empty() {
        return Err(format!("`{}` lists no wallpapers", file.display()).into());
    }
    lists::write_lines(&LOCATIONS.order_list(), &entries)?;
    println!("Order list set with {} wallpapers.", entries.len());
    hint_restart();
    Ok(())
}

/// The daemon reads the lists only once.
fn hint_restart() {
    if IdentityFile::new(LOCATIONS.pid_file()).live().is_some() {
        println!("Restart the slideshow for this to take effect.");
    }
}

fn slideshow(action: SlideshowAction) -> Result<ExitCode, Box<dyn Error>> {
    let supervisor = Supervisor::new(
        IdentityFile::new(LOCATIONS.pid_file()),
        Entry::current_exe(DAEMON_FLAG)?,
    );

    match Command::from(action) {
        Command::Start => {
            // Fail here rather than in a detached process nobody watches.
            let config = Config::load(&LOCATIONS.config_file())?;
            match supervisor.start()? {
                StartOutcome::Started(pid) => println!(
                    "Slideshow daemon started (pid {pid}) with an interval of {}s.",
                    config.interval.as_secs()
                ),
                StartOutcome::AlreadyRunning(pid) => {
                    println!("Slideshow daemon is already running (pid {pid}).");
                }
            }
        }
        Command::Stop => match supervisor.stop()? {
            StopOutcome::Stopped(_) => println!("Slideshow daemon stopped."),
            StopOutcome::NotRunning => println!("Slideshow daemon is not running."),
            StopOutcome::AlreadyGone(_) => {
                println!("Slideshow daemon was not running (stale PID file cleaned).");
            }
        },
        Command::Status => {
            if let Some(pid) = supervisor.status() {
                println!("Slideshow daemon is running (pid {pid}).");
            } else {
                println!("Slideshow daemon is not running.");
                return Ok(ExitCode::FAILURE);
            }
        }
        command => {
            let Some(event) = command.event() else {
                return Ok(ExitCode::FAILURE);
            };
            match supervisor.send(event) {
                Ok(pid) => println!("Sent {action:?} to the slideshow daemon (pid {pid})."),
                Err(SupervisorError::Control(ControlError::DaemonNotRunning)) => {
                    eprintln!("Slideshow daemon is not running.");
                    return Ok(ExitCode::FAILURE);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
