//! Keeps at most one slideshow daemon alive.
//!
//! The only guard is the identity file: `start` checks for a live pid and then spawns. Two
//! `start`s racing each other can both pass the check.

use nix::errno::Errno;
use nix::sys::signal::{SigmaskHow, Signal, kill, sigprocmask};
use nix::unistd::{Pid, setsid};
use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command as SysCommand, Stdio};
use thiserror::Error;

use crate::control::{self, ControlError, Event};
use crate::store::IdentityFile;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("cannot spawn the slideshow daemon: {0}")]
    Spawn(std::io::Error),
    #[error("cannot write `{0}`: {1}")]
    Identity(PathBuf, std::io::Error),
    #[error("cannot terminate daemon {0}: {1}")]
    Terminate(Pid, nix::Error),
    #[error(transparent)]
    Control(#[from] ControlError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(Pid),
    AlreadyRunning(Pid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped(Pid),
    NotRunning,
    /// The file named a process that vanished between the check and the kill.
    AlreadyGone(Pid),
}

/// What to execute as the daemon.
#[derive(Debug, Clone)]
pub struct Entry {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Entry {
    /// Re-runs the current executable with `flag`.
    ///
    /// # Errors
    /// Returns [`SupervisorError::Spawn`] if the current executable cannot be determined.
    pub fn current_exe(flag: &str) -> Result<Self, SupervisorError> {
        Ok(Self {
            program: std::env::current_exe().map_err(SupervisorError::Spawn)?,
            args: vec![flag.into()],
        })
    }
}

pub struct Supervisor {
    identity: IdentityFile,
    entry: Entry,
}

impl Supervisor {
    #[must_use]
    pub fn new(identity: IdentityFile, entry: Entry) -> Self {
        Self { identity, entry }
    }

    /// The pid of the running daemon, if any.
    #[must_use]
    pub fn status(&self) -> Option<Pid> {
        self.identity.live()
    }

    /// Spawns the daemon unless one is already alive.
    ///
    /// # Errors
    /// Returns a [`SupervisorError`] if spawning or recording the pid fails.
    pub fn start(&self) -> Result<StartOutcome, SupervisorError> {
        if let Some(pid) = self.identity.live() {
            return Ok(StartOutcome::AlreadyRunning(pid));
        }

        let mut command = SysCommand::new(&self.entry.program);
        command
            .args(&self.entry.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let blocked = control::control_set();
        // SAFETY: only async-signal-safe calls between fork and exec.
        unsafe {
            command.pre_exec(move || {
                // Leave the terminal's session, its hangups must not look like `Previous`.
                setsid()?;
                // Commands wait until the daemon has its handlers.
                sigprocmask(SigmaskHow::SIG_BLOCK, Some(&blocked), None)?;
                Ok(())
            });
        }
        let child = command.spawn().map_err(SupervisorError::Spawn)?;
        let pid = Pid::from_raw(
            child
                .id()
                .try_into()
                .map_err(|_| SupervisorError::Spawn(std::io::ErrorKind::InvalidData.into()))?,
        );

        if let Err(err) = self.identity.store(pid) {
            // Never leave a daemon nobody knows about.
            if let Err(kill_err) = kill(pid, Signal::SIGTERM) {
                log::warn!("Cannot terminate unrecorded daemon {pid}: {kill_err}");
            }
            return Err(SupervisorError::Identity(
                self.identity.path().to_path_buf(),
                err,
            ));
        }
        log::info!("Slideshow daemon started as {pid}");
        Ok(StartOutcome::Started(pid))
    }

    /// Asks the daemon to terminate and forgets about it, even if the request fails.
    ///
    /// # Errors
    /// Returns [`SupervisorError::Terminate`] if the signal could not be sent for a reason other
    /// than the process being gone. The identity file is removed anyway.
    pub fn stop(&self) -> Result<StopOutcome, SupervisorError> {
        let Some(pid) = self.identity.live() else {
            return Ok(StopOutcome::NotRunning);
        };

        let result = kill(pid, Signal::SIGTERM);
        if let Err(err) = self.identity.clear() {
            log::warn!("Cannot remove `{}`: {err}", self.identity.path().display());
        }
        match result {
            Ok(()) => Ok(StopOutcome::Stopped(pid)),
            Err(Errno::ESRCH) => Ok(StopOutcome::AlreadyGone(pid)),
            Err(err) => Err(SupervisorError::Terminate(pid, err)),
        }
    }

    /// Forwards an event to the running daemon.
    ///
    /// # Errors
    /// Returns [`ControlError::DaemonNotRunning`] if there is no live daemon; nothing is sent.
    pub fn send(&self, event: Event) -> Result<Pid, SupervisorError> {
        let pid = self.identity.live().ok_or(ControlError::DaemonNotRunning)?;
        control::deliver(pid, event)?;
        log::debug!("Delivered {event:?} to {pid}");
        Ok(pid)
    }
}
