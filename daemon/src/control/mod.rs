//! Commands reaching the daemon from outside.
//!
//! The daemon has no socket. A short-lived `papyr` invocation finds the daemon's pid and sends it
//! a signal; the handler inside the daemon only records the request in a [`Mailbox`], which the
//! slideshow drains at its poll points, one event per poll.

mod signals;

pub use signals::{NEXT_SIGNAL, PREV_SIGNAL, TOGGLE_SIGNAL, control_set, deliver, install};

use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum ControlError {
    #[error("slideshow daemon is not running")]
    DaemonNotRunning,
    #[error("cannot signal the daemon: {0}")]
    Deliver(nix::Error),
    #[error("cannot install signal handlers: {0}")]
    Install(nix::Error),
}

/// What the slideshow can be asked to do while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Flip between running and paused. The daemon cannot tell a pause from a resume.
    TogglePause,
    /// Show the next wallpaper now.
    Next,
    /// Show the wallpaper before the current one now.
    Previous,
}

/// Every command the CLI understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Pause,
    Resume,
    Next,
    Previous,
    Status,
}

impl Command {
    /// The event a running daemon should receive, if this command is delivered as one.
    ///
    /// `Pause` and `Resume` are the same toggle, so resuming a running slideshow pauses it.
    #[must_use]
    pub fn event(self) -> Option<Event> {
        match self {
            Command::Pause | Command::Resume => Some(Event::TogglePause),
            Command::Next => Some(Event::Next),
            Command::Previous => Some(Event::Previous),
            Command::Start | Command::Stop | Command::Status => None,
        }
    }
}

/// Pending events, at most one per kind.
///
/// Each slot holds the arrival stamp of its event, `0` meaning empty, so events of different
/// kinds come out in the order they arrived. Repeats of `Next` or `Previous` before the loop
/// looks collapse into one. A second toggle cancels a pending one.
///
/// Posting only touches atomics, so it is safe inside a signal handler.
#[derive(Debug, Default)]
pub struct Mailbox {
    clock: AtomicUsize,
    toggle: AtomicUsize,
    previous: AtomicUsize,
    next: AtomicUsize,
}

impl Mailbox {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock: AtomicUsize::new(0),
            toggle: AtomicUsize::new(0),
            previous: AtomicUsize::new(0),
            next: AtomicUsize::new(0),
        }
    }

    pub fn post(&self, event: Event) {
        let stamp = self.clock.fetch_add(1, Ordering::SeqCst).wrapping_add(1).max(1);
        let slot = self.slot(event);
        if event == Event::TogglePause {
            let _ = slot.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                Some(if pending == 0 { stamp } else { 0 })
            });
        } else {
            slot.store(stamp, Ordering::SeqCst);
        }
    }

    /// Takes the pending event that arrived first.
    pub fn try_recv(&self) -> Option<Event> {
        loop {
            let (event, stamp) = [Event::TogglePause, Event::Previous, Event::Next]
                .into_iter()
                .map(|event| (event, self.slot(event).load(Ordering::SeqCst)))
                .filter(|(_, stamp)| *stamp != 0)
                .min_by_key(|(_, stamp)| *stamp)?;
            // A handler may have touched the slot since, look again if so.
            if self
                .slot(event)
                .compare_exchange(stamp, 0, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return Some(event);
            }
        }
    }

    fn slot(&self, event: Event) -> &AtomicUsize {
        match event {
            Event::TogglePause => &self.toggle,
            Event::Previous => &self.previous,
            Event::Next => &self.next,
        }
    }
}
