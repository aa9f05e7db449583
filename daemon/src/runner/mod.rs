//! The slideshow holds a playlist and rotates through it.
//!
//! Working cycle:
//! 1. Show the entry under the cursor and move the cursor forward.
//! 2. Wait for the interval, checking the [`Mailbox`] every poll interval.
//! 3. Act on whatever ended the wait.
//!
//! Setter errors are logged and the slideshow continues to operate.

mod wait;

use std::time::Duration;

use crate::backends::Setter;
use crate::control::{Event, Mailbox};
use crate::playlist::Playlist;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Running,
    /// Nothing is shown until resumed, except on explicit `Next`/`Previous`.
    Paused,
}

/// Everything the loop knows about where it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideshowState {
    /// Index of the entry the next tick shows.
    pub cursor: usize,
    pub mode: Mode,
    /// An event taken from the mailbox but not yet acted on.
    pub pending: Option<Event>,
    /// The cursor went past the end and the playlist has not been reshuffled yet.
    pub wrapped: bool,
}

impl Default for SlideshowState {
    fn default() -> Self {
        Self {
            cursor: 0,
            mode: Mode::Running,
            pending: None,
            wrapped: false,
        }
    }
}

impl SlideshowState {
    /// Moves one entry forward, noting when the cursor wraps around to the start.
    pub fn advance(&mut self, len: usize) {
        self.cursor = (self.cursor + 1) % len.max(1);
        self.wrapped = self.cursor == 0;
    }

    /// Moves so that the next tick shows the entry before the last one shown.
    ///
    /// The cursor already points one past what is on screen, hence two steps back. Going back
    /// over a wrap cancels it, the old order is still the one on screen.
    pub fn retreat(&mut self, len: usize) {
        let len = len.max(1);
        self.cursor = (self.cursor + len - (2 % len)) % len;
        self.wrapped = false;
    }

    pub fn toggle(&mut self) {
        self.mode = match self.mode {
            Mode::Running => Mode::Paused,
            Mode::Paused => Mode::Running,
        };
    }
}

pub struct Slideshow<'m, S: Setter> {
    playlist: Playlist,
    state: SlideshowState,
    setter: S,
    mailbox: &'m Mailbox,
    interval: Duration,
    poll: Duration,
}

impl<'m, S: Setter> Slideshow<'m, S> {
    /// `playlist` must not be empty, building it already guarantees that.
    #[must_use]
    pub fn new(
        playlist: Playlist,
        setter: S,
        mailbox: &'m Mailbox,
        interval: Duration,
        poll: Duration,
    ) -> Self {
        Self {
            playlist,
            state: SlideshowState::default(),
            setter,
            mailbox,
            interval,
            poll,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SlideshowState {
        &self.state
    }

    #[must_use]
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// The main slideshow task. Never returns; the process is stopped from outside.
    pub async fn run(&mut self) {
        self.tick().await;
        loop {
            self.wait().await;
            match self.state.pending.take() {
                None => self.tick().await,
                Some(Event::TogglePause) => {
                    self.state.toggle();
                    match self.state.mode {
                        Mode::Paused => log::info!("Paused"),
                        Mode::Running => log::info!("Resumed"),
                    }
                }
                Some(Event::Next) => {
                    log::info!("Skipping to next wallpaper");
                    self.tick().await;
                }
                Some(Event::Previous) => {
                    log::info!("Skipping to previous wallpaper");
                    self.state.retreat(self.playlist.len());
                    self.tick().await;
                }
            }
        }
    }

    /// Shows the entry under the cursor, then moves on.
    ///
    /// A pending wrap reshuffles right before showing, so `Previous` still sees the old order.
    async fn tick(&mut self) {
        if std::mem::take(&mut self.state.wrapped) {
            self.playlist.reshuffle();
        }
        let len = self.playlist.len();
        if let Some(path) = self.playlist.get(self.state.cursor) {
            log::info!(
                "Setting wallpaper {}/{}: {}",
                self.state.cursor + 1,
                len,
                path.display()
            );
            if let Err(err) = self.setter.apply(path).await {
                log::warn!("{}: {err}", path.display());
            }
        } else {
            log::error!("Cursor {} out of range, starting over", self.state.cursor);
            self.state.cursor = len.saturating_sub(1);
        }

        self.state.advance(len);
    }
}
