//! The interruptible wait between two wallpapers.

use std::time::Instant;

use crate::backends::Setter;
use crate::runner::{Mode, Slideshow};

impl<S: Setter> Slideshow<'_, S> {
    /// Sleeps until the interval elapses or an event arrives, whichever is first.
    ///
    /// A received event is left in `state.pending`. While paused there is no deadline, only
    /// an event ends the wait.
    pub(super) async fn wait(&mut self) {
        let deadline = match self.state.mode {
            Mode::Running => Some(Instant::now() + self.interval),
            Mode::Paused => None,
        };

        loop {
            if let Some(event) = self.mailbox.try_recv() {
                log::debug!("Received {event:?}");
                self.state.pending = Some(event);
                return;
            }
            let nap = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return;
                    }
                    self.poll.min(deadline - now)
                }
                None => self.poll,
            };
            smol::Timer::after(nap).await;
        }
    }
}
