//! Maps [`Event`]s onto POSIX signals, both ways.

use nix::errno::Errno;
use nix::libc::c_int;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, kill, sigaction};
use nix::unistd::Pid;

use crate::control::{ControlError, Event, Mailbox};

pub const TOGGLE_SIGNAL: Signal = Signal::SIGUSR1;
pub const NEXT_SIGNAL: Signal = Signal::SIGUSR2;
/// There is no third user signal, so `SIGHUP` is borrowed.
pub const PREV_SIGNAL: Signal = Signal::SIGHUP;

const BINDINGS: [(Signal, Event); 3] = [
    (TOGGLE_SIGNAL, Event::TogglePause),
    (NEXT_SIGNAL, Event::Next),
    (PREV_SIGNAL, Event::Previous),
];

static MAILBOX: Mailbox = Mailbox::new();

fn event_for(signal: Signal) -> Option<Event> {
    BINDINGS
        .iter()
        .find(|(bound, _)| *bound == signal)
        .map(|(_, event)| *event)
}

fn signal_for(event: Event) -> Signal {
    BINDINGS
        .iter()
        .find(|(_, bound)| *bound == event)
        .map_or(TOGGLE_SIGNAL, |(signal, _)| *signal)
}

extern "C" fn on_signal(raw: c_int) {
    if let Some(event) = Signal::try_from(raw).ok().and_then(event_for) {
        MAILBOX.post(event);
    }
}

/// The control signals as a set.
///
/// A daemon is spawned with these blocked, so a command arriving before [`install`] waits
/// instead of killing it.
#[must_use]
pub fn control_set() -> SigSet {
    let mut set = SigSet::empty();
    for (signal, _) in BINDINGS {
        set.add(signal);
    }
    set
}

/// Routes the control signals of this process into the returned [`Mailbox`], then unblocks
/// them on the calling thread. Anything that arrived while blocked is posted right away.
///
/// # Errors
/// Returns [`ControlError::Install`] if any handler cannot be registered.
pub fn install() -> Result<&'static Mailbox, ControlError> {
    let action = SigAction::new(
        SigHandler::Handler(on_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for (signal, _) in BINDINGS {
        // SAFETY: `on_signal` only performs atomic operations.
        let previous = unsafe { sigaction(signal, &action) };
        previous.map_err(ControlError::Install)?;
    }
    control_set()
        .thread_unblock()
        .map_err(ControlError::Install)?;
    Ok(&MAILBOX)
}

/// Sends `event` to the daemon at `pid`. There is no acknowledgement.
///
/// # Errors
/// Returns [`ControlError::DaemonNotRunning`] if the process is gone, or
/// [`ControlError::Deliver`] for any other failure.
pub fn deliver(pid: Pid, event: Event) -> Result<(), ControlError> {
    kill(pid, signal_for(event)).map_err(|err| match err {
        Errno::ESRCH => ControlError::DaemonNotRunning,
        err => ControlError::Deliver(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;

    #[test]
    fn bindings_are_symmetric() {
        for event in [Event::TogglePause, Event::Next, Event::Previous] {
            assert_eq!(event_for(signal_for(event)), Some(event));
        }
        assert_eq!(event_for(Signal::SIGTERM), None);
    }

    // The mailbox is process-wide, so everything raised goes through this one test.
    #[test]
    fn signals_land_in_mailbox() {
        let mailbox = install().unwrap();
        raise(NEXT_SIGNAL).unwrap();
        raise(PREV_SIGNAL).unwrap();
        raise(TOGGLE_SIGNAL).unwrap();

        assert_eq!(mailbox.try_recv(), Some(Event::Next));
        assert_eq!(mailbox.try_recv(), Some(Event::Previous));
        assert_eq!(mailbox.try_recv(), Some(Event::TogglePause));
        assert_eq!(mailbox.try_recv(), None);

        for _ in 0..10 {
            raise(NEXT_SIGNAL).unwrap();
        }
        assert_eq!(mailbox.try_recv(), Some(Event::Next));
        assert_eq!(mailbox.try_recv(), None);

        // Held back while blocked, delivered once installed.
        control_set().thread_block().unwrap();
        raise(PREV_SIGNAL).unwrap();
        assert_eq!(mailbox.try_recv(), None);
        install().unwrap();
        assert_eq!(mailbox.try_recv(), Some(Event::Previous));
    }

    #[test]
    fn delivering_to_nobody() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = Pid::from_raw(child.id().try_into().unwrap());
        child.wait().unwrap();
        assert_eq!(deliver(pid, Event::Next), Err(ControlError::DaemonNotRunning));
    }
}
