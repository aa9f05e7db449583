use papyrd::{DaemonError, LOCATIONS};

fn main() -> Result<(), DaemonError> {
    papyrd::run_loop(&LOCATIONS).inspect_err(|err| eprintln!("{err}"))
}
