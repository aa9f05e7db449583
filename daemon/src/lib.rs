pub mod backends;
pub mod config;
pub mod control;
pub mod daemon;
pub mod playlist;
pub mod runner;
pub mod store;
pub mod supervisor;

pub use daemon::{DaemonError, LOCATIONS, Locations, run_loop};
pub use runner::Slideshow;
pub use supervisor::Supervisor;
