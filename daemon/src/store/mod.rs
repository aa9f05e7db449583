//! Files shared between the daemon and the picker. Pure I/O, no policy.

pub mod identity;
pub mod lists;

pub use identity::IdentityFile;
