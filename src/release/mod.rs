//! Release state machine over the current branch and latest version tag

pub mod manager;

pub use manager::ReleaseManager;
