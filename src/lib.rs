pub mod cli;
pub mod config;
pub mod domain;
pub mod environment;
pub mod error;
pub mod git;
pub mod release;
pub mod tools;
pub mod ui;

pub use error::{ReleaseError, Result};
