//! External tools the release workflows shell out to
//!
//! - `command` - Process runner shared by every tool
//! - `secrets` - `age` decryption of files under the secrets directory
//! - `shell` - Capturing variables exported by a shell script
//! - `wrangler` - Deploy and build of the bundle
//! - `sentry` - Release registration and source map upload

pub mod command;
pub mod secrets;
pub mod sentry;
pub mod shell;
pub mod wrangler;

pub use secrets::{DecryptedSecret, Secrets};
pub use sentry::SentryCli;
pub use wrangler::Wrangler;

use crate::error::{ReleaseError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Deploy environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseMode {
    Staging,
    #[default]
    Production,
}

impl ReleaseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseMode::Staging => "staging",
            ReleaseMode::Production => "production",
        }
    }
}

impl fmt::Display for ReleaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseMode {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "staging" => Ok(ReleaseMode::Staging),
            "production" => Ok(ReleaseMode::Production),
            other => Err(ReleaseError::InvalidReleaseMode(other.to_string())),
        }
    }
}

/// Something that can build and deploy the bundle
pub trait DeployTarget {
    /// Deploy a built bundle to the given environment
    fn deploy(&self, mode: ReleaseMode, bundle: &Path) -> Result<()>;

    /// Build the bundle into `output_dir` (producing `index.js` and `index.js.map`)
    fn build(&self, output_dir: &Path) -> Result<()>;
}

/// Error-tracking service that records releases
pub trait ReleaseTracker {
    /// Register a release named `tag` and associate commits up to `commit`
    fn create_release(&self, commit: &str, tag: &str) -> Result<()>;

    /// Upload a bundle and its source map for the release `tag`
    fn upload_sourcemaps(&self, tag: &str, bundle: &Path, sourcemap: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_mode_from_str() {
        assert_eq!("staging".parse::<ReleaseMode>().unwrap(), ReleaseMode::Staging);
        assert_eq!(
            "production".parse::<ReleaseMode>().unwrap(),
            ReleaseMode::Production
        );
        assert!(matches!(
            "qa".parse::<ReleaseMode>(),
            Err(ReleaseError::InvalidReleaseMode(_))
        ));
        assert_eq!(ReleaseMode::default(), ReleaseMode::Production);
    }
}
