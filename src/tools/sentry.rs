use crate::environment::SentryCredentials;
use crate::error::Result;
use crate::tools::{command, ReleaseTracker};
use log::info;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

/// `sentry-cli releases` scoped to one org and project
#[derive(Debug, Clone)]
pub struct SentryCli {
    bin: String,
    credentials: SentryCredentials,
}

impl SentryCli {
    pub fn new(bin: impl Into<String>, credentials: SentryCredentials) -> Self {
        SentryCli {
            bin: bin.into(),
            credentials,
        }
    }

    /// `sentry-cli releases --org <org> --project <project> <args>`
    pub fn releases_command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.bin);
        cmd.env("SENTRY_AUTH_TOKEN", &self.credentials.auth_token)
            .arg("releases")
            .arg("--org")
            .arg(&self.credentials.org)
            .arg("--project")
            .arg(&self.credentials.project)
            .args(args);
        cmd
    }

    fn releases<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        command::run("sentry-cli", &mut self.releases_command(args))
    }
}

impl ReleaseTracker for SentryCli {
    fn create_release(&self, commit: &str, tag: &str) -> Result<()> {
        info!("Registering release {} at {}", tag, commit);
        self.releases(["new", tag])?;

        let commit_spec = format!("origin@{}", commit);
        self.releases(["set-commits", "--commit", commit_spec.as_str(), tag])
    }

    fn upload_sourcemaps(&self, tag: &str, bundle: &Path, sourcemap: &Path) -> Result<()> {
        info!("Uploading source maps for {}", tag);
        self.releases([
            OsStr::new("files"),
            OsStr::new(tag),
            OsStr::new("upload-sourcemaps"),
            OsStr::new("--bundle"),
            bundle.as_os_str(),
            OsStr::new("--bundle-sourcemap"),
            sourcemap.as_os_str(),
        ])
    }
}
