use crate::environment::CloudflareCredentials;
use crate::error::Result;
use crate::tools::{command, DeployTarget, ReleaseMode};
use log::info;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The `wrangler` deploy tool, run from the directory holding its config
#[derive(Debug, Clone)]
pub struct Wrangler {
    bin: PathBuf,
    toml: PathBuf,
    credentials: Option<CloudflareCredentials>,
}

impl Wrangler {
    pub fn new(bin: impl Into<PathBuf>, toml: impl Into<PathBuf>) -> Self {
        Wrangler {
            bin: bin.into(),
            toml: toml.into(),
            credentials: None,
        }
    }

    /// Pass Cloudflare credentials to every invocation
    pub fn with_credentials(mut self, credentials: CloudflareCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Directory the tool runs in
    pub fn working_dir(&self) -> &Path {
        self.toml
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Build the command for `args` without running it
    pub fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.bin);
        cmd.args(args).current_dir(self.working_dir());

        if let Some(creds) = &self.credentials {
            cmd.env("CLOUDFLARE_API_TOKEN", &creds.api_token)
                .env("CLOUDFLARE_ACCOUNT_ID", &creds.account_id);
        }

        cmd
    }

    pub fn deploy_command(&self, mode: ReleaseMode, bundle: &Path) -> Command {
        let mut cmd = self.command(["deploy", "--env", mode.as_str(), "--no-bundle"]);
        cmd.arg(bundle);
        cmd
    }

    pub fn build_command(&self, output_dir: &Path) -> Command {
        let mut cmd = self.command(["deploy", "--dry-run", "--outdir"]);
        cmd.arg(output_dir);
        cmd
    }
}

impl DeployTarget for Wrangler {
    fn deploy(&self, mode: ReleaseMode, bundle: &Path) -> Result<()> {
        info!("Deploying {} to {}", bundle.display(), mode);
        command::run("wrangler", &mut self.deploy_command(mode, bundle))
    }

    fn build(&self, output_dir: &Path) -> Result<()> {
        info!("Building bundle into {}", output_dir.display());
        command::run("wrangler", &mut self.build_command(output_dir))
    }
}
