//! Deploy environment assembly
//!
//! Credentials are decrypted from `age` files in the repository, sourced as
//! shell scripts, and read out of the resulting variable map.

use crate::config::Config;
use crate::error::{ReleaseError, Result};
use crate::tools::secrets::{find_secret, Secrets};
use crate::tools::{shell, SentryCli, Wrangler};
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const WRANGLER_BIN_VAR: &str = "WRANGLER_BIN";

/// Cloudflare account access for the deploy tool
#[derive(Clone, PartialEq, Eq)]
pub struct CloudflareCredentials {
    pub api_token: String,
    pub account_id: String,
}

impl CloudflareCredentials {
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        Ok(CloudflareCredentials {
            api_token: require(vars, "CLOUDFLARE_API_TOKEN")?,
            account_id: require(vars, "CLOUDFLARE_ACCOUNT_ID")?,
        })
    }
}

/// Sentry project access for the release tracker
#[derive(Clone, PartialEq, Eq)]
pub struct SentryCredentials {
    pub project: String,
    pub auth_token: String,
    pub org: String,
}

impl SentryCredentials {
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        Ok(SentryCredentials {
            project: require(vars, "SENTRY_PROJECT")?,
            auth_token: require(vars, "SENTRY_AUTH_TOKEN")?,
            org: require(vars, "SENTRY_ORG")?,
        })
    }
}

// Tokens stay out of logs and panic messages
impl std::fmt::Debug for CloudflareCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareCredentials")
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for SentryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryCredentials")
            .field("org", &self.org)
            .field("project", &self.project)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Read a required, non-blank variable
pub fn require(vars: &HashMap<String, String>, key: &str) -> Result<String> {
    vars.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ReleaseError::config(format!("missing {} env var", key)))
}

/// Process environment overlaid with the variables exported by a decrypted secret script
pub fn load_secret_vars(
    secrets: &Secrets,
    root: &Path,
    config: &Config,
    name: &str,
) -> Result<HashMap<String, String>> {
    let encrypted = find_secret(root, &config.secrets.directory, name)?;
    let decrypted = secrets.decrypt(&encrypted)?;
    let exported = shell::source_file(decrypted.path())?;

    debug!("{} exported {} variables", name, exported.len());

    let mut vars = shell::process_env();
    vars.extend(exported);
    Ok(vars)
}

/// Deploy tool binary: config value first, then `WRANGLER_BIN`
pub fn wrangler_bin(config: &Config) -> Result<PathBuf> {
    if let Some(bin) = &config.tools.wrangler {
        return Ok(bin.clone());
    }

    require(&shell::process_env(), WRANGLER_BIN_VAR).map(PathBuf::from)
}

/// Decrypt the deploy tool's config into `dest`.
///
/// The deploy tool resolves resources relative to its config file, so it has
/// to live in the project directory rather than a temp dir.
pub fn install_wrangler_toml(
    secrets: &Secrets,
    root: &Path,
    config: &Config,
    dest: &Path,
) -> Result<()> {
    let encrypted = find_secret(root, &config.secrets.directory, &config.secrets.wrangler_toml)?;
    let decrypted = secrets.decrypt(&encrypted)?;
    fs::copy(decrypted.path(), dest)?;
    Ok(())
}

/// Install the deploy tool config at `toml` and resolve the tool's binary
pub fn setup_wrangler(
    secrets: &Secrets,
    root: &Path,
    config: &Config,
    toml: &Path,
) -> Result<Wrangler> {
    let bin = wrangler_bin(config)?;
    install_wrangler_toml(secrets, root, config, toml)?;
    Ok(Wrangler::new(bin, toml))
}

/// Everything a deploy needs, assembled from config, env and secrets
#[derive(Debug)]
pub struct Environment {
    pub cloudflare: CloudflareCredentials,
    pub sentry: SentryCredentials,
    pub wrangler: Wrangler,
    pub sentry_cli: String,
}

impl Environment {
    /// Decrypt credentials and the deploy tool config for the repository at `root`
    pub fn assemble(root: &Path, config: &Config) -> Result<Self> {
        let secrets = Secrets::from_home(config.tools.age.clone())?;

        let cf_vars = load_secret_vars(&secrets, root, config, &config.secrets.cloudflare)?;
        let cloudflare = CloudflareCredentials::from_vars(&cf_vars)?;

        let sentry_vars = load_secret_vars(&secrets, root, config, &config.secrets.sentry)?;
        let sentry = SentryCredentials::from_vars(&sentry_vars)?;

        let wrangler = setup_wrangler(&secrets, root, config, &root.join("wrangler.toml"))?;

        info!(
            "Environment ready (sentry {}/{}, cloudflare account {})",
            sentry.org, sentry.project, cloudflare.account_id
        );

        Ok(Environment {
            wrangler: wrangler.with_credentials(cloudflare.clone()),
            cloudflare,
            sentry,
            sentry_cli: config.tools.sentry_cli.clone(),
        })
    }

    pub fn wrangler(&self) -> &Wrangler {
        &self.wrangler
    }

    pub fn sentry(&self) -> SentryCli {
        SentryCli::new(self.sentry_cli.clone(), self.sentry.clone())
    }
}
