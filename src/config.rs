use crate::domain::branch::{BranchPolicy, DEFAULT_TRUNK, RELEASE_PREFIX};
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the repository root
pub const CONFIG_FILE_NAME: &str = "release.toml";

/// File name looked up in the user config directory
pub const USER_CONFIG_FILE_NAME: &str = "release-manager.toml";

/// Represents the complete configuration for release-manager.
///
/// Contains the branch policy, the remote to publish to, external tool binaries,
/// and the names of the encrypted secrets used during deploys.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,
}

fn default_trunk() -> String {
    DEFAULT_TRUNK.to_string()
}

fn default_release_prefix() -> String {
    RELEASE_PREFIX.to_string()
}

/// Trunk and release branch naming.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_trunk")]
    pub trunk: String,

    #[serde(default = "default_release_prefix")]
    pub release_prefix: String,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            trunk: default_trunk(),
            release_prefix: default_release_prefix(),
        }
    }
}

impl BranchesConfig {
    pub fn policy(&self) -> BranchPolicy {
        BranchPolicy::new(self.trunk.clone(), self.release_prefix.clone())
    }
}

fn default_remote_name() -> String {
    "origin".to_string()
}

/// Remote that release tags are pushed to.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_name")]
    pub name: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            name: default_remote_name(),
        }
    }
}

fn default_age() -> String {
    "age".to_string()
}

fn default_sentry_cli() -> String {
    "sentry-cli".to_string()
}

/// External binaries. `wrangler` falls back to the `WRANGLER_BIN` env var when unset.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolsConfig {
    #[serde(default = "default_age")]
    pub age: String,

    #[serde(default = "default_sentry_cli")]
    pub sentry_cli: String,

    #[serde(default)]
    pub wrangler: Option<PathBuf>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            age: default_age(),
            sentry_cli: default_sentry_cli(),
            wrangler: None,
        }
    }
}

fn default_secrets_dir() -> String {
    "secrets".to_string()
}

fn default_cloudflare_secret() -> String {
    "cf_authn.sh".to_string()
}

fn default_sentry_secret() -> String {
    "sentry_authn.sh".to_string()
}

fn default_wrangler_toml_secret() -> String {
    "wrangler.toml".to_string()
}

/// Names of the `age`-encrypted files under the secrets directory (without `.age`).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SecretsConfig {
    #[serde(default = "default_secrets_dir")]
    pub directory: String,

    #[serde(default = "default_cloudflare_secret")]
    pub cloudflare: String,

    #[serde(default = "default_sentry_secret")]
    pub sentry: String,

    #[serde(default = "default_wrangler_toml_secret")]
    pub wrangler_toml: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        SecretsConfig {
            directory: default_secrets_dir(),
            cloudflare: default_cloudflare_secret(),
            sentry: default_sentry_secret(),
            wrangler_toml: default_wrangler_toml_secret(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in the repository root
/// 3. `release-manager.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `repo_root` - Working-tree root searched for `release.toml`
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err(Config)` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, repo_root: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_path {
        return read_config(path);
    }

    if let Some(root) = repo_root {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() {
            return read_config(&path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join(USER_CONFIG_FILE_NAME);
        if path.exists() {
            return read_config(&path);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path).map_err(|e| {
        ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;

    toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("Cannot parse {}: {}", path.display(), e)))
}
