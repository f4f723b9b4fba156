use crate::error::{ReleaseError, Result};
use crate::tools::command;
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// SSH key types usable as `age` identities, looked up as `~/.ssh/id_<type>`
pub const SUPPORTED_ID_TYPES: &[&str] = &["rsa", "ed25519"];

/// Decryption through the `age` binary using local SSH identities
#[derive(Debug, Clone)]
pub struct Secrets {
    identities: Vec<PathBuf>,
    age_bin: String,
}

/// A decrypted secret on disk; the file is removed when this is dropped
#[derive(Debug)]
pub struct DecryptedSecret {
    _dir: TempDir,
    path: PathBuf,
}

impl DecryptedSecret {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Secrets {
    pub fn new(identities: Vec<PathBuf>, age_bin: impl Into<String>) -> Self {
        Secrets {
            identities,
            age_bin: age_bin.into(),
        }
    }

    /// Use every supported identity present in `ssh_dir`
    ///
    /// # Returns
    /// * `Ok(Secrets)` - At least one identity exists
    /// * `Err(Secret)` - None exist; the message lists the searched paths
    pub fn from_ssh_dir(ssh_dir: &Path, age_bin: impl Into<String>) -> Result<Self> {
        let candidates: Vec<PathBuf> = SUPPORTED_ID_TYPES
            .iter()
            .map(|id_type| ssh_dir.join(format!("id_{}", id_type)))
            .collect();

        let existing: Vec<PathBuf> = candidates.iter().filter(|p| p.exists()).cloned().collect();

        if existing.is_empty() {
            return Err(ReleaseError::secret(format!(
                "No identities found. Searched:\n{}",
                format_paths(&candidates)
            )));
        }

        Ok(Self::new(existing, age_bin))
    }

    /// Use the identities in `~/.ssh`
    pub fn from_home(age_bin: impl Into<String>) -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReleaseError::secret("Cannot determine the home directory"))?;
        Self::from_ssh_dir(&home.join(".ssh"), age_bin)
    }

    pub fn identities(&self) -> &[PathBuf] {
        &self.identities
    }

    /// `age` arguments: `--identity <path>` per identity
    pub fn identity_args(&self) -> Vec<OsString> {
        self.identities
            .iter()
            .flat_map(|p| [OsString::from("--identity"), p.clone().into_os_string()])
            .collect()
    }

    /// Decrypt `path` into a private temporary file
    pub fn decrypt(&self, path: &Path) -> Result<DecryptedSecret> {
        let dir = tempfile::Builder::new().prefix("release-secret-").tempdir()?;
        let output = dir.path().join(
            path.file_stem()
                .map(|stem| stem.to_os_string())
                .unwrap_or_else(|| OsString::from("secret")),
        );

        debug!("decrypting {}", path.display());

        let mut cmd = Command::new(&self.age_bin);
        cmd.arg("--decrypt")
            .args(self.identity_args())
            .arg("--output")
            .arg(&output)
            .arg(path);
        command::output("age", &mut cmd)?;

        Ok(DecryptedSecret {
            _dir: dir,
            path: output,
        })
    }
}

/// Locate `<root>/<directory>/<name>.age`
pub fn find_secret(root: &Path, directory: &str, name: &str) -> Result<PathBuf> {
    let path = root.join(directory).join(format!("{}.age", name));

    if path.is_file() {
        Ok(path)
    } else {
        Err(ReleaseError::secret(format!(
            "secret {} not found at {}",
            name,
            path.display()
        )))
    }
}

/// Indented path list for error messages
pub fn format_paths<P: AsRef<Path>>(paths: &[P]) -> String {
    if paths.is_empty() {
        return "<none>".to_string();
    }

    paths
        .iter()
        .map(|p| format!(" - {}", p.as_ref().display()))
        .collect::<Vec<_>>()
        .join("\n")
}
