use thiserror::Error;

use crate::domain::{BumpKind, Version};

/// Unified error type for release-manager operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Version parsing error: {0}")]
    Parse(String),

    #[error("Invalid bump kind: '{0}' (expected major, minor or patch)")]
    InvalidBumpKind(String),

    #[error("Invalid version mode: '{0}' (expected major, minor or patch)")]
    InvalidMode(String),

    #[error("Invalid release mode: '{0}' (expected staging or production)")]
    InvalidReleaseMode(String),

    #[error("No version tag found in the tags merged into HEAD")]
    NoVersionFound,

    #[error("Cannot apply a {kind} bump to {version}: the {kind} component is already at its maximum")]
    VersionOverflow { version: Version, kind: BumpKind },

    #[error("Need to be on '{expected}' for a {kind} bump (currently on '{actual}')")]
    WrongBranchForBump {
        kind: BumpKind,
        expected: String,
        actual: String,
    },

    #[error("Need to be on release branch '{expected}' for a patch bump (currently on '{actual}')")]
    WrongReleaseBranch { expected: String, actual: String },

    #[error("Unstaged changes detected: {}", .paths.join(", "))]
    DirtyWorkingTree { paths: Vec<String> },

    #[error("Tag '{0}' already exists")]
    TagExists(String),

    #[error("Git operation failed: {0}")]
    Repository(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Secret error: {0}")]
    Secret(String),

    #[error("{tool} failed{}: {stderr}", .code.map(|c| format!(" with exit code {}", c)).unwrap_or_default())]
    Tool {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-manager
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl From<git2::Error> for ReleaseError {
    fn from(err: git2::Error) -> Self {
        ReleaseError::Repository(err.message().to_string())
    }
}

impl ReleaseError {
    /// Create a version parsing error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        ReleaseError::Parse(msg.into())
    }

    /// Create a repository error with context
    pub fn repository(msg: impl Into<String>) -> Self {
        ReleaseError::Repository(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a secret error with context
    pub fn secret(msg: impl Into<String>) -> Self {
        ReleaseError::Secret(msg.into())
    }

    /// Create an external tool error
    pub fn tool(tool: impl Into<String>, code: Option<i32>, stderr: impl Into<String>) -> Self {
        ReleaseError::Tool {
            tool: tool.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// True for branch policy violations, which leave the repository untouched
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            ReleaseError::WrongBranchForBump { .. } | ReleaseError::WrongReleaseBranch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleaseError::config("missing SENTRY_ORG env var");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing SENTRY_ORG env var"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_git2() {
        let err: ReleaseError = git2::Error::from_str("reference not found").into();
        assert_eq!(err.to_string(), "Git operation failed: reference not found");
    }

    #[test]
    fn test_wrong_branch_message_names_both_branches() {
        let err = ReleaseError::WrongBranchForBump {
            kind: BumpKind::Minor,
            expected: "master".to_string(),
            actual: "release/0.3".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("minor"));
        assert!(msg.contains("master"));
        assert!(msg.contains("release/0.3"));
        assert!(err.is_policy_violation());
    }

    #[test]
    fn test_wrong_release_branch_message() {
        let err = ReleaseError::WrongReleaseBranch {
            expected: "release/0.3".to_string(),
            actual: "master".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Need to be on release branch 'release/0.3' for a patch bump (currently on 'master')"
        );
        assert!(err.is_policy_violation());
    }

    #[test]
    fn test_dirty_tree_lists_paths() {
        let err = ReleaseError::DirtyWorkingTree {
            paths: vec!["src/index.ts".to_string(), "package.json".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unstaged changes detected: src/index.ts, package.json"
        );
        assert!(!err.is_policy_violation());
    }

    #[test]
    fn test_version_overflow_message() {
        let err = ReleaseError::VersionOverflow {
            version: Version::new(u32::MAX, 2, 0),
            kind: BumpKind::Major,
        };
        assert_eq!(
            err.to_string(),
            "Cannot apply a major bump to 4294967295.2.0: the major component is already at its maximum"
        );
        assert!(!err.is_policy_violation());
    }

    #[test]
    fn test_tool_error_with_and_without_code() {
        let with_code = ReleaseError::tool("wrangler", Some(2), "no such env");
        assert_eq!(with_code.to_string(), "wrangler failed with exit code 2: no such env");

        let killed = ReleaseError::tool("age", None, "terminated by signal");
        assert_eq!(killed.to_string(), "age failed: terminated by signal");
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ReleaseError::parse("x"), "Version parsing error"),
            (ReleaseError::repository("x"), "Git operation failed"),
            (ReleaseError::config("x"), "Configuration error"),
            (ReleaseError::secret("x"), "Secret error"),
            (ReleaseError::TagExists("v1.0.0".into()), "Tag 'v1.0.0'"),
            (ReleaseError::NoVersionFound, "No version tag found"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
