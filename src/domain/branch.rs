use crate::domain::version::{Version, VersionMode};

pub const DEFAULT_TRUNK: &str = "master";
pub const RELEASE_PREFIX: &str = "release/";

/// Branch naming rules for cutting and patching releases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPolicy {
    pub trunk: String,
    pub release_prefix: String,
}

impl BranchPolicy {
    pub fn new(trunk: impl Into<String>, release_prefix: impl Into<String>) -> Self {
        BranchPolicy {
            trunk: trunk.into(),
            release_prefix: release_prefix.into(),
        }
    }

    pub fn is_trunk(&self, branch: &str) -> bool {
        branch == self.trunk
    }

    /// Check if a branch is any release branch
    pub fn is_release_branch(&self, branch: &str) -> bool {
        branch.starts_with(&self.release_prefix)
    }

    /// Name of the release branch for a version's minor line (e.g., 0.4.1 -> "release/0.4")
    pub fn release_branch_for(&self, version: &Version) -> String {
        format!(
            "{}{}",
            self.release_prefix,
            version.to_string_mode(VersionMode::Minor)
        )
    }

    pub fn is_release_branch_for(&self, version: &Version, branch: &str) -> bool {
        branch == self.release_branch_for(version)
    }
}

impl Default for BranchPolicy {
    fn default() -> Self {
        BranchPolicy::new(DEFAULT_TRUNK, RELEASE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = BranchPolicy::default();
        assert!(policy.is_trunk("master"));
        assert!(!policy.is_trunk("main"));
    }

    #[test]
    fn test_release_branch_prefix() {
        let policy = BranchPolicy::default();
        assert!(policy.is_release_branch("release/0.3"));
        assert!(!policy.is_release_branch("notrelease/1.2"));
        assert!(!policy.is_release_branch("master"));
    }

    #[test]
    fn test_release_branch_for_version_ignores_patch() {
        let policy = BranchPolicy::default();
        assert_eq!(policy.release_branch_for(&Version::new(0, 4, 1)), "release/0.4");
        assert!(policy.is_release_branch_for(&Version::new(0, 4, 1), "release/0.4"));
        assert!(!policy.is_release_branch_for(&Version::new(0, 5, 0), "release/0.4"));
    }

    #[test]
    fn test_custom_policy() {
        let policy = BranchPolicy::new("trunk", "rel-");
        assert!(policy.is_trunk("trunk"));
        assert_eq!(policy.release_branch_for(&Version::new(2, 1, 0)), "rel-2.1");
    }
}
