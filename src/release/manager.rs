use crate::domain::{latest_version, BranchPolicy, BumpKind, Version};
use crate::error::{ReleaseError, Result};
use crate::git::{Repository, TagSort};

/// Applies version bumps under the trunk / release-branch policy
///
/// Every bump reads live state from the repository, validates it, and only
/// then mutates (new release branch, new tag). A rejected bump leaves the
/// repository untouched.
pub struct ReleaseManager<'r, R: Repository + ?Sized> {
    repo: &'r R,
    policy: BranchPolicy,
}

impl<'r, R: Repository + ?Sized> ReleaseManager<'r, R> {
    /// Create a manager with the default `master` / `release/` policy
    pub fn new(repo: &'r R) -> Self {
        Self::with_policy(repo, BranchPolicy::default())
    }

    pub fn with_policy(repo: &'r R, policy: BranchPolicy) -> Self {
        ReleaseManager { repo, policy }
    }

    pub fn policy(&self) -> &BranchPolicy {
        &self.policy
    }

    pub fn repository(&self) -> &'r R {
        self.repo
    }

    /// Latest released version: the newest merged tag that looks like `vX.Y.Z`
    ///
    /// # Returns
    /// * `Ok(Some(Version))` - The latest version
    /// * `Ok(None)` - If no merged tag is a version tag
    /// * `Err` - If the tags cannot be read
    pub fn latest_version(&self) -> Result<Option<Version>> {
        let tags = self.repo.merged_tags(TagSort::CommitterDateDesc)?;
        Ok(latest_version(&tags))
    }

    /// Check if the given branch (or the current one) is a release branch
    pub fn is_release_branch(&self, branch: Option<&str>) -> Result<bool> {
        let branch = self.branch_or_current(branch)?;
        Ok(self.policy.is_release_branch(&branch))
    }

    /// Check if the given branch (or the current one) is the release branch for `version`
    pub fn is_release_branch_for_version(
        &self,
        version: &Version,
        branch: Option<&str>,
    ) -> Result<bool> {
        let branch = self.branch_or_current(branch)?;
        Ok(self.policy.is_release_branch_for(version, &branch))
    }

    /// Bump the latest version, tag it, and cut a release branch for major/minor bumps
    ///
    /// # Arguments
    /// * `kind` - Which component to bump
    ///
    /// # Returns
    /// * `Ok(Version)` - The new version, already tagged
    /// * `Err(NoVersionFound)` - If no version tag is merged into HEAD
    /// * `Err(WrongBranchForBump)` - Major/minor bump off trunk
    /// * `Err(WrongReleaseBranch)` - Patch bump off the current version's release branch
    /// * `Err(VersionOverflow)` - The bumped component is already `u32::MAX`
    /// * `Err(TagExists)` / `Err(Repository)` - If the tag or branch already exists or Git fails
    pub fn version_bump(&self, kind: BumpKind) -> Result<Version> {
        let branch = self.repo.current_branch()?;
        let current = self.latest_version()?.ok_or(ReleaseError::NoVersionFound)?;

        self.check_policy(kind, &current, &branch)?;
        let new_version = current.bump(kind)?;

        let tag = new_version.tag_name();
        if self.repo.tag_exists(&tag)? {
            return Err(ReleaseError::TagExists(tag));
        }

        let release_branch = if kind.cuts_release_branch() {
            let name = self.policy.release_branch_for(&new_version);
            if self.repo.branch_exists(&name)? {
                return Err(ReleaseError::repository(format!(
                    "Branch '{}' already exists",
                    name
                )));
            }
            Some(name)
        } else {
            None
        };

        // Nothing above mutates the repository
        if let Some(name) = release_branch {
            self.repo.create_and_switch_branch(&name)?;
        }
        self.repo.create_tag(&tag)?;

        Ok(new_version)
    }

    fn check_policy(&self, kind: BumpKind, current: &Version, branch: &str) -> Result<()> {
        match kind {
            BumpKind::Major | BumpKind::Minor => {
                if !self.policy.is_trunk(branch) {
                    return Err(ReleaseError::WrongBranchForBump {
                        kind,
                        expected: self.policy.trunk.clone(),
                        actual: branch.to_string(),
                    });
                }
            }
            BumpKind::Patch => {
                if !self.policy.is_release_branch_for(current, branch) {
                    return Err(ReleaseError::WrongReleaseBranch {
                        expected: self.policy.release_branch_for(current),
                        actual: branch.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn branch_or_current(&self, branch: Option<&str>) -> Result<String> {
        match branch {
            Some(branch) => Ok(branch.to_string()),
            None => self.repo.current_branch(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    #[test]
    fn test_release_branch() {
        let repo = MockRepository::new();
        let rm = ReleaseManager::new(&repo);

        assert!(rm.is_release_branch(Some("release/0.3")).unwrap());
        assert!(!rm.is_release_branch(Some("notrelease/1.2")).unwrap());
    }

    #[test]
    fn test_release_branch_defaults_to_current() {
        let repo = MockRepository::with_state("release/0.3", &["v0.3.0"]);
        let rm = ReleaseManager::new(&repo);

        assert!(rm.is_release_branch(None).unwrap());
        assert!(rm
            .is_release_branch_for_version(&Version::new(0, 3, 7), None)
            .unwrap());

        repo.set_branch("master");
        assert!(!rm.is_release_branch(None).unwrap());
    }

    #[test]
    fn test_release_branch_version() {
        let repo = MockRepository::new();
        let rm = ReleaseManager::new(&repo);

        assert!(rm
            .is_release_branch_for_version(&Version::new(0, 4, 1), Some("release/0.4"))
            .unwrap());
        assert!(!rm
            .is_release_branch_for_version(&Version::new(0, 5, 0), Some("release/0.4"))
            .unwrap());
    }

    #[test]
    fn test_latest_version_skips_non_version_tags() {
        let repo = MockRepository::with_state("master", &["v0.3.0", "not-a-tag", "v0.2.0"]);
        let rm = ReleaseManager::new(&repo);

        assert_eq!(rm.latest_version().unwrap(), Some(Version::new(0, 3, 0)));
    }

    #[test]
    fn test_latest_version_absent() {
        let repo = MockRepository::with_state("master", &["nightly"]);
        let rm = ReleaseManager::new(&repo);

        assert_eq!(rm.latest_version().unwrap(), None);
    }

    #[test]
    fn test_bump_without_version_tag_fails() {
        let repo = MockRepository::with_state("master", &["nightly"]);
        let rm = ReleaseManager::new(&repo);

        assert!(matches!(
            rm.version_bump(BumpKind::Minor),
            Err(ReleaseError::NoVersionFound)
        ));
        assert!(repo.created_tags().is_empty());
        assert!(repo.created_branches().is_empty());
    }

    #[test]
    fn test_custom_policy_trunk() {
        let repo = MockRepository::with_state("main", &["v2.1.4"]);
        let rm = ReleaseManager::with_policy(&repo, BranchPolicy::new("main", "rel/"));

        assert_eq!(rm.version_bump(BumpKind::Minor).unwrap(), Version::new(2, 2, 0));
        assert_eq!(repo.created_branches(), vec!["rel/2.2"]);
        assert_eq!(repo.created_tags(), vec!["v2.2.0"]);
    }
}
