use crate::error::{ReleaseError, Result};
use crate::git::{Repository, TagSort};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A push recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRecord {
    pub remote: String,
    pub target: Option<String>,
    pub include_tags: bool,
}

#[derive(Debug)]
struct MockState {
    branch: String,
    branches: Vec<String>,
    merged_tags: Vec<String>,
    unmerged_tags: Vec<String>,
    head: String,
    dirty_paths: Vec<String>,
    push_failure: Option<String>,
    created_tags: Vec<String>,
    created_branches: Vec<String>,
    pushes: Vec<PushRecord>,
}

/// Mock repository for testing without actual git operations
///
/// Merged tags are held newest first. Mutations are recorded so tests can
/// assert that a rejected bump left the repository alone.
pub struct MockRepository {
    state: Mutex<MockState>,
}

impl MockRepository {
    /// Create a mock on `master` with no tags
    pub fn new() -> Self {
        MockRepository {
            state: Mutex::new(MockState {
                branch: "master".to_string(),
                branches: vec!["master".to_string()],
                merged_tags: Vec::new(),
                unmerged_tags: Vec::new(),
                head: "0".repeat(40),
                dirty_paths: Vec::new(),
                push_failure: None,
                created_tags: Vec::new(),
                created_branches: Vec::new(),
                pushes: Vec::new(),
            }),
        }
    }

    /// Create a mock checked out on `branch` with the given newest-first merged tags
    pub fn with_state<S: AsRef<str>>(branch: &str, merged_tags: &[S]) -> Self {
        let repo = Self::new();
        repo.set_branch(branch);
        repo.set_merged_tags(merged_tags);
        repo
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch the checked-out branch, creating it if needed
    pub fn set_branch(&self, branch: &str) {
        let mut state = self.state();
        if !state.branches.iter().any(|b| b == branch) {
            state.branches.push(branch.to_string());
        }
        state.branch = branch.to_string();
    }

    /// Replace the newest-first list of tags merged into HEAD
    pub fn set_merged_tags<S: AsRef<str>>(&self, tags: &[S]) {
        self.state().merged_tags = tags.iter().map(|t| t.as_ref().to_string()).collect();
    }

    /// Add a tag that exists but is not reachable from HEAD
    pub fn add_unmerged_tag(&self, tag: impl Into<String>) {
        self.state().unmerged_tags.push(tag.into());
    }

    /// Add a local branch without switching to it
    pub fn add_branch(&self, branch: impl Into<String>) {
        self.state().branches.push(branch.into());
    }

    pub fn set_head(&self, hash: impl Into<String>) {
        self.state().head = hash.into();
    }

    /// Mark tracked paths as modified
    pub fn set_dirty<S: AsRef<str>>(&self, paths: &[S]) {
        self.state().dirty_paths = paths.iter().map(|p| p.as_ref().to_string()).collect();
    }

    /// Make every subsequent push fail with this message
    pub fn fail_pushes(&self, message: impl Into<String>) {
        self.state().push_failure = Some(message.into());
    }

    /// Tags created through [Repository::create_tag], oldest first
    pub fn created_tags(&self) -> Vec<String> {
        self.state().created_tags.clone()
    }

    /// Branches created through [Repository::create_and_switch_branch], oldest first
    pub fn created_branches(&self) -> Vec<String> {
        self.state().created_branches.clone()
    }

    pub fn pushes(&self) -> Vec<PushRecord> {
        self.state().pushes.clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.state().branch.clone())
    }

    fn merged_tags(&self, sort: TagSort) -> Result<Vec<String>> {
        let mut tags = self.state().merged_tags.clone();
        match sort {
            TagSort::CommitterDateDesc => {}
            TagSort::CommitterDateAsc => tags.reverse(),
            TagSort::Name => tags.sort(),
        }
        Ok(tags)
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        let state = self.state();
        Ok(state.merged_tags.iter().any(|t| t == name)
            || state.unmerged_tags.iter().any(|t| t == name))
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().branches.iter().any(|b| b == name))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        if self.tag_exists(name)? {
            return Err(ReleaseError::TagExists(name.to_string()));
        }

        let mut state = self.state();
        state.created_tags.push(name.to_string());
        // A tag at HEAD is the newest merged tag
        state.merged_tags.insert(0, name.to_string());
        Ok(())
    }

    fn create_and_switch_branch(&self, name: &str) -> Result<()> {
        if self.branch_exists(name)? {
            return Err(ReleaseError::repository(format!(
                "Branch '{}' already exists",
                name
            )));
        }

        let mut state = self.state();
        state.branches.push(name.to_string());
        state.created_branches.push(name.to_string());
        state.branch = name.to_string();
        Ok(())
    }

    fn commit_hash(&self) -> Result<String> {
        Ok(self.state().head.clone())
    }

    fn assert_clean(&self) -> Result<()> {
        let state = self.state();
        if state.dirty_paths.is_empty() {
            Ok(())
        } else {
            Err(ReleaseError::DirtyWorkingTree {
                paths: state.dirty_paths.clone(),
            })
        }
    }

    fn push(&self, remote: &str, target: Option<&str>, include_tags: bool) -> Result<()> {
        let mut state = self.state();
        if let Some(message) = &state.push_failure {
            return Err(ReleaseError::repository(format!(
                "Push to '{}' failed: {}",
                remote, message
            )));
        }

        state.pushes.push(PushRecord {
            remote: remote.to_string(),
            target: target.map(str::to_string),
            include_tags,
        });
        Ok(())
    }
}
