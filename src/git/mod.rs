//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the handful of
//! source-control queries and mutations the release manager needs,
//! allowing for a real repository and a mock implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation that records mutations
//!
//! # Usage
//!
//! Code should depend on the [Repository] trait rather than concrete
//! implementations so that release rules can be tested without a repository
//! on disk.
//!
//! ```rust
//! # use release_manager::git::{Repository, TagSort};
//! # fn example<R: Repository>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! let branch = repo.current_branch()?;
//! let tags = repo.merged_tags(TagSort::CommitterDateDesc)?;
//! println!("{} has {} merged tags", branch, tags.len());
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Ordering for [Repository::merged_tags]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagSort {
    /// Newest commit first (`--sort=-committerdate`)
    #[default]
    CommitterDateDesc,
    /// Oldest commit first (`--sort=committerdate`)
    CommitterDateAsc,
    /// Alphabetical by tag name
    Name,
}

/// Source-control operations used by release management
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync`.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to [crate::error::ReleaseError]
/// variants. Nothing is cached: every call reads live repository state.
pub trait Repository: Send + Sync {
    /// Name of the checked-out branch
    ///
    /// # Returns
    /// * `Ok(String)` - Short branch name (e.g., "master", "release/0.3"), or `"HEAD"` when detached
    /// * `Err` - If HEAD cannot be resolved (e.g., unborn branch)
    fn current_branch(&self) -> Result<String>;

    /// Tags whose commit is HEAD or one of its ancestors
    ///
    /// # Arguments
    /// * `sort` - Ordering of the returned names
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Tag names in the requested order
    /// * `Err` - If there's a Git error
    fn merged_tags(&self, sort: TagSort) -> Result<Vec<String>>;

    /// Check whether a tag with this name exists anywhere in the repository
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Check whether a local branch with this name exists
    fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Create a lightweight tag at HEAD
    ///
    /// # Returns
    /// * `Ok(())` - Success
    /// * `Err(TagExists)` - If the tag already exists
    /// * `Err(Repository)` - On any other Git error
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Create a branch at HEAD and switch to it
    ///
    /// # Returns
    /// * `Ok(())` - Success, HEAD now points at the new branch
    /// * `Err(Repository)` - If the branch already exists or Git fails
    fn create_and_switch_branch(&self, name: &str) -> Result<()>;

    /// Full hex id of the HEAD commit
    fn commit_hash(&self) -> Result<String>;

    /// Fail with `DirtyWorkingTree` when tracked files have staged or unstaged changes
    fn assert_clean(&self) -> Result<()>;

    /// Push to a remote
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    /// * `target` - Branch to push; the current branch is pushed when neither a
    ///   target nor tags are requested
    /// * `include_tags` - Push every local tag as well
    ///
    /// # Returns
    /// * `Ok(())` - Success
    /// * `Err(Repository)` - On any failure; there is no retry
    fn push(&self, remote: &str, target: Option<&str>, include_tags: bool) -> Result<()>;
}
