//! Domain logic - pure release rules independent of git operations

pub mod branch;
pub mod tag;
pub mod version;

pub use branch::BranchPolicy;
pub use tag::{latest_version, parse_version_tag};
pub use version::{BumpKind, Version, VersionMode};
