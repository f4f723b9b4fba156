use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string, with or without a leading `v` (e.g., "v1.2.3" -> Version(1,2,3))
    pub fn parse(input: &str) -> Result<Self> {
        let clean = input.strip_prefix('v').unwrap_or(input);

        let parts: Vec<&str> = clean.split('.').collect();
        if parts.len() != 3 {
            return Err(ReleaseError::parse(format!(
                "Invalid version format: '{}' - expected X.Y.Z",
                input
            )));
        }

        let component = |name: &str, raw: &str| {
            raw.parse::<u32>().map_err(|_| {
                ReleaseError::parse(format!("Invalid {} version in '{}': {}", name, input, raw))
            })
        };

        Ok(Version {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }

    /// Parse a version from a tag name
    pub fn from_tag(tag: &str) -> Result<Self> {
        Self::parse(tag)
    }

    /// Render the canonical string for the given mode
    pub fn to_string_mode(&self, mode: VersionMode) -> String {
        match mode {
            VersionMode::Major => self.major.to_string(),
            VersionMode::Minor => format!("{}.{}", self.major, self.minor),
            VersionMode::Patch => format!("{}.{}.{}", self.major, self.minor, self.patch),
        }
    }

    /// Tag name for this version (e.g., "v1.2.3")
    pub fn tag_name(&self) -> String {
        format!("v{}", self.to_string_mode(VersionMode::Patch))
    }

    /// Bump version according to bump kind. The receiver is left untouched.
    ///
    /// Fails with `VersionOverflow` when the bumped component is already `u32::MAX`.
    pub fn bump(&self, kind: BumpKind) -> Result<Self> {
        let overflow = || ReleaseError::VersionOverflow {
            version: *self,
            kind,
        };

        let bumped = match kind {
            BumpKind::Major => Version {
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            BumpKind::Minor => Version {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
            },
            BumpKind::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(overflow)?,
            },
        };

        Ok(bumped)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_mode(VersionMode::Patch))
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Which component a bump increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }

    /// Major and minor bumps cut a new release branch from trunk
    pub fn cuts_release_branch(&self) -> bool {
        matches!(self, BumpKind::Major | BumpKind::Minor)
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpKind {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            other => Err(ReleaseError::InvalidBumpKind(other.to_string())),
        }
    }
}

/// Canonical string form of a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionMode {
    Major,
    Minor,
    #[default]
    Patch,
}

impl FromStr for VersionMode {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(VersionMode::Major),
            "minor" => Ok(VersionMode::Minor),
            "patch" => Ok(VersionMode::Patch),
            other => Err(ReleaseError::InvalidMode(other.to_string())),
        }
    }
}
