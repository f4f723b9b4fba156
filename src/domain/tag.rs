use crate::domain::version::Version;
use regex::Regex;
use std::sync::OnceLock;

/// Pattern a tag must match to count as a released version
pub const VERSION_TAG_PATTERN: &str = r"^v([0-9]+)\.([0-9]+)\.([0-9]+)$";

fn version_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_TAG_PATTERN).expect("version tag pattern is valid"))
}

/// Recognise a version tag such as "v1.2.3".
///
/// Anything that does not match the pattern, or whose components overflow,
/// is not a version tag and yields `None`.
pub fn parse_version_tag(tag: &str) -> Option<Version> {
    let captures = version_tag_regex().captures(tag)?;

    let major = captures[1].parse::<u32>().ok()?;
    let minor = captures[2].parse::<u32>().ok()?;
    let patch = captures[3].parse::<u32>().ok()?;

    Some(Version::new(major, minor, patch))
}

/// Latest released version from a newest-first tag list: the first version tag wins.
pub fn latest_version<S: AsRef<str>>(tags: &[S]) -> Option<Version> {
    tags.iter().find_map(|tag| parse_version_tag(tag.as_ref()))
}
