//! Release workflows
//!
//! Each workflow takes its collaborators as arguments so `main` only has to
//! parse arguments and wire up the real tools. Any failing step aborts the
//! workflow; later steps never run.

use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::{BumpKind, Version};
use crate::error::Result;
use crate::git::Repository;
use crate::release::ReleaseManager;
use crate::tools::{DeployTarget, ReleaseMode, ReleaseTracker};

/// Files the deploy tool leaves in its output directory
pub const BUILD_ARTIFACTS: &[&str] = &["index.js", "index.js.map"];

/// Directory the deploy tool builds into, relative to the project
pub const BUILD_DIR: &str = "dest";

/// Arguments for the deploy workflow
///
/// Mirrors the CLI arguments without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployArgs {
    pub release_mode: ReleaseMode,

    /// Bump applied before a production deploy
    pub bump: BumpKind,

    pub bundle_path: PathBuf,
    pub sourcemap_path: PathBuf,

    /// Remote the new tag is pushed to
    pub remote: String,
}

/// Result of a successful deploy
#[derive(Debug, Clone, PartialEq)]
pub struct DeployResult {
    pub mode: ReleaseMode,

    /// The released version; `None` for staging
    pub version: Option<Version>,

    /// The pushed tag; `None` for staging
    pub tag: Option<String>,
}

/// Apply a version bump
pub fn bump<R: Repository + ?Sized>(
    manager: &ReleaseManager<'_, R>,
    kind: BumpKind,
) -> Result<Version> {
    let version = manager.version_bump(kind)?;
    info!("Bumped {} version to {}", kind, version);
    Ok(version)
}

/// Latest released version, `0.0.0` when nothing has been released yet
pub fn print_version<R>(manager: &ReleaseManager<'_, R>) -> Result<Version>
where
    R: Repository + ?Sized,
{
    Ok(manager.latest_version()?.unwrap_or_default())
}

/// Deploy the bundle
///
/// Production deploys require a clean working tree and cut a new version
/// first: bump, push the tag, register the release with the tracker, deploy,
/// then upload source maps. Staging deploys only run the deploy tool.
pub fn deploy<R, D, T>(
    repo: &R,
    manager: &ReleaseManager<'_, R>,
    target: &D,
    tracker: &T,
    args: &DeployArgs,
) -> Result<DeployResult>
where
    R: Repository + ?Sized,
    D: DeployTarget + ?Sized,
    T: ReleaseTracker + ?Sized,
{
    if args.release_mode == ReleaseMode::Staging {
        target.deploy(args.release_mode, &args.bundle_path)?;
        return Ok(DeployResult {
            mode: args.release_mode,
            version: None,
            tag: None,
        });
    }

    repo.assert_clean()?;

    let version = manager.version_bump(args.bump)?;
    let tag = version.tag_name();
    let commit = repo.commit_hash()?;
    info!("Releasing {} at {}", tag, commit);

    repo.push(&args.remote, None, true)?;
    debug!("pushed tags to {}", args.remote);

    tracker.create_release(&commit, &tag)?;
    target.deploy(args.release_mode, &args.bundle_path)?;
    tracker.upload_sourcemaps(&tag, &args.bundle_path, &args.sourcemap_path)?;

    Ok(DeployResult {
        mode: args.release_mode,
        version: Some(version),
        tag: Some(tag),
    })
}

/// Build the bundle and collect its artifacts in `output_dir`
///
/// `node_modules` is linked into the project so the deploy tool can resolve
/// dependencies installed elsewhere.
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - Paths of the moved artifacts
/// * `Err` - If linking, building or moving fails
pub fn build<D: DeployTarget + ?Sized>(
    target: &D,
    project_dir: &Path,
    output_dir: &Path,
    node_modules: &Path,
) -> Result<Vec<PathBuf>> {
    link_node_modules(project_dir, node_modules)?;

    let build_dir = project_dir.join(BUILD_DIR);
    fs::create_dir_all(&build_dir)?;
    fs::create_dir_all(output_dir)?;

    target.build(&build_dir)?;

    let mut moved = Vec::with_capacity(BUILD_ARTIFACTS.len());
    for name in BUILD_ARTIFACTS {
        let dest = output_dir.join(name);
        move_file(&build_dir.join(name), &dest)?;
        moved.push(dest);
    }

    info!("Build artifacts in {}", output_dir.display());
    Ok(moved)
}

/// Replace `<project>/node_modules` with a symlink to `node_modules`
pub fn link_node_modules(project_dir: &Path, node_modules: &Path) -> Result<()> {
    let link = project_dir.join("node_modules");

    match fs::symlink_metadata(&link) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(&link)?,
        Ok(_) => fs::remove_file(&link)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    debug!("linking {} -> {}", link.display(), node_modules.display());
    symlink_dir(node_modules, &link)?;
    Ok(())
}

#[cfg(unix)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}

// rename fails across filesystems
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_err() {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}
