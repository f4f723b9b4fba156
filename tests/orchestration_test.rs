// tests/orchestration_test.rs
use release_manager::cli::orchestration::{self, BUILD_ARTIFACTS};
use release_manager::cli::{DeployArgs, DeployResult};
use release_manager::domain::{BumpKind, Version};
use release_manager::git::mock::PushRecord;
use release_manager::git::MockRepository;
use release_manager::release::ReleaseManager;
use release_manager::tools::{DeployTarget, ReleaseMode, ReleaseTracker};
use release_manager::{ReleaseError, Result};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stands in for both the deploy tool and the release tracker, recording calls in order
#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl Recorder {
    fn failing_on(step: &'static str) -> Self {
        Recorder {
            events: RefCell::new(Vec::new()),
            fail_on: Some(step),
        }
    }

    fn record(&self, step: &'static str, event: String) -> Result<()> {
        if self.fail_on == Some(step) {
            return Err(ReleaseError::tool(step, Some(1), "simulated failure"));
        }
        self.events.borrow_mut().push(event);
        Ok(())
    }

    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl DeployTarget for Recorder {
    fn deploy(&self, mode: ReleaseMode, bundle: &Path) -> Result<()> {
        self.record("deploy", format!("deploy {} {}", mode, bundle.display()))
    }

    fn build(&self, output_dir: &Path) -> Result<()> {
        self.record("build", format!("build {}", output_dir.display()))?;
        for name in BUILD_ARTIFACTS {
            fs::write(output_dir.join(name), format!("// {}", name))?;
        }
        Ok(())
    }
}

impl ReleaseTracker for Recorder {
    fn create_release(&self, commit: &str, tag: &str) -> Result<()> {
        self.record("create_release", format!("release {} {}", tag, commit))
    }

    fn upload_sourcemaps(&self, tag: &str, bundle: &Path, sourcemap: &Path) -> Result<()> {
        self.record(
            "upload_sourcemaps",
            format!("upload {} {} {}", tag, bundle.display(), sourcemap.display()),
        )
    }
}

fn deploy_args(mode: ReleaseMode, bump: BumpKind) -> DeployArgs {
    DeployArgs {
        release_mode: mode,
        bump,
        bundle_path: PathBuf::from("dist/index.js"),
        sourcemap_path: PathBuf::from("dist/index.js.map"),
        remote: "origin".to_string(),
    }
}

fn release_branch_repo() -> MockRepository {
    let repo = MockRepository::with_state("release/0.3", &["v0.3.0"]);
    repo.set_head("abc123");
    repo
}

#[test]
fn test_production_deploy_order() {
    let repo = release_branch_repo();
    let manager = ReleaseManager::new(&repo);
    let recorder = Recorder::default();

    let result = orchestration::deploy(
        &repo,
        &manager,
        &recorder,
        &recorder,
        &deploy_args(ReleaseMode::Production, BumpKind::Patch),
    )
    .unwrap();

    assert_eq!(
        result,
        DeployResult {
            mode: ReleaseMode::Production,
            version: Some(Version::new(0, 3, 1)),
            tag: Some("v0.3.1".to_string()),
        }
    );
    assert_eq!(repo.created_tags(), vec!["v0.3.1"]);
    assert_eq!(
        repo.pushes(),
        vec![PushRecord {
            remote: "origin".to_string(),
            target: None,
            include_tags: true,
        }]
    );
    assert_eq!(
        recorder.events(),
        vec![
            "release v0.3.1 abc123",
            "deploy production dist/index.js",
            "upload v0.3.1 dist/index.js dist/index.js.map",
        ]
    );
}

#[test]
fn test_production_minor_deploy_from_trunk() {
    let repo = MockRepository::with_state("master", &["v0.3.1"]);
    let manager = ReleaseManager::new(&repo);
    let recorder = Recorder::default();

    let result = orchestration::deploy(
        &repo,
        &manager,
        &recorder,
        &recorder,
        &deploy_args(ReleaseMode::Production, BumpKind::Minor),
    )
    .unwrap();

    assert_eq!(result.tag.as_deref(), Some("v0.4.0"));
    assert_eq!(repo.created_branches(), vec!["release/0.4"]);
}

#[test]
fn test_staging_deploy_skips_tagging() {
    let repo = release_branch_repo();
    // A dirty tree does not matter for staging
    repo.set_dirty(&["src/app.ts"]);
    let manager = ReleaseManager::new(&repo);
    let recorder = Recorder::default();

    let result = orchestration::deploy(
        &repo,
        &manager,
        &recorder,
        &recorder,
        &deploy_args(ReleaseMode::Staging, BumpKind::Patch),
    )
    .unwrap();

    assert_eq!(result.version, None);
    assert_eq!(result.tag, None);
    assert!(repo.created_tags().is_empty());
    assert!(repo.pushes().is_empty());
    assert_eq!(recorder.events(), vec!["deploy staging dist/index.js"]);
}

#[test]
fn test_dirty_tree_aborts_before_tagging() {
    let repo = release_branch_repo();
    repo.set_dirty(&["src/app.ts", "package.json"]);
    let manager = ReleaseManager::new(&repo);
    let recorder = Recorder::default();

    let err = orchestration::deploy(
        &repo,
        &manager,
        &recorder,
        &recorder,
        &deploy_args(ReleaseMode::Production, BumpKind::Patch),
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Unstaged changes detected: src/app.ts, package.json"
    );
    assert!(repo.created_tags().is_empty());
    assert!(repo.pushes().is_empty());
    assert!(recorder.events().is_empty());
}

#[test]
fn test_policy_violation_aborts_before_push() {
    let repo = MockRepository::with_state("master", &["v0.3.0"]);
    let manager = ReleaseManager::new(&repo);
    let recorder = Recorder::default();

    let err = orchestration::deploy(
        &repo,
        &manager,
        &recorder,
        &recorder,
        &deploy_args(ReleaseMode::Production, BumpKind::Patch),
    )
    .unwrap_err();

    assert!(matches!(err, ReleaseError::WrongReleaseBranch { .. }));
    assert!(repo.pushes().is_empty());
    assert!(recorder.events().is_empty());
}

#[test]
fn test_push_failure_skips_release_steps() {
    let repo = release_branch_repo();
    repo.fail_pushes("permission denied");
    let manager = ReleaseManager::new(&repo);
    let recorder = Recorder::default();

    let err = orchestration::deploy(
        &repo,
        &manager,
        &recorder,
        &recorder,
        &deploy_args(ReleaseMode::Production, BumpKind::Patch),
    )
    .unwrap_err();

    assert!(err.to_string().contains("permission denied"));
    // The tag is local only
    assert_eq!(repo.created_tags(), vec!["v0.3.1"]);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_deploy_failure_skips_sourcemap_upload() {
    let repo = release_branch_repo();
    let manager = ReleaseManager::new(&repo);
    let recorder = Recorder::failing_on("deploy");

    let err = orchestration::deploy(
        &repo,
        &manager,
        &recorder,
        &recorder,
        &deploy_args(ReleaseMode::Production, BumpKind::Patch),
    )
    .unwrap_err();

    assert!(matches!(err, ReleaseError::Tool { .. }));
    assert_eq!(recorder.events(), vec!["release v0.3.1 abc123"]);
}

#[cfg(unix)]
#[test]
fn test_build_moves_artifacts() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("project");
    let modules = dir.path().join("cache/node_modules");
    let output = dir.path().join("out/bundle");
    fs::create_dir_all(&project).unwrap();
    fs::create_dir_all(&modules).unwrap();

    let recorder = Recorder::default();
    let moved = orchestration::build(&recorder, &project, &output, &modules).unwrap();

    assert_eq!(
        moved,
        vec![output.join("index.js"), output.join("index.js.map")]
    );
    assert_eq!(
        fs::read_to_string(output.join("index.js")).unwrap(),
        "// index.js"
    );
    assert!(!project.join("dest/index.js").exists());
    assert_eq!(fs::read_link(project.join("node_modules")).unwrap(), modules);
    assert_eq!(
        recorder.events(),
        vec![format!("build {}", project.join("dest").display())]
    );
}

#[cfg(unix)]
#[test]
fn test_build_failure_leaves_output_empty() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("project");
    let modules = dir.path().join("node_modules_cache");
    let output = dir.path().join("out");
    fs::create_dir_all(&project).unwrap();
    fs::create_dir_all(&modules).unwrap();

    let recorder = Recorder::failing_on("build");
    assert!(orchestration::build(&recorder, &project, &output, &modules).is_err());
    assert!(!output.join("index.js").exists());
}
