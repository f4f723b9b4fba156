//! Command-line workflows
//!
//! `orchestration` holds the workflows; this module resolves the loosely
//! positioned `deploy` operands into typed values.

pub mod orchestration;

pub use orchestration::{DeployArgs, DeployResult};

use crate::domain::BumpKind;
use crate::error::{ReleaseError, Result};
use crate::tools::ReleaseMode;
use std::path::PathBuf;

/// Typed `deploy` operands
#[derive(Debug, Clone, PartialEq)]
pub struct DeployOperands {
    pub release_mode: ReleaseMode,
    pub bump: BumpKind,
    pub bundle_path: PathBuf,
    pub sourcemap_path: PathBuf,
}

/// Resolve `[MODE] [BUMP] <BUNDLE> <SOURCEMAP>`
///
/// The last two operands are always the bundle and source map. Leading
/// operands are matched by value, so `deploy minor a.js a.js.map` works
/// without a mode. A missing mode falls back to `env_mode` (the `ENV`
/// variable), then to production; a missing bump is a patch.
pub fn resolve_deploy_operands(
    operands: &[String],
    env_mode: Option<&str>,
) -> Result<DeployOperands> {
    let (leading, paths) = match operands.len() {
        2..=4 => operands.split_at(operands.len() - 2),
        n => {
            return Err(ReleaseError::config(format!(
                "deploy takes 2 to 4 operands, got {}",
                n
            )))
        }
    };

    let mut release_mode = None;
    let mut bump = None;

    for operand in leading {
        if release_mode.is_none() && bump.is_none() {
            if let Ok(mode) = operand.parse::<ReleaseMode>() {
                release_mode = Some(mode);
                continue;
            }
        }
        if bump.is_some() {
            return Err(ReleaseError::config(format!(
                "unexpected deploy operand '{}'",
                operand
            )));
        }
        bump = Some(operand.parse::<BumpKind>()?);
    }

    let release_mode = match (release_mode, env_mode.map(str::trim)) {
        (Some(mode), _) => mode,
        (None, Some(env)) if !env.is_empty() => env.parse()?,
        (None, _) => ReleaseMode::default(),
    };

    Ok(DeployOperands {
        release_mode,
        bump: bump.unwrap_or(BumpKind::Patch),
        bundle_path: PathBuf::from(&paths[0]),
        sourcemap_path: PathBuf::from(&paths[1]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_all_operands() {
        let resolved =
            resolve_deploy_operands(&ops(&["staging", "minor", "a.js", "a.js.map"]), None)
                .unwrap();
        assert_eq!(resolved.release_mode, ReleaseMode::Staging);
        assert_eq!(resolved.bump, BumpKind::Minor);
        assert_eq!(resolved.bundle_path, PathBuf::from("a.js"));
        assert_eq!(resolved.sourcemap_path, PathBuf::from("a.js.map"));
    }

    #[test]
    fn test_defaults() {
        let resolved = resolve_deploy_operands(&ops(&["a.js", "a.js.map"]), None).unwrap();
        assert_eq!(resolved.release_mode, ReleaseMode::Production);
        assert_eq!(resolved.bump, BumpKind::Patch);
    }

    #[test]
    fn test_mode_from_env_only_when_not_given() {
        let from_env =
            resolve_deploy_operands(&ops(&["a.js", "a.js.map"]), Some("staging")).unwrap();
        assert_eq!(from_env.release_mode, ReleaseMode::Staging);

        let explicit = resolve_deploy_operands(
            &ops(&["production", "a.js", "a.js.map"]),
            Some("staging"),
        )
        .unwrap();
        assert_eq!(explicit.release_mode, ReleaseMode::Production);
    }

    #[test]
    fn test_bump_without_mode() {
        let resolved =
            resolve_deploy_operands(&ops(&["major", "a.js", "a.js.map"]), None).unwrap();
        assert_eq!(resolved.release_mode, ReleaseMode::Production);
        assert_eq!(resolved.bump, BumpKind::Major);
    }

    #[test]
    fn test_invalid_operands() {
        assert!(matches!(
            resolve_deploy_operands(&ops(&["qa", "a.js", "a.js.map"]), None),
            Err(ReleaseError::InvalidBumpKind(_))
        ));
        assert!(matches!(
            resolve_deploy_operands(&ops(&["a.js", "a.js.map"]), Some("qa")),
            Err(ReleaseError::InvalidReleaseMode(_))
        ));
        assert!(matches!(
            resolve_deploy_operands(&ops(&["minor", "staging", "a.js", "a.js.map"]), None),
            Err(ReleaseError::Config(_))
        ));
        assert!(resolve_deploy_operands(&ops(&["a.js"]), None).is_err());
    }
}
