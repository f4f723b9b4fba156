//! Formatting for terminal output.
//!
//! The `format_*` functions build the text and are tested directly; the
//! `display_*` functions only print it.

use console::style;

use crate::cli::DeployResult;
use crate::domain::{BumpKind, Version};
use crate::tools::ReleaseMode;

pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").for_stderr().red().bold(), message)
}

pub fn format_success(message: &str) -> String {
    format!("{} {}", style("✓").green(), message)
}

pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

pub fn format_warning(message: &str) -> String {
    format!("{} {}", style("⚠ WARNING:").for_stderr().yellow(), message)
}

/// "minor bump: v0.3.0 -> v0.4.0"
pub fn format_version_change(kind: BumpKind, from: Option<&Version>, to: &Version) -> String {
    match from {
        Some(from) => format!(
            "{} bump: {} -> {}",
            kind,
            style(from.tag_name()).red(),
            style(to.tag_name()).green()
        ),
        None => format!("{} bump: {}", kind, style(to.tag_name()).green()),
    }
}

/// One-line summary of a finished deploy
pub fn format_deploy_result(result: &DeployResult) -> String {
    match (&result.mode, &result.tag) {
        (ReleaseMode::Production, Some(tag)) => {
            format!("Deployed {} to production", style(tag).green())
        }
        (mode, _) => format!("Deployed to {}", style(mode).cyan()),
    }
}

/// Print an error message in red to stderr.
pub fn display_error(message: &str) {
    eprintln!("{}", format_error(message));
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{}", format_success(message));
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{}", format_status(message));
}

pub fn display_warning(message: &str) {
    eprintln!("{}", format_warning(message));
}
