use crate::error::{ReleaseError, Result};
use log::debug;
use std::process::Command;

/// Render a command line for logs
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command with inherited stdio.
///
/// # Arguments
/// * `tool` - Short tool name used in errors (e.g., "wrangler")
/// * `cmd` - Fully configured command
///
/// # Returns
/// * `Ok(())` if the command exits with code 0
/// * `Err(Tool)` if it cannot be started or exits non-zero
pub fn run(tool: &str, cmd: &mut Command) -> Result<()> {
    debug!("running {}", describe(cmd));

    let status = cmd
        .status()
        .map_err(|e| ReleaseError::tool(tool, None, format!("cannot start: {}", e)))?;

    if !status.success() {
        return Err(ReleaseError::tool(
            tool,
            status.code(),
            "command reported failure, see its output above",
        ));
    }

    Ok(())
}

/// Run a command and capture its stdout.
///
/// Stderr is captured too and becomes part of the error on failure.
pub fn output(tool: &str, cmd: &mut Command) -> Result<String> {
    debug!("running {}", describe(cmd));

    let output = cmd
        .output()
        .map_err(|e| ReleaseError::tool(tool, None, format!("cannot start: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReleaseError::tool(tool, output.status.code(), stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
