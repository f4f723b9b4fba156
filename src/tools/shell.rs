use crate::error::Result;
use crate::tools::command;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

/// Variables bash itself changes on every run
const SHELL_NOISE: &[&str] = &["_", "SHLVL", "OLDPWD", "PWD"];

/// Run a shell script and return the variables it exports.
///
/// Only variables that are new, or whose value differs from the current
/// process environment, are returned.
pub fn source_file(script: &Path) -> Result<HashMap<String, String>> {
    let mut cmd = Command::new("bash");
    cmd.arg("-c")
        .arg(r#"source "$1" && env"#)
        .arg("bash")
        .arg(script);

    let stdout = command::output("bash", &mut cmd)?;
    // `env` output is decoded lossily, so compare against the same view
    let current: HashMap<String, String> = std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect();

    Ok(parse_env_output(&stdout)
        .into_iter()
        .filter(|(key, _)| !SHELL_NOISE.contains(&key.as_str()))
        .filter(|(key, value)| current.get(key) != Some(value))
        .collect())
}

/// The process environment, skipping entries that are not valid UTF-8
pub fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Parse `env` output into key/value pairs.
///
/// A line without `=` continues the value of the previous variable.
pub fn parse_env_output(output: &str) -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = Vec::new();

    for line in output.lines() {
        match line.split_once('=') {
            Some((key, value)) if is_var_name(key) => {
                vars.push((key.to_string(), value.to_string()));
            }
            _ => {
                if let Some((_, value)) = vars.last_mut() {
                    value.push('\n');
                    value.push_str(line);
                }
            }
        }
    }

    vars
}

fn is_var_name(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with(|c: char| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
