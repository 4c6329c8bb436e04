// External tool invocation - stdin/stdout filters such as lessc and esbuild

use crate::error::CompileError;
use std::io::Write;
use std::process::{Command, Stdio};

/// Pipe `input` through a command and return its stdout
pub fn run_filter(
    mut cmd: Command,
    tool: &'static str,
    input: &str,
) -> Result<String, CompileError> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|error| CompileError::ToolSpawn { tool, error })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .map_err(|error| CompileError::ToolSpawn { tool, error })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|error| CompileError::ToolSpawn { tool, error })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CompileError::ToolFailed {
            tool,
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
