// esbuild integration - transforms the artifact down to an older ECMAScript target

use crate::error::CompileError;
use crate::tool::run_filter;
use std::path::PathBuf;
use std::process::Command;
use which::which;

/// ECMAScript version the artifact is lowered to
pub const TARGET: &str = "es2015";

/// esbuild transpiler for assembled plugin scripts
///
/// The artifact is a classic script, not a module, so esbuild runs in
/// transform mode: source on stdin, result on stdout, no bundling.
pub struct EsbuildTranspiler {
    /// Path to the esbuild executable
    esbuild_path: PathBuf,
}

impl EsbuildTranspiler {
    /// Create a new transpiler by detecting esbuild
    ///
    /// # Errors
    ///
    /// Returns `CompileError::ToolNotFound` if esbuild is not installed
    /// or not in PATH.
    pub fn new() -> Result<Self, CompileError> {
        let esbuild_path = which("esbuild").map_err(|_| CompileError::ToolNotFound {
            tool: "esbuild",
            package: "esbuild",
            purpose: "transpile plugins with --transpile",
        })?;

        Ok(Self::with_esbuild_path(esbuild_path))
    }

    /// Create a transpiler with a specific esbuild path
    pub fn with_esbuild_path(esbuild_path: PathBuf) -> Self {
        Self { esbuild_path }
    }

    /// Transpile a script
    ///
    /// # Errors
    ///
    /// Returns `CompileError::ToolFailed` with esbuild's diagnostics if it
    /// exits with a non-zero code.
    pub fn transpile(&self, source: &str) -> Result<String, CompileError> {
        let mut cmd = Command::new(&self.esbuild_path);
        cmd.arg("--loader=js")
            .arg(format!("--target={TARGET}"))
            .arg("--log-level=error");

        run_filter(cmd, "esbuild", source)
    }
}
