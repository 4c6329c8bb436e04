// Stylesheet compilation - lessc integration

use crate::config::BuildConfig;
use crate::error::{BuildError, CompileError};
use crate::tool::run_filter;
use std::path::PathBuf;
use std::process::Command;
use which::which;

/// lessc wrapper for plugin stylesheets
///
/// The source is piped through stdin and compressed CSS read from stdout.
pub struct LessCompiler {
    /// Path to the lessc executable
    lessc_path: PathBuf,

    /// Directories searched by `@import`
    include_paths: Vec<PathBuf>,
}

impl LessCompiler {
    /// Create a new compiler by detecting lessc
    ///
    /// # Errors
    ///
    /// Returns `CompileError::ToolNotFound` if lessc is not installed
    /// or not in PATH.
    pub fn new(include_paths: Vec<PathBuf>) -> Result<Self, CompileError> {
        let lessc_path = which("lessc").map_err(|_| CompileError::ToolNotFound {
            tool: "lessc",
            package: "less",
            purpose: "compile plugin.less",
        })?;

        Ok(Self::with_lessc_path(lessc_path, include_paths))
    }

    /// Create a compiler with a specific lessc path
    pub fn with_lessc_path(lessc_path: PathBuf, include_paths: Vec<PathBuf>) -> Self {
        Self {
            lessc_path,
            include_paths,
        }
    }

    /// Compile LESS source to CSS
    pub fn compile(&self, source: &str) -> Result<String, CompileError> {
        let mut cmd = Command::new(&self.lessc_path);
        cmd.arg("--compress");

        if !self.include_paths.is_empty() {
            let joined = std::env::join_paths(&self.include_paths).map_err(|e| {
                CompileError::ToolFailed {
                    tool: "lessc",
                    stderr: format!("invalid include path: {e}"),
                }
            })?;
            cmd.arg(format!("--include-path={}", joined.to_string_lossy()));
        }

        // Read from stdin
        cmd.arg("-");

        run_filter(cmd, "lessc", source)
    }
}

/// Compile the plugin stylesheet of `config`, if there is one
///
/// `plugin.less` is compiled with lessc. Without it, `plugin.css` is used
/// as is. Returns `None` when neither exists.
pub fn compile_stylesheet(config: &BuildConfig) -> Result<Option<String>, BuildError> {
    let less_file = config.less_file();
    if less_file.is_file() {
        let source = std::fs::read_to_string(&less_file)?;
        let compiler = LessCompiler::new(vec![config.source_dir()])?;
        tracing::debug!(file = %less_file.display(), "Compiling stylesheet");
        return Ok(Some(compiler.compile(&source)?));
    }

    let css_file = config.css_file();
    if css_file.is_file() {
        return Ok(Some(std::fs::read_to_string(&css_file)?));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, BuildConfig) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        let config = BuildConfig::with_root(dir.path());
        (dir, config)
    }

    #[test]
    fn no_stylesheet_yields_none() {
        let (_dir, config) = project();
        assert_eq!(compile_stylesheet(&config).unwrap(), None);
    }

    #[test]
    fn plain_css_is_used_verbatim() {
        let (_dir, config) = project();
        std::fs::write(config.css_file(), ".plugin-content { color: red; }").unwrap();

        assert_eq!(
            compile_stylesheet(&config).unwrap().as_deref(),
            Some(".plugin-content { color: red; }")
        );
    }

    #[test]
    fn lessc_without_executable() {
        let compiler = LessCompiler::with_lessc_path(PathBuf::from("/nonexistent/lessc"), vec![]);
        let result = compiler.compile(".a { .b { color: red; } }");
        assert!(matches!(result, Err(CompileError::ToolSpawn { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn lessc_receives_compress_and_include_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("lessc");
        std::fs::write(&fake, "#!/bin/sh\necho \"$@\"\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let compiler = LessCompiler::with_lessc_path(fake, vec![PathBuf::from("/work/src")]);
        let output = compiler.compile("").unwrap();

        assert_eq!(output, "--compress --include-path=/work/src -\n");
    }
}
