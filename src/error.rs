// Error types for plugin builds

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for a single build invocation
///
/// This is the primary error type returned by build operations.
/// Individual error types are exposed through `From` conversions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Failed to serialize plugin options: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write artifact to {path}: {error}")]
    Write { path: PathBuf, error: std::io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Missing or malformed project metadata and plugin config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Missing basic config object. Make sure you have a valid {} in your source dir",
        .path.display()
    )]
    MissingPluginConfig { path: PathBuf },

    #[error("Missing package metadata. Expected {}", .path.display())]
    MissingPackage { path: PathBuf },

    #[error("TOML parsing error in {path}: {error}")]
    Toml { path: PathBuf, error: String },

    #[error("JSON parsing error in {path}: {error}")]
    Json { path: PathBuf, error: String },

    #[error(
        "Your repository (and also your published npm package) must be named \
         \"windy-plugin-AnyOfYourName\", found \"{name}\". Change the name in your package.json"
    )]
    InvalidName { name: String },

    #[error("Template not found: {}", .path.display())]
    MissingTemplate { path: PathBuf },
}

/// Errors while resolving import declarations
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Module not found: '{module}' (looked for {})", .path.display())]
    ModuleNotFound { module: String, path: PathBuf },

    #[error(
        "Modules {} and {} would both be registered as '{name}', rename one of them",
        .first.display(),
        .second.display()
    )]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Failed to read module '{module}': {error}")]
    ModuleUnreadable {
        module: String,
        error: std::io::Error,
    },
}

/// Errors reported by the template, stylesheet and transpiler stages
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Template error in {}: {message}", .path.display())]
    Template { path: PathBuf, message: String },

    #[error(
        "{tool} not found. Install it with: npm install -g {package}\n\
         {tool} is required to {purpose}."
    )]
    ToolNotFound {
        tool: &'static str,
        package: &'static str,
        purpose: &'static str,
    },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: &'static str, stderr: String },

    #[error("Failed to execute {tool}: {error}")]
    ToolSpawn {
        tool: &'static str,
        error: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            ResolveError::ModuleNotFound {
                module: "./graph.mjs".to_string(),
                path: PathBuf::from("src/graph.mjs"),
            }
            .to_string(),
            "Module not found: './graph.mjs' (looked for src/graph.mjs)"
        );

        assert!(ConfigError::InvalidName {
            name: "my-plugin".to_string()
        }
        .to_string()
        .contains("windy-plugin-AnyOfYourName"));

        assert!(CompileError::ToolNotFound {
            tool: "lessc",
            package: "less",
            purpose: "compile plugin.less",
        }
        .to_string()
        .contains("npm install -g less"));
    }

    #[test]
    fn from_conversions_work() {
        let config_err: BuildError = ConfigError::InvalidName {
            name: "x".to_string(),
        }
        .into();
        assert!(matches!(config_err, BuildError::Config(_)));

        let resolve_err: BuildError = ResolveError::ModuleNotFound {
            module: "./a.mjs".to_string(),
            path: PathBuf::from("a.mjs"),
        }
        .into();
        assert!(matches!(resolve_err, BuildError::Resolve(_)));

        let compile_err: BuildError = CompileError::ToolFailed {
            tool: "esbuild",
            stderr: "boom".to_string(),
        }
        .into();
        assert!(matches!(compile_err, BuildError::Compile(_)));
    }

    #[test]
    fn tool_failure_passes_output_through() {
        let err = CompileError::ToolFailed {
            tool: "lessc",
            stderr: "ParseError: Unrecognised input in plugin.less on line 3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "lessc failed: ParseError: Unrecognised input in plugin.less on line 3"
        );
    }
}
