// Transpilation - downlevels the assembled artifact for older browsers

pub mod esbuild;

pub use esbuild::{EsbuildTranspiler, TARGET};

use crate::error::CompileError;

/// Transpile an artifact with esbuild
///
/// This is a convenience function that detects esbuild on every call.
pub fn transpile_artifact(source: &str) -> Result<String, CompileError> {
    let transpiler = EsbuildTranspiler::new()?;
    tracing::info!(es_target = TARGET, "Transpiling with esbuild");
    transpiler.transpile(source)
}
