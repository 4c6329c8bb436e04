// Build pipeline - template, stylesheet, imports, assembly, transpile, write

use crate::bundle::BundleAssembler;
use crate::config::BuildConfig;
use crate::error::{BuildError, ConfigError};
use crate::imports::ImportResolver;
use crate::manifest::{BundleOptions, PackageMetadata, PluginConfig};
use crate::style::compile_stylesheet;
use crate::template::{TagCompiler, TemplateCompiler};
use crate::transpile::transpile_artifact;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything loaded fresh at the start of a build
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub package: PackageMetadata,
    pub plugin_config: PluginConfig,
}

impl BuildContext {
    /// Read `package.json` and `config.toml` from disk
    pub fn load(config: &BuildConfig) -> Result<Self, ConfigError> {
        let package = PackageMetadata::from_file(&config.package_json())?;
        package.validate()?;

        let plugin_config = PluginConfig::from_file(&config.plugin_config_file())?;

        Ok(Self {
            package,
            plugin_config,
        })
    }

    pub fn options(&self) -> BundleOptions {
        BundleOptions::merge(&self.package, &self.plugin_config)
    }
}

/// Result of a successful build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Plugin name
    pub name: String,

    /// Where the artifact was written
    pub destination: PathBuf,

    /// Artifact size in bytes
    pub size_bytes: u64,

    /// Runtime lookups prepended to the constructor
    pub bindings: usize,

    /// Local modules appended to the artifact
    pub inlined_modules: usize,

    /// Import statements that did not match the supported shape
    pub skipped_imports: usize,

    pub transpiled: bool,
}

/// Artifact text plus the counts reported after writing it
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub text: String,
    pub bindings: usize,
    pub inlined_modules: usize,
    pub skipped_imports: usize,
}

/// Runs builds for one plugin project
pub struct Builder {
    config: BuildConfig,
    template: Box<dyn TemplateCompiler>,
}

impl Builder {
    /// Create a builder using the built-in template compiler
    pub fn new(config: BuildConfig) -> Self {
        Self::with_template_compiler(config, Box::new(TagCompiler))
    }

    pub fn with_template_compiler(config: BuildConfig, template: Box<dyn TemplateCompiler>) -> Self {
        Self { config, template }
    }

    /// Build the plugin and write the artifact
    ///
    /// On any error the previous artifact is left untouched.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let context = BuildContext::load(&self.config)?;
        let rendered = self.render(&context)?;

        let destination = self.config.destination();
        write_atomic(&destination, &rendered.text)?;

        let report = BuildReport {
            name: context.package.name.clone(),
            destination,
            size_bytes: rendered.text.len() as u64,
            bindings: rendered.bindings,
            inlined_modules: rendered.inlined_modules,
            skipped_imports: rendered.skipped_imports,
            transpiled: self.config.transpile,
        };

        tracing::info!(
            plugin = %report.name,
            destination = %report.destination.display(),
            bytes = report.size_bytes,
            "Plugin compiled"
        );

        Ok(report)
    }

    /// Produce the artifact text without touching the destination
    pub fn render(&self, context: &BuildContext) -> Result<RenderedArtifact, BuildError> {
        let source_dir = self.config.source_dir();

        let css = compile_stylesheet(&self.config)?;

        let template_path = self.config.template_file();
        if !template_path.is_file() {
            return Err(ConfigError::MissingTemplate {
                path: template_path,
            }
            .into());
        }
        let source = std::fs::read_to_string(&template_path)?;
        let compiled = self.template.compile(&source, &template_path)?;

        let resolver = ImportResolver::new(&source_dir, &context.package.name);
        let resolved = resolver.resolve(&compiled.raw_imports)?;
        let code = resolved.prepend_to(&compiled.code);

        let options = context.options();
        let mut text = BundleAssembler::new(&options, &compiled.markup, &code)
            .css(css.as_deref())
            .modules(&resolved.modules)
            .assemble()?;

        if self.config.transpile {
            text = transpile_artifact(&text)?;
        }

        Ok(RenderedArtifact {
            text,
            bindings: resolved.bindings.len(),
            inlined_modules: resolved.modules.len(),
            skipped_imports: resolved.skipped.len(),
        })
    }
}

/// Write through a temp file in the same directory, then rename over `path`
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), BuildError> {
    let write_err = |error: std::io::Error| BuildError::Write {
        path: path.to_path_buf(),
        error,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut file = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;
    #[cfg(unix)]
    file.as_file()
        .set_permissions(artifact_permissions(path))
        .map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Mode of the artifact being replaced, or world-readable for a new one
///
/// Temp files are created owner-only.
#[cfg(unix)]
fn artifact_permissions(path: &Path) -> std::fs::Permissions {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.permissions())
        .unwrap_or_else(|_| std::fs::Permissions::from_mode(0o644))
}
