// Import resolution - rewrites imports into runtime lookups and inlines local files

use super::{scan, ImportDeclaration, ImportKind, ScanItem, PLUGINS_MARKER};
use crate::error::ResolveError;
use std::path::{Component, Path, PathBuf};

/// Host function that resolves core and plugin modules at load time
pub const RUNTIME_LOOKUP: &str = "W.require";

/// `const <binding> = W.require('<argument>');`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub binding: String,
    pub argument: String,
}

impl ImportBinding {
    pub fn statement(&self) -> String {
        format!(
            "const {} = {}('{}');",
            self.binding, RUNTIME_LOOKUP, self.argument
        )
    }
}

/// A local file whose source is appended to the artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedModule {
    /// Name the module is looked up by
    pub name: String,

    /// Normalized path relative to the source directory, extension included
    pub file: PathBuf,

    /// File content, verbatim
    pub source: String,
}

/// Inlined modules in discovery order, unique by name
#[derive(Debug, Clone, Default)]
pub struct InlinedModuleTable {
    modules: Vec<InlinedModule>,
}

impl InlinedModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&InlinedModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Insert a module unless one with the same name is already present
    ///
    /// Returns `true` if the module was added.
    pub fn insert(&mut self, module: InlinedModule) -> bool {
        if self.get(&module.name).is_some() {
            return false;
        }
        self.modules.push(module);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &InlinedModule> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Output of resolving one import block
#[derive(Debug, Clone, Default)]
pub struct ResolvedImports {
    /// Bindings in discovery order
    pub bindings: Vec<ImportBinding>,

    pub modules: InlinedModuleTable,

    /// Statements skipped because they did not match the import shape
    pub skipped: Vec<String>,
}

impl ResolvedImports {
    /// Prepend the bindings to `code`, last discovered on top
    pub fn prepend_to(&self, code: &str) -> String {
        let mut out = String::new();
        for binding in self.bindings.iter().rev() {
            out.push('\t');
            out.push_str(&binding.statement());
            out.push('\n');
        }
        out.push_str(code);
        out
    }
}

/// Resolves import declarations against a plugin's source directory
pub struct ImportResolver<'a> {
    source_dir: &'a Path,

    /// Package name local modules are registered under
    package_name: &'a str,
}

impl<'a> ImportResolver<'a> {
    pub fn new(source_dir: &'a Path, package_name: &'a str) -> Self {
        Self {
            source_dir,
            package_name,
        }
    }

    /// Resolve every import in `raw_imports`
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::ModuleNotFound` if a local file import points
    /// at a file that does not exist.
    pub fn resolve(&self, raw_imports: &str) -> Result<ResolvedImports, ResolveError> {
        let mut resolved = ResolvedImports::default();

        for item in scan(raw_imports) {
            match item {
                ScanItem::Import(declaration) => {
                    let binding = self.bind(&declaration, &mut resolved.modules)?;
                    tracing::debug!(
                        binding = %binding.binding,
                        argument = %binding.argument,
                        "Rewrote import"
                    );
                    resolved.bindings.push(binding);
                }
                ScanItem::Unrecognized(statement) => {
                    tracing::debug!(%statement, "Skipping unrecognized import statement");
                    resolved.skipped.push(statement);
                }
            }
        }

        Ok(resolved)
    }

    fn bind(
        &self,
        declaration: &ImportDeclaration,
        modules: &mut InlinedModuleTable,
    ) -> Result<ImportBinding, ResolveError> {
        let argument = match &declaration.kind {
            ImportKind::Core { path } => path.clone(),
            ImportKind::Plugin { path } => format!("{PLUGINS_MARKER}{path}"),
            ImportKind::LocalFile { path } => self.inline(path, modules)?,
        };

        Ok(ImportBinding {
            binding: declaration.binding.clone(),
            argument,
        })
    }

    /// Read a local module into the table and return its registered name
    ///
    /// The file must exist even when its name is already registered, and two
    /// different files may not share one registered name.
    fn inline(&self, path: &str, modules: &mut InlinedModuleTable) -> Result<String, ResolveError> {
        let file = self.source_dir.join(path);
        if !file.is_file() {
            return Err(ResolveError::ModuleNotFound {
                module: path.to_string(),
                path: file,
            });
        }

        let name = self.registered_name(path);
        let relative = normalize(Path::new(path));
        if let Some(existing) = modules.get(&name) {
            if existing.file == relative {
                return Ok(name);
            }
            return Err(ResolveError::NameCollision {
                name,
                first: existing.file.clone(),
                second: relative,
            });
        }

        let source = std::fs::read_to_string(&file).map_err(|error| {
            ResolveError::ModuleUnreadable {
                module: path.to_string(),
                error,
            }
        })?;

        tracing::debug!(module = %name, file = %file.display(), "Inlining local module");
        modules.insert(InlinedModule {
            name: name.clone(),
            file: relative,
            source,
        });
        Ok(name)
    }

    /// `<package>/<normalized path without extension>`
    pub fn registered_name(&self, path: &str) -> String {
        let normalized = normalize(Path::new(path)).with_extension("");
        let segments: Vec<String> = normalized
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("{}/{}", self.package_name, segments.join("/"))
    }
}

/// Lexically drop `.` segments and fold `dir/..` pairs
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}
