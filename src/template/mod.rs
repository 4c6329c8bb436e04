// Template compilation - splits plugin.html into markup, code and imports

use crate::error::CompileError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Root element wrapping a plugin template
pub const ROOT_TAG: &str = "plugin";

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script(?:\s[^>]*)?>(.*?)</script\s*>").expect("Invalid regex")
});

static SCRIPT_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<script(?:[\s/>]|\z)").expect("Invalid regex")
});

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import[ \t]+(?:[^\n;{(]|\{[^}]*\})*;?[ \t]*(?:\r?\n|\z)")
        .expect("Invalid regex")
});

static OPEN_ROOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^<{ROOT_TAG}(?:\s[^>]*)?>")).expect("Invalid regex")
});

/// Output of the template compiler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledTemplate {
    /// Markup without script blocks or the root element
    pub markup: String,

    /// Script body without import statements
    pub code: String,

    /// Import statements, one per line, possibly empty
    pub raw_imports: String,
}

/// Turns one templated source file into markup, code and imports
pub trait TemplateCompiler: Send + Sync {
    /// Compile `source`, read from `path`
    fn compile(&self, source: &str, path: &Path) -> Result<CompiledTemplate, CompileError>;
}

/// Built-in compiler for `<plugin>` single-file templates
///
/// ```html
/// <plugin>
///   <div class="plugin-content">...</div>
///   <script>
///     import bcast from '@windy/broadcast';
///     this.onopen = () => bcast.emit('rqstOpen', 'menu');
///   </script>
/// </plugin>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TagCompiler;

impl TemplateCompiler for TagCompiler {
    fn compile(&self, source: &str, path: &Path) -> Result<CompiledTemplate, CompileError> {
        let mut scripts = Vec::new();
        for caps in SCRIPT_RE.captures_iter(source) {
            if let Some(body) = caps.get(1) {
                scripts.push(body.as_str());
            }
        }

        let markup = SCRIPT_RE.replace_all(source, "");
        if SCRIPT_OPEN_RE.is_match(&markup) {
            return Err(CompileError::Template {
                path: path.to_path_buf(),
                message: "unclosed <script> block".to_string(),
            });
        }

        let mut raw_imports = String::new();
        let mut code = String::new();
        for script in scripts {
            for import in IMPORT_RE.find_iter(script) {
                raw_imports.push_str(import.as_str().trim());
                raw_imports.push('\n');
            }
            let body = IMPORT_RE.replace_all(script, "");
            let body = trim_blank_lines(&body);
            if !body.is_empty() {
                code.push_str(body);
                code.push('\n');
            }
        }

        Ok(CompiledTemplate {
            markup: unwrap_root(markup.trim()).to_string(),
            code,
            raw_imports,
        })
    }
}

/// Strip a surrounding `<plugin>...</plugin>` element
fn unwrap_root(markup: &str) -> &str {
    let Some(open) = OPEN_ROOT_RE.find(markup) else {
        return markup;
    };
    let close = format!("</{ROOT_TAG}>");
    let inner = &markup[open.end()..];
    let Some(at) = inner.len().checked_sub(close.len()) else {
        return markup;
    };
    match (inner.get(..at), inner.get(at..)) {
        (Some(body), Some(tail)) if tail.eq_ignore_ascii_case(&close) => body.trim(),
        _ => markup,
    }
}

/// Drop leading and trailing lines that hold only whitespace
fn trim_blank_lines(text: &str) -> &str {
    let start = text
        .find(|c: char| !c.is_whitespace())
        .map_or(text.len(), |first| {
            text[..first].rfind('\n').map_or(0, |nl| nl + 1)
        });
    text[start..].trim_end()
}
