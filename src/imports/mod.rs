// Import scanning - classifies `import X from '...'` statements

pub mod resolver;

pub use resolver::{
    ImportBinding, ImportResolver, InlinedModule, InlinedModuleTable, ResolvedImports,
    RUNTIME_LOOKUP,
};

use serde::{Deserialize, Serialize};

/// Marks a reference into the runtime's built-in namespace
pub const CORE_NAMESPACE: &str = "@windy/";

/// Marks a reference to another plugin's exports
pub const PLUGINS_MARKER: &str = "plugins/";

/// Where an import is resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportKind {
    /// Runtime built-in, looked up by `path` at load time
    Core { path: String },

    /// Another plugin's export, looked up as `plugins/<path>` at load time
    Plugin { path: String },

    /// File next to the plugin source, inlined at build time
    LocalFile { path: String },
}

impl ImportKind {
    /// Classify a module specifier
    ///
    /// ```
    /// # use windy_plugin_compiler::imports::ImportKind;
    /// assert_eq!(
    ///     ImportKind::classify("@windy/plugins/bar"),
    ///     ImportKind::Plugin { path: "bar".into() }
    /// );
    /// assert_eq!(
    ///     ImportKind::classify("@windy/broadcast"),
    ///     ImportKind::Core { path: "broadcast".into() }
    /// );
    /// assert_eq!(
    ///     ImportKind::classify("./graph.mjs"),
    ///     ImportKind::LocalFile { path: "./graph.mjs".into() }
    /// );
    /// ```
    pub fn classify(specifier: &str) -> Self {
        let (namespaced, rest) = match specifier.strip_prefix(CORE_NAMESPACE) {
            Some(rest) => (true, rest),
            None => (false, specifier),
        };

        if let Some(path) = rest.strip_prefix(PLUGINS_MARKER) {
            return ImportKind::Plugin {
                path: path.to_string(),
            };
        }

        if !namespaced && (rest.starts_with("./") || rest.starts_with("../")) {
            return ImportKind::LocalFile {
                path: rest.to_string(),
            };
        }

        ImportKind::Core {
            path: rest.to_string(),
        }
    }
}

/// One recognized import statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    /// Imported name or destructuring pattern, as written
    pub binding: String,

    /// Module specifier between the quotes
    pub specifier: String,

    pub kind: ImportKind,
}

/// Result of scanning one `import` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanItem {
    Import(ImportDeclaration),

    /// Statement starting with `import` that is not of the supported shape
    Unrecognized(String),
}

/// Scan a block of import statements in source order
///
/// Imports inside `//` and `/* */` comments are ignored.
pub fn scan(source: &str) -> Vec<ScanItem> {
    let mut items = Vec::new();
    let bytes = source.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let rest = &source[pos..];

        if rest.starts_with("//") {
            pos += rest.find('\n').unwrap_or(rest.len());
        } else if rest.starts_with("/*") {
            pos += rest[2..].find("*/").map_or(rest.len(), |end| end + 4);
        } else if rest.starts_with("import") && at_keyword(source, pos, "import") {
            match parse_statement(rest) {
                Some((declaration, consumed)) => {
                    items.push(ScanItem::Import(declaration));
                    pos += consumed;
                }
                None => {
                    let line = rest.lines().next().unwrap_or(rest);
                    items.push(ScanItem::Unrecognized(line.trim().to_string()));
                    pos += "import".len();
                }
            }
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    items
}

/// Recognized declarations only, in source order
pub fn declarations(source: &str) -> Vec<ImportDeclaration> {
    scan(source)
        .into_iter()
        .filter_map(|item| match item {
            ScanItem::Import(declaration) => Some(declaration),
            ScanItem::Unrecognized(_) => None,
        })
        .collect()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'.'
}

fn at_keyword(source: &str, pos: usize, keyword: &str) -> bool {
    let bytes = source.as_bytes();
    let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
    let after = pos + keyword.len();
    let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
    before_ok && after_ok
}

/// Parse `import [* as ]<binding> from '<specifier>'[;]` at the start of `input`
///
/// Returns the declaration and the number of bytes consumed.
fn parse_statement(input: &str) -> Option<(ImportDeclaration, usize)> {
    let mut cursor = Cursor::new(input);
    cursor.expect("import")?;
    cursor.whitespace1()?;

    if cursor.peek() == Some('*') {
        cursor.bump();
        cursor.whitespace0();
        cursor.expect("as")?;
        cursor.whitespace1()?;
    }

    let binding = if cursor.peek() == Some('{') {
        cursor.take_through('}')?
    } else {
        cursor.take_while(|c| !c.is_whitespace())?
    };

    cursor.whitespace1()?;
    cursor.expect("from")?;
    cursor.whitespace1()?;

    let quote = cursor.peek().filter(|c| *c == '\'' || *c == '"')?;
    cursor.bump();
    let specifier = cursor.take_while(|c| c != '\'' && c != '"' && c != '\n')?;
    if cursor.peek() != Some(quote) {
        return None;
    }
    cursor.bump();

    let save = cursor.pos;
    cursor.skip_while(|c| c == ' ' || c == '\t');
    if cursor.peek() == Some(';') {
        cursor.bump();
    } else {
        cursor.pos = save;
    }

    let kind = ImportKind::classify(specifier);
    Some((
        ImportDeclaration {
            binding: binding.to_string(),
            specifier: specifier.to_string(),
            kind,
        },
        cursor.pos,
    ))
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, word: &str) -> Option<()> {
        if self.rest().starts_with(word) {
            self.pos += word.len();
            Some(())
        } else {
            None
        }
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.pos - start
    }

    fn whitespace0(&mut self) {
        self.skip_while(char::is_whitespace);
    }

    fn whitespace1(&mut self) -> Option<()> {
        (self.skip_while(char::is_whitespace) > 0).then_some(())
    }

    /// Non-empty run of chars matching `pred`
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> Option<&'a str> {
        let start = self.pos;
        if self.skip_while(pred) == 0 {
            return None;
        }
        Some(&self.input[start..self.pos])
    }

    /// Everything up to and including the next `end`
    fn take_through(&mut self, end: char) -> Option<&'a str> {
        let start = self.pos;
        let offset = self.rest().find(end)?;
        self.pos += offset + end.len_utf8();
        Some(&self.input[start..self.pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(source: &str) -> ImportDeclaration {
        let mut found = declarations(source);
        assert_eq!(found.len(), 1, "expected one import in {source:?}");
        found.remove(0)
    }

    #[test]
    fn classify_core_namespace() {
        assert_eq!(
            ImportKind::classify("@windy/store"),
            ImportKind::Core {
                path: "store".to_string()
            }
        );
    }

    #[test]
    fn classify_bare_specifier_as_core() {
        assert_eq!(
            ImportKind::classify("foo"),
            ImportKind::Core {
                path: "foo".to_string()
            }
        );
    }

    #[test]
    fn classify_plugin_with_and_without_namespace() {
        let expected = ImportKind::Plugin {
            path: "bar".to_string(),
        };
        assert_eq!(ImportKind::classify("@windy/plugins/bar"), expected);
        assert_eq!(ImportKind::classify("plugins/bar"), expected);
    }

    #[test]
    fn classify_parent_relative_as_local() {
        assert!(matches!(
            ImportKind::classify("../shared/infobox.mjs"),
            ImportKind::LocalFile { .. }
        ));
    }

    #[test]
    fn parse_default_import() {
        let import = single("import bcast from '@windy/broadcast';");
        assert_eq!(import.binding, "bcast");
        assert_eq!(import.specifier, "@windy/broadcast");
    }

    #[test]
    fn parse_double_quotes() {
        let import = single(r#"import map from "@windy/map""#);
        assert_eq!(import.binding, "map");
        assert_eq!(import.specifier, "@windy/map");
    }

    #[test]
    fn parse_namespace_import_drops_star_as() {
        let import = single("import * as utils from '@windy/utils';");
        assert_eq!(import.binding, "utils");
    }

    #[test]
    fn parse_multiline_destructuring() {
        let import = single("import {\n    emit,\n    on\n} from '@windy/broadcast';");
        assert_eq!(import.binding, "{\n    emit,\n    on\n}");
    }

    #[test]
    fn scan_preserves_source_order() {
        let source = "import a from '@windy/a';\nimport b from '@windy/plugins/b';\nimport c from './c.mjs';\n";
        let bindings: Vec<String> = declarations(source)
            .into_iter()
            .map(|d| d.binding)
            .collect();
        assert_eq!(bindings, vec!["a", "b", "c"]);
    }

    #[test]
    fn mismatched_quotes_are_unrecognized() {
        let items = scan("import a from '@windy/a\";");
        assert_eq!(
            items,
            vec![ScanItem::Unrecognized("import a from '@windy/a\";".to_string())]
        );
    }

    #[test]
    fn side_effect_import_is_unrecognized() {
        let items = scan("import './styles.css';\nimport a from '@windy/a';");
        assert!(matches!(items[0], ScanItem::Unrecognized(_)));
        assert!(matches!(items[1], ScanItem::Import(_)));
    }

    #[test]
    fn commented_imports_are_ignored() {
        let source = "// import a from '@windy/a';\n/* import b from '@windy/b'; */\nimport c from '@windy/c';";
        let found = declarations(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].binding, "c");
    }

    #[test]
    fn keyword_inside_identifier_is_not_an_import() {
        assert!(scan("const reimport = 1; myimport(x);").is_empty());
    }

    #[test]
    fn empty_block_has_no_imports() {
        assert!(scan("").is_empty());
        assert!(scan("   \n\t").is_empty());
    }
}
