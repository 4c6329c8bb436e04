// Artifact assembly

use crate::imports::InlinedModuleTable;
use crate::manifest::BundleOptions;

/// Host function that registers a plugin when the artifact is evaluated
pub const REGISTER_CALL: &str = "W.loadPlugin";

/// Assembles the artifact from its compiled parts
///
/// The artifact is one `W.loadPlugin(options, html, css, constructor)` call
/// followed by every inlined module, each after a blank line. Markup and CSS
/// are embedded as JSON string literals, which escape quotes, backslashes
/// and line breaks, so their content cannot end the literal early.
pub struct BundleAssembler<'a> {
    options: &'a BundleOptions,
    markup: &'a str,
    css: Option<&'a str>,
    code: &'a str,
    modules: Option<&'a InlinedModuleTable>,
}

impl<'a> BundleAssembler<'a> {
    /// `code` is the constructor body with import bindings already prepended
    pub fn new(options: &'a BundleOptions, markup: &'a str, code: &'a str) -> Self {
        Self {
            options,
            markup,
            css: None,
            code,
            modules: None,
        }
    }

    pub fn css(mut self, css: Option<&'a str>) -> Self {
        self.css = css;
        self
    }

    pub fn modules(mut self, modules: &'a InlinedModuleTable) -> Self {
        self.modules = Some(modules);
        self
    }

    /// Produce the artifact text
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the options cannot be rendered.
    pub fn assemble(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();

        out.push_str(REGISTER_CALL);
        out.push_str("(\n/* Mounting options */\n");
        out.push_str(&self.options.to_literal()?);
        out.push_str(",\n/* HTML */\n");
        out.push_str(&serde_json::to_string(self.markup)?);
        out.push_str(",\n/* CSS */\n");
        out.push_str(&serde_json::to_string(self.css.unwrap_or_default())?);
        out.push_str(",\n/* Constructor */\nfunction () {\n");
        out.push_str(self.code);
        if !self.code.is_empty() && !self.code.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("});");

        if let Some(modules) = self.modules {
            for module in modules.iter() {
                out.push_str("\n\n");
                out.push_str(&module.source);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::InlinedModule;
    use crate::manifest::{PackageMetadata, PluginConfig};

    fn options() -> BundleOptions {
        let package: PackageMetadata =
            serde_json::from_str(r#"{ "name": "windy-plugin-demo", "version": "0.1.0" }"#)
                .unwrap();
        let config = PluginConfig::parse("hook = \"menu\"").unwrap();
        BundleOptions::merge(&package, &config)
    }

    #[test]
    fn assembles_registration_call() {
        let options = options();
        let artifact = BundleAssembler::new(&options, "<p>hi</p>", "\tinit();\n")
            .css(Some(".a{color:red}"))
            .assemble()
            .unwrap();

        assert_eq!(
            artifact,
            "W.loadPlugin(\n\
             /* Mounting options */\n\
             {\n  \"name\": \"windy-plugin-demo\",\n  \"version\": \"0.1.0\",\n  \"hook\": \"menu\"\n},\n\
             /* HTML */\n\
             \"<p>hi</p>\",\n\
             /* CSS */\n\
             \".a{color:red}\",\n\
             /* Constructor */\n\
             function () {\n\
             \tinit();\n\
             });"
        );
    }

    #[test]
    fn absent_css_is_empty_literal() {
        let options = options();
        let artifact = BundleAssembler::new(&options, "", "").assemble().unwrap();
        assert!(artifact.contains("/* CSS */\n\"\",\n"));
        assert!(artifact.ends_with("function () {\n});"));
    }

    #[test]
    fn markup_cannot_break_out_of_literal() {
        let options = options();
        let markup = "<a title=\"it's\">`x`</a>\n<b>\\</b>";
        let artifact = BundleAssembler::new(&options, markup, "").assemble().unwrap();

        assert!(artifact.contains(r#""<a title=\"it's\">`x`</a>\n<b>\\</b>""#));
    }

    #[test]
    fn inlined_modules_follow_in_discovery_order() {
        let options = options();
        let mut modules = InlinedModuleTable::new();
        modules.insert(InlinedModule {
            name: "windy-plugin-demo/a".into(),
            file: "a.mjs".into(),
            source: "export const a = 1;".into(),
        });
        modules.insert(InlinedModule {
            name: "windy-plugin-demo/b".into(),
            file: "b.mjs".into(),
            source: "export default 42;".into(),
        });

        let artifact = BundleAssembler::new(&options, "", "run();")
            .modules(&modules)
            .assemble()
            .unwrap();

        assert!(artifact.ends_with("run();\n});\n\nexport const a = 1;\n\nexport default 42;"));
    }
}
