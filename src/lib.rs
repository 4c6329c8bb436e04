//! Build, watch and serve single-file Windy plugins.
//!
//! A plugin is a `plugin.html` template (markup plus `<script>` blocks), an
//! optional `plugin.less` stylesheet and a `config.toml` options record. A build
//! turns them into one `dist/plugin.js` that calls `W.loadPlugin()` once.
//! Imports from `@windy/...` and `@windy/plugins/...` become `W.require()`
//! lookups; imports of local files are inlined at the end of the artifact.

pub mod build;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod imports;
pub mod manifest;
pub mod prompt;
pub mod serve;
pub mod style;
pub mod template;
pub mod tool;
pub mod transpile;
pub mod watch;

pub use build::{BuildContext, BuildReport, Builder};
pub use config::BuildConfig;
pub use error::BuildError;
