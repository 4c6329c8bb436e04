// Configuration types for plugin builds

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Port the preview server listens on
pub const DEFAULT_PORT: u16 = 9999;

/// Source directory compiled when no other is selected
pub const DEFAULT_SRC_DIR: &str = "src";

/// Paths and switches for one build
///
/// Every build receives its own copy; nothing here is process-wide.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project root holding `package.json`
    pub root: PathBuf,

    /// Plugin source directory, relative to `root`
    pub src_dir: PathBuf,

    /// Output directory, relative to `root`
    pub dist_dir: PathBuf,

    /// Artifact file name inside `dist_dir`
    pub output_file: String,

    /// Whether to transpile the artifact down to ES2015
    pub transpile: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            src_dir: PathBuf::from(DEFAULT_SRC_DIR),
            dist_dir: PathBuf::from("dist"),
            output_file: "plugin.js".to_string(),
            transpile: false,
        }
    }
}

impl BuildConfig {
    /// Create a config rooted at `root` with default layout
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Absolute-or-relative source directory joined onto the root
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.src_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.dist_dir)
    }

    /// Full path of the artifact
    pub fn destination(&self) -> PathBuf {
        self.output_dir().join(&self.output_file)
    }

    pub fn package_json(&self) -> PathBuf {
        self.root.join("package.json")
    }

    pub fn template_file(&self) -> PathBuf {
        self.source_dir().join("plugin.html")
    }

    pub fn less_file(&self) -> PathBuf {
        self.source_dir().join("plugin.less")
    }

    pub fn css_file(&self) -> PathBuf {
        self.source_dir().join("plugin.css")
    }

    pub fn plugin_config_file(&self) -> PathBuf {
        self.source_dir().join("config.toml")
    }
}

/// Preview server configuration
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Interface to bind
    pub host: String,

    pub port: u16,

    /// Directory served as static files
    pub dir: PathBuf,

    /// PEM certificate, generated when missing
    pub cert_path: PathBuf,

    /// PEM private key, generated when missing
    pub key_path: PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            dir: PathBuf::from("dist"),
            cert_path: PathBuf::from("dev").join("certificate.pem"),
            key_path: PathBuf::from("dev").join("key.pem"),
        }
    }
}

impl ServeConfig {
    /// Serve the output directory of `build` with certificates under `root/dev`
    pub fn for_build(build: &BuildConfig) -> Self {
        let dev = build.root.join("dev");
        Self {
            dir: build.output_dir(),
            cert_path: dev.join("certificate.pem"),
            key_path: dev.join("key.pem"),
            ..Default::default()
        }
    }

    /// URL the artifact is published at
    pub fn artifact_url(&self, output_file: &str) -> String {
        format!("https://localhost:{}/{}", self.port, output_file)
    }
}

/// Watch loop configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Quiet period after a change before a build starts
    pub debounce: Duration,

    /// Paths watched recursively
    pub paths: Vec<PathBuf>,
}

impl WatchConfig {
    /// Watch the source directory and `package.json` of `build`
    pub fn for_build(build: &BuildConfig) -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            paths: vec![build.source_dir(), build.package_json()],
        }
    }

    /// Whether `path` lives under one of the watched paths
    pub fn covers(&self, path: &Path) -> bool {
        self.paths.iter().any(|watched| path.starts_with(watched))
    }
}
