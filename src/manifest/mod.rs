// Plugin metadata parsing (package.json + config.toml)

use crate::error::ConfigError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Every published plugin package must carry this prefix
pub const NAME_PREFIX: &str = "windy-plugin-";

/// The subset of `package.json` embedded into the artifact
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    /// npm allows either a string or a `{ name, email, url }` object
    #[serde(default)]
    pub author: Option<Value>,
    /// npm allows either a string or a `{ type, url }` object
    #[serde(default)]
    pub repository: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PackageMetadata {
    /// Parse `package.json` from a file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingPackage {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Json {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Json {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Enforce the `windy-plugin-` naming convention
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.name.starts_with(NAME_PREFIX) {
            return Err(ConfigError::InvalidName {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Plugin options record read from `config.toml`
///
/// Known keys are `displayName`, `hook`, `className`, `classNameMobile`,
/// `exclusive` and `dependencies`, but any field is passed through.
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    fields: Map<String, Value>,
}

impl PluginConfig {
    /// Parse `config.toml` from a file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingPluginConfig {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Toml {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse a config record from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
        let value = serde_json::to_value(table).map_err(|e| e.to_string())?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err("config must be a table".to_string()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Mounting options embedded as the first argument of `W.loadPlugin`
#[derive(Debug, Clone, PartialEq)]
pub struct BundleOptions(Map<String, Value>);

impl BundleOptions {
    /// Merge package metadata with the plugin config
    ///
    /// The five metadata fields come first, then config fields in file order.
    /// A config field with the same key replaces the metadata value in place.
    pub fn merge(package: &PackageMetadata, config: &PluginConfig) -> Self {
        let mut options = Map::new();
        options.insert("name".into(), Value::String(package.name.clone()));
        options.insert("version".into(), Value::String(package.version.clone()));
        if let Some(author) = &package.author {
            options.insert("author".into(), author.clone());
        }
        if let Some(repository) = &package.repository {
            options.insert("repository".into(), repository.clone());
        }
        if let Some(description) = &package.description {
            options.insert("description".into(), Value::String(description.clone()));
        }

        for (key, value) in &config.fields {
            options.insert(key.clone(), value.clone());
        }

        Self(options)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Pretty JSON object literal
    pub fn to_literal(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }
}
