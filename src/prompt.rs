// Guided setup - pick which plugin source directory to compile

use crate::config::DEFAULT_SRC_DIR;
use anyhow::{bail, Result};
use dialoguer::{theme::ColorfulTheme, Select};
use std::path::{Path, PathBuf};

/// Directory holding bundled example plugins
pub const EXAMPLES_DIR: &str = "examples";

/// Source directories offered by the prompt, relative to `root`
///
/// `src` first, then every directory under `examples/` that contains a
/// `plugin.html`, sorted by name.
pub fn candidates(root: &Path) -> Vec<PathBuf> {
    let mut found = vec![PathBuf::from(DEFAULT_SRC_DIR)];

    let Ok(entries) = std::fs::read_dir(root.join(EXAMPLES_DIR)) else {
        return found;
    };

    let mut examples: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().join("plugin.html").is_file())
        .map(|e| PathBuf::from(EXAMPLES_DIR).join(e.file_name()))
        .collect();
    examples.sort();

    found.extend(examples);
    found
}

/// Ask which source directory to compile
pub fn select_source_dir(root: &Path) -> Result<PathBuf> {
    let options = candidates(root);
    if options.is_empty() {
        bail!("No plugin sources found under {}", root.display());
    }

    let labels: Vec<String> = options.iter().map(|p| p.display().to_string()).collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which plugin do you want to compile?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(options[choice].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn src_is_always_offered() {
        let dir = TempDir::new().unwrap();
        assert_eq!(candidates(dir.path()), vec![PathBuf::from("src")]);
    }

    #[test]
    fn examples_with_templates_are_listed_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["02-drag", "01-hello", "03-empty"] {
            std::fs::create_dir_all(dir.path().join("examples").join(name)).unwrap();
        }
        std::fs::write(dir.path().join("examples/01-hello/plugin.html"), "<plugin/>").unwrap();
        std::fs::write(dir.path().join("examples/02-drag/plugin.html"), "<plugin/>").unwrap();

        assert_eq!(
            candidates(dir.path()),
            vec![
                PathBuf::from("src"),
                PathBuf::from("examples/01-hello"),
                PathBuf::from("examples/02-drag"),
            ]
        );
    }
}
