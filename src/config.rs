//! Index generation settings.
//!
//! Lookup order: an explicit `--config` file, then `<vault>/.obs-index.yaml`,
//! then compiled defaults. Every field defaults on its own, so a config file
//! only needs the keys it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{IndexError, IndexResult};

pub const CONFIG_FILE_NAME: &str = ".obs-index.yaml";

pub const DEFAULT_ROOTS: [&str; 6] = [
    "Resources",
    "General",
    "Areas",
    "Archives",
    "Clippings",
    "Projects",
];

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Top-level folders that each get an index note, in processing order.
    pub roots: Vec<String>,
    /// Appended to the root name to form the index note title.
    pub index_suffix: String,
    /// Extension of the documents listed in outlines, without the dot.
    pub extension: String,
    /// Regexes matched against file and folder names to leave out.
    pub exclude: Vec<String>,
    /// Tera template for the note body; see [`crate::template`].
    pub template: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roots: DEFAULT_ROOTS.iter().map(|r| r.to_string()).collect(),
            index_suffix: " Index".to_string(),
            extension: "md".to_string(),
            exclude: Vec::new(),
            template: None,
        }
    }
}

impl Settings {
    pub fn load(vault: &Path, explicit: Option<&Path>) -> IndexResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = vault.join(CONFIG_FILE_NAME);
                if !local.is_file() {
                    debug!("No {CONFIG_FILE_NAME} in vault, using defaults");
                    return Ok(Self::default());
                }
                local
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> IndexResult<Self> {
        debug!("Loading settings from {}", path.display());
        let text = fs::read_to_string(path)
            .map_err(|e| IndexError::io(format!("reading config {}", path.display()), e))?;
        Self::from_yaml(&text, path)
    }

    fn from_yaml(text: &str, path: &Path) -> IndexResult<Self> {
        // An empty file deserializes as null rather than an empty mapping
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(text).map_err(|e| IndexError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        settings.validate(path)?;
        Ok(settings)
    }

    fn validate(&self, path: &Path) -> IndexResult<()> {
        let invalid = |reason: &str| IndexError::Config {
            path: PathBuf::from(path),
            reason: reason.to_string(),
        };
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(invalid(
                "extension must be non-empty and given without a leading dot",
            ));
        }
        if self.roots.iter().any(|r| r.trim().is_empty()) {
            return Err(invalid("root folder names must not be empty"));
        }
        Ok(())
    }

    /// Title of the index note for `root`, e.g. `Resources Index`.
    pub fn index_title(&self, root: &str) -> String {
        format!("{root}{}", self.index_suffix)
    }

    /// Vault-relative path of the index note for `root`.
    pub fn index_path(&self, root: &str) -> String {
        format!("{}.{}", self.index_title(root), self.extension)
    }
}
