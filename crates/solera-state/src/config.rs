use crate::StateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

fn default_dxvk_version() -> String {
    "2.3".to_owned()
}

/// User-editable configuration, stored as TOML.
///
/// Every field has a default so a missing or partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// DXVK release tag to install.
    pub dxvk_version: String,
    /// Path to a Wine installation to prefer over the system one.
    pub wine_root: Option<PathBuf>,
    /// Extra environment variables for every process spawned in the prefix.
    pub env: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dxvk_version: default_dxvk_version(),
            wine_root: None,
            env: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load the config file, returning defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.dxvk_version.is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "dxvk_version = \"2.4\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.dxvk_version, "2.4");
        assert!(config.wine_root.is_none());
        assert!(config.env.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.env.insert("MANGOHUD".to_owned(), "1".to_owned());
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "dxvk_version = [not toml").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(StateError::ConfigParse(_))
        ));
    }
}
