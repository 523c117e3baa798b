use crate::StateError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Persisted record of what is currently installed.
///
/// The engines treat this as a get/set record that must stay consistent with
/// actual filesystem side effects: version tags are cleared only after the
/// files they tag have been successfully deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallationState {
    /// Installed Studio deployment version, empty when none is deployed.
    #[serde(default)]
    pub studio_version: String,
    /// Installed DXVK version, empty when the prefix is unpatched.
    #[serde(default)]
    pub dxvk_version: String,
    #[serde(default)]
    pub updated_at: String,
    /// blake3 checksum for integrity verification. `None` for legacy files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl InstallationState {
    /// Compute the checksum over the record content (excluding the checksum
    /// field itself).
    fn compute_checksum(&self) -> Result<String, StateError> {
        let mut copy = self.clone();
        copy.checksum = None;
        let json = serde_json::to_string_pretty(&copy)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    /// Load the state file, returning the default record when it does not
    /// exist yet.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let state: Self = serde_json::from_str(&content)?;

        if let Some(ref expected) = state.checksum {
            let actual = state.compute_checksum()?;
            if actual != *expected {
                return Err(StateError::IntegrityFailure {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        Ok(state)
    }

    /// Persist the record atomically, stamping `updated_at` and embedding a
    /// fresh checksum.
    pub fn save(&mut self, path: &Path) -> Result<(), StateError> {
        self.updated_at = chrono::Utc::now().to_rfc3339();
        self.checksum = None;
        self.checksum = Some(self.compute_checksum()?);
        let content = serde_json::to_string_pretty(self)?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StateError::Io(e.error))?;

        debug!("saved installation state to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = InstallationState::load(&dir.path().join("state.json")).unwrap();
        assert_eq!(state, InstallationState::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = InstallationState {
            studio_version: "version-f00".to_owned(),
            dxvk_version: "2.3".to_owned(),
            ..Default::default()
        };
        state.save(&path).unwrap();

        let loaded = InstallationState::load(&path).unwrap();
        assert_eq!(loaded.studio_version, "version-f00");
        assert_eq!(loaded.dxvk_version, "2.3");
        assert!(!loaded.updated_at.is_empty());
        assert!(loaded.checksum.is_some());
    }

    #[test]
    fn tampered_state_fails_integrity_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = InstallationState {
            dxvk_version: "2.3".to_owned(),
            ..Default::default()
        };
        state.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, content.replace("2.3", "9.9")).unwrap();

        let result = InstallationState::load(&path);
        assert!(matches!(result, Err(StateError::IntegrityFailure { .. })));
    }

    #[test]
    fn legacy_file_without_checksum_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"studio_version":"version-abc","dxvk_version":""}"#).unwrap();

        let state = InstallationState::load(&path).unwrap();
        assert_eq!(state.studio_version, "version-abc");
        assert!(state.checksum.is_none());
    }
}
