use crate::StateError;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory layout for a solera data root.
///
/// Manages paths for the Wine prefix, download cache, installed Studio
/// deployments, logs, and the persisted installation state. Directories are
/// created lazily by [`initialize`](Self::initialize).
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn prefix_dir(&self) -> PathBuf {
        self.root.join("prefix")
    }

    #[inline]
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    #[inline]
    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    #[inline]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    #[inline]
    pub fn state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    /// Create the directories every run needs. The prefix and versions
    /// directories are roots owned by their respective engines and are not
    /// pre-created here.
    pub fn initialize(&self) -> Result<(), StateError> {
        for dir in [self.root.clone(), self.cache_dir(), self.logs_dir()] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Whether any Studio deployment is present under the versions directory.
    pub fn deployments_present(&self) -> bool {
        let dir = self.versions_dir();
        match fs::read_dir(&dir) {
            Ok(mut entries) => entries.next().is_some(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_creates_runtime_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path().join("data"));
        layout.initialize().unwrap();
        assert!(layout.cache_dir().is_dir());
        assert!(layout.logs_dir().is_dir());
        // Owned by their engines, created on demand
        assert!(!layout.prefix_dir().exists());
        assert!(!layout.versions_dir().exists());
    }

    #[test]
    fn deployments_present_reflects_directory_contents() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        assert!(!layout.deployments_present());

        std::fs::create_dir_all(layout.versions_dir()).unwrap();
        assert!(!layout.deployments_present());

        std::fs::create_dir_all(layout.versions_dir().join("version-abc123")).unwrap();
        assert!(layout.deployments_present());
    }
}
