use crate::runner::{RunSpec, Runner};
use crate::PrefixError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Lifecycle states of a Wine prefix.
///
/// `Running` is never observable from the filesystem; directory presence is
/// the only detectable signal, so [`Prefix::state`] reports `Absent` or
/// `Ready` and `exec` passes through `Running` for the duration of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixState {
    Absent,
    Ready,
    Running,
}

impl std::fmt::Display for PrefixState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixState::Absent => write!(f, "absent"),
            PrefixState::Ready => write!(f, "ready"),
            PrefixState::Running => write!(f, "running"),
        }
    }
}

pub fn validate_transition(from: PrefixState, to: PrefixState) -> Result<(), PrefixError> {
    let valid = matches!(
        (from, to),
        // init is idempotent: re-running against a ready prefix resyncs it
        (PrefixState::Absent | PrefixState::Ready, PrefixState::Ready)
            | (PrefixState::Ready, PrefixState::Running)
            | (PrefixState::Running, PrefixState::Ready)
            | (_, PrefixState::Absent)
    );

    if valid {
        Ok(())
    } else {
        Err(PrefixError::InvalidTransition { from, to })
    }
}

/// A single Wine prefix: one directory tree holding a self-contained
/// Windows-compatibility environment.
///
/// The prefix owns its directory exclusively. `exists` is a pure filesystem
/// predicate, re-evaluated on every call rather than cached, because the
/// directory is the only reliable signal of prefix state.
pub struct Prefix {
    root: PathBuf,
    runner: Arc<dyn Runner>,
    env: Mutex<BTreeMap<String, String>>,
}

impl Prefix {
    pub fn new(root: impl Into<PathBuf>, runner: Arc<dyn Runner>) -> Self {
        Self {
            root: root.into(),
            runner,
            env: Mutex::new(BTreeMap::new()),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn state(&self) -> PrefixState {
        if self.exists() {
            PrefixState::Ready
        } else {
            PrefixState::Absent
        }
    }

    /// Read back an environment variable previously set for spawned processes.
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Set an environment variable for every subsequently spawned process.
    ///
    /// This is the single write path for process-wide spawn environment;
    /// callers that append to a variable read it back first and write the
    /// merged value.
    pub fn set_env_var(&self, key: impl Into<String>, value: impl Into<String>) {
        self.env
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    fn spec(&self, program: &str, args: &[&str]) -> RunSpec {
        let mut env = vec![("WINEPREFIX".to_owned(), self.root.display().to_string())];
        {
            let extra = self.env.lock().unwrap_or_else(PoisonError::into_inner);
            env.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        RunSpec {
            program: program.to_owned(),
            args: args.iter().map(|&a| a.to_owned()).collect(),
            env,
            cwd: self.root.is_dir().then(|| self.root.clone()),
        }
    }

    /// Create the prefix directory and let Wine (re)synchronize it.
    ///
    /// Idempotent: running against an already-initialized prefix is safe.
    pub fn init(&self) -> Result<(), PrefixError> {
        validate_transition(self.state(), PrefixState::Ready)?;
        info!("initializing wine prefix at {}", self.root.display());
        fs::create_dir_all(&self.root)?;
        self.runner.run(&self.spec("wineboot", &[]))
    }

    /// Re-synchronize the prefix's registry and file associations.
    pub fn reboot(&self) -> Result<(), PrefixError> {
        info!("restoring wineprefix DLL associations");
        self.exec("wineboot", &["-u"])
    }

    /// Run a command inside the prefix and wait for it to exit.
    pub fn exec(&self, program: &str, args: &[&str]) -> Result<(), PrefixError> {
        validate_transition(self.state(), PrefixState::Running)?;
        let spec = self.spec(program, args);
        debug!("exec in prefix: {}", spec.render());
        self.runner.run(&spec)
    }

    /// Start a command inside the prefix without waiting for it to exit.
    pub fn spawn(&self, program: &str, args: &[&str]) -> Result<(), PrefixError> {
        validate_transition(self.state(), PrefixState::Running)?;
        let spec = self.spec(program, args);
        debug!("spawn in prefix: {}", spec.render());
        self.runner.spawn(&spec)
    }

    /// Forcibly terminate every process associated with the prefix.
    ///
    /// Valid from any state; used defensively since nothing tracks whether
    /// something is actually running.
    pub fn kill(&self) -> Result<(), PrefixError> {
        info!("killing wineprefix processes");
        self.runner.run(&self.spec("wineserver", &["-k"]))
    }

    /// Kill the prefix, then remove its entire directory tree.
    pub fn delete(&self) -> Result<(), PrefixError> {
        self.kill()?;
        info!("deleting wine prefix at {}", self.root.display());
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;

    fn prefix_at(root: &Path) -> (Arc<MockRunner>, Prefix) {
        let runner = Arc::new(MockRunner::new());
        let prefix = Prefix::new(root, runner.clone());
        (runner, prefix)
    }

    #[test]
    fn valid_transitions() {
        assert!(validate_transition(PrefixState::Absent, PrefixState::Ready).is_ok());
        assert!(validate_transition(PrefixState::Ready, PrefixState::Ready).is_ok());
        assert!(validate_transition(PrefixState::Ready, PrefixState::Running).is_ok());
        assert!(validate_transition(PrefixState::Running, PrefixState::Ready).is_ok());
        assert!(validate_transition(PrefixState::Absent, PrefixState::Absent).is_ok());
        assert!(validate_transition(PrefixState::Running, PrefixState::Absent).is_ok());
    }

    #[test]
    fn invalid_transitions() {
        assert!(validate_transition(PrefixState::Absent, PrefixState::Running).is_err());
        assert!(validate_transition(PrefixState::Running, PrefixState::Running).is_err());
    }

    #[test]
    fn exists_is_never_cached() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pfx");
        let (_, prefix) = prefix_at(&root);

        assert!(!prefix.exists());
        prefix.init().unwrap();
        assert!(prefix.exists());

        // Mutate the filesystem behind the prefix's back: it must notice.
        fs::remove_dir_all(&root).unwrap();
        assert!(!prefix.exists());
        fs::create_dir_all(&root).unwrap();
        assert!(prefix.exists());

        prefix.delete().unwrap();
        assert!(!prefix.exists());
    }

    #[test]
    fn exec_on_absent_prefix_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let (runner, prefix) = prefix_at(&dir.path().join("pfx"));

        let err = prefix.exec("wine", &["notepad"]).unwrap_err();
        assert!(matches!(err, PrefixError::InvalidTransition { .. }));
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn delete_kills_before_removing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pfx");
        let (runner, prefix) = prefix_at(&root);

        prefix.init().unwrap();
        fs::write(root.join("marker"), "x").unwrap();
        prefix.delete().unwrap();

        assert_eq!(
            runner.invocations(),
            vec!["wineboot".to_owned(), "wineserver -k".to_owned()]
        );
        assert!(!root.exists());
    }

    #[test]
    fn delete_propagates_kill_failure_and_keeps_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pfx");
        let (runner, prefix) = prefix_at(&root);

        prefix.init().unwrap();
        runner.fail_program("wineserver", 1);

        assert!(prefix.delete().is_err());
        assert!(root.exists());
    }

    #[test]
    fn exec_passes_prefix_environment() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pfx");
        let (runner, prefix) = prefix_at(&root);

        prefix.init().unwrap();
        prefix.set_env_var("WINEDLLOVERRIDES", "dxgi=n");
        prefix.exec("wine", &["app.exe"]).unwrap();

        let calls = runner.calls();
        let spec = calls.last().unwrap();
        assert!(spec
            .env
            .contains(&("WINEPREFIX".to_owned(), root.display().to_string())));
        assert!(spec
            .env
            .contains(&("WINEDLLOVERRIDES".to_owned(), "dxgi=n".to_owned())));
        assert_eq!(spec.cwd.as_deref(), Some(root.as_path()));
    }
}
