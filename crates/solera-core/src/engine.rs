use crate::dispatch::{Action, Visibility};
use crate::signal::shutdown_requested;
use crate::CoreError;
use solera_dxvk::{Downloader, HttpDownloader};
use solera_prefix::{
    wait_for_companion, Prefix, ProcProcessTable, ProcessTable, Runner, SystemRunner,
};
use solera_state::{Config, InstallationState, Layout};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const PLAYER_URL: &str = "https://www.roblox.com/download/client";
pub const STUDIO_URL: &str = "https://www.roblox.com/download/studio";

const COMPANION_POLL: Duration = Duration::from_secs(1);

/// Which of the two launchable applications a session runs.
///
/// Companion names are the kernel-truncated (15 byte) comm names of the
/// client processes the launchers re-exec into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player,
    Studio,
}

impl Role {
    pub fn launcher(self) -> &'static str {
        match self {
            Role::Player => "RobloxPlayerLauncher.exe",
            Role::Studio => "RobloxStudioLauncherBeta.exe",
        }
    }

    pub fn companion(self) -> &'static str {
        match self {
            Role::Player => "RobloxPlayerBet",
            Role::Studio => "RobloxStudioBet",
        }
    }

    pub fn fallback_url(self) -> &'static str {
        match self {
            Role::Player => PLAYER_URL,
            Role::Studio => STUDIO_URL,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Studio => "studio",
        }
    }
}

/// Central orchestration engine.
///
/// Owns the data-root layout, the single Wine prefix, and the collaborator
/// seams (process runner, downloader, process table). Each maintenance
/// operation executes its steps strictly sequentially; serialization across
/// operations is the [`Dispatcher`](crate::Dispatcher)'s job.
pub struct Engine {
    layout: Layout,
    config: Config,
    config_path: PathBuf,
    prefix: Prefix,
    downloader: Box<dyn Downloader>,
    ptable: Box<dyn ProcessTable>,
    poll_interval: Duration,
}

impl Engine {
    /// Create an engine with the production collaborators.
    pub fn new(
        data_root: impl Into<PathBuf>,
        config_path: impl Into<PathBuf>,
    ) -> Result<Self, CoreError> {
        Self::with_collaborators(
            data_root,
            config_path,
            Arc::new(SystemRunner),
            Box::new(HttpDownloader::new()),
            Box::new(ProcProcessTable),
            COMPANION_POLL,
        )
    }

    pub fn with_collaborators(
        data_root: impl Into<PathBuf>,
        config_path: impl Into<PathBuf>,
        runner: Arc<dyn Runner>,
        downloader: Box<dyn Downloader>,
        ptable: Box<dyn ProcessTable>,
        poll_interval: Duration,
    ) -> Result<Self, CoreError> {
        let layout = Layout::new(data_root);
        layout.initialize()?;

        let config_path = config_path.into();
        let config = Config::load(&config_path)?;

        let prefix = Prefix::new(layout.prefix_dir(), runner);
        for (key, val) in &config.env {
            prefix.set_env_var(key, val);
        }
        if let Some(ref wine_root) = config.wine_root {
            let path = std::env::var("PATH").unwrap_or_default();
            prefix.set_env_var("PATH", format!("{}/bin:{path}", wine_root.display()));
        }

        Ok(Self {
            layout,
            config,
            config_path,
            prefix,
            downloader,
            ptable,
            poll_interval,
        })
    }

    #[inline]
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> Result<InstallationState, CoreError> {
        Ok(InstallationState::load(&self.layout.state_path())?)
    }

    fn save_state(&self, state: &mut InstallationState) -> Result<(), CoreError> {
        state.save(&self.layout.state_path())?;
        Ok(())
    }

    /// Current availability signals, recomputed from the filesystem.
    pub fn visibility(&self) -> Visibility {
        Visibility {
            prefix_exists: self.prefix.exists(),
            deployments_present: self.layout.deployments_present(),
        }
    }

    /// Execute one dispatched maintenance action.
    pub fn run(&self, action: Action) -> Result<(), CoreError> {
        match action {
            Action::Install => self.install_studio(),
            Action::Uninstall => self.uninstall_studio(),
            Action::InstallDxvk => self.install_dxvk(),
            Action::UninstallDxvk => self.uninstall_dxvk(),
            Action::InitPrefix => self.init_prefix(),
            Action::KillPrefix => self.kill_prefix(),
            Action::DeletePrefix => self.delete_prefix(),
            Action::SaveConfig => self.save_config(),
            Action::ClearCache => self.clear_cache(),
            Action::RunTricks => self.run_tricks(),
            Action::RunStudio => self.run_session(Role::Studio, &[]),
        }
    }

    /// Fetch, extract, and activate the configured DXVK version.
    ///
    /// No-op when the installed tag already matches the configured version.
    pub fn install_dxvk(&self) -> Result<(), CoreError> {
        let version = self.config.dxvk_version.clone();
        let mut state = self.state()?;
        if state.dxvk_version == version && self.prefix.exists() {
            info!("DXVK {version} is already installed");
            return Ok(());
        }

        if !self.prefix.exists() {
            self.prefix.init()?;
        }

        let url = solera_dxvk::release_url(&version);
        let archive = solera_dxvk::fetch(&self.layout.cache_dir(), &url, &*self.downloader)?;
        solera_dxvk::extract(&archive, &self.prefix)?;
        solera_dxvk::set_overrides(&self.prefix);

        state.dxvk_version = version;
        self.save_state(&mut state)
    }

    /// Remove the DXVK DLL set and clear its version tag.
    pub fn uninstall_dxvk(&self) -> Result<(), CoreError> {
        solera_dxvk::remove(&self.prefix)?;

        let mut state = self.state()?;
        state.dxvk_version.clear();
        self.save_state(&mut state)
    }

    pub fn init_prefix(&self) -> Result<(), CoreError> {
        Ok(self.prefix.init()?)
    }

    pub fn kill_prefix(&self) -> Result<(), CoreError> {
        Ok(self.prefix.kill()?)
    }

    /// Kill the prefix, remove its directory tree, and clear the DXVK tag
    /// (the DLLs it tagged are gone with the tree).
    pub fn delete_prefix(&self) -> Result<(), CoreError> {
        self.prefix.delete()?;

        let mut state = self.state()?;
        state.dxvk_version.clear();
        self.save_state(&mut state)
    }

    /// Deploy the Studio launcher and run it once so it can install itself.
    pub fn install_studio(&self) -> Result<(), CoreError> {
        if !self.prefix.exists() {
            self.prefix.init()?;
        }

        let role = Role::Studio;
        let installer =
            solera_dxvk::fetch(&self.layout.cache_dir(), role.fallback_url(), &*self.downloader)?;

        let dest_dir = self.layout.versions_dir().join(role.tag());
        fs::create_dir_all(&dest_dir)?;
        let dest = dest_dir.join(role.launcher());
        fs::copy(&installer, &dest)?;

        // First run lets the launcher install or update its own deployment.
        let dest_str = dest.to_string_lossy().into_owned();
        self.prefix.exec("wine", &[dest_str.as_str()])?;

        let mut state = self.state()?;
        state.studio_version = role.tag().to_owned();
        self.save_state(&mut state)
    }

    /// Remove every deployment and clear the Studio version tag.
    pub fn uninstall_studio(&self) -> Result<(), CoreError> {
        let versions = self.layout.versions_dir();
        if versions.exists() {
            info!("deleting all deployments under {}", versions.display());
            fs::remove_dir_all(&versions)?;
        }

        let mut state = self.state()?;
        state.studio_version.clear();
        self.save_state(&mut state)
    }

    /// Remove everything beneath the cache directory, keeping the directory.
    pub fn clear_cache(&self) -> Result<(), CoreError> {
        let cache = self.layout.cache_dir();
        for entry in fs::read_dir(&cache)? {
            let entry = entry?;
            debug!("removing cache entry {}", entry.path().display());
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    pub fn save_config(&self) -> Result<(), CoreError> {
        Ok(self.config.save(&self.config_path)?)
    }

    pub fn run_tricks(&self) -> Result<(), CoreError> {
        Ok(self.prefix.exec("winetricks", &[])?)
    }

    /// Run a command inside the prefix (the CLI `exec` verb).
    pub fn exec(&self, args: &[String]) -> Result<(), CoreError> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Ok(self.prefix.exec("wine", &args)?)
    }

    /// Spawn the role's launcher without waiting for it to exit.
    ///
    /// The launcher re-execs into the client process, so its own exit means
    /// nothing; callers follow up with a companion wait. When no deployment
    /// is installed the installer is fetched from the role's fallback URL and
    /// spawned instead.
    pub fn launch(&self, role: Role, args: &[String]) -> Result<(), CoreError> {
        if !self.prefix.exists() {
            self.prefix.init()?;
        }

        let deployed = self
            .layout
            .versions_dir()
            .join(role.tag())
            .join(role.launcher());
        let exe = if deployed.is_file() {
            deployed
        } else {
            info!("no {} deployment installed, fetching the launcher", role.tag());
            solera_dxvk::fetch(&self.layout.cache_dir(), role.fallback_url(), &*self.downloader)?
        };

        let exe = exe.to_string_lossy().into_owned();
        let mut wine_args = vec![exe.as_str()];
        wine_args.extend(args.iter().map(String::as_str));
        Ok(self.prefix.spawn("wine", &wine_args)?)
    }

    /// Launch a session, block until its companion process starts and then
    /// ends, and kill the prefix unconditionally afterwards so no orphaned
    /// processes survive — regardless of how the session ended.
    pub fn run_session(&self, role: Role, args: &[String]) -> Result<(), CoreError> {
        self.launch(role, args)?;
        wait_for_companion(
            &*self.ptable,
            role.companion(),
            self.poll_interval,
            &shutdown_requested,
        );
        self.prefix.kill()?;
        Ok(())
    }

    /// Remove the whole data root (the CLI `delete` verb).
    pub fn delete_data(&self) -> Result<(), CoreError> {
        info!("deleting data root {}", self.layout.root().display());
        if self.layout.root().exists() {
            fs::remove_dir_all(self.layout.root())?;
        }
        Ok(())
    }

    /// Delete and recreate the prefix and logs directories (the CLI `reset`
    /// verb). The recreated prefix directory is empty; `init` builds it out.
    pub fn reset(&self) -> Result<(), CoreError> {
        self.delete_prefix()?;

        let logs = self.layout.logs_dir();
        if logs.exists() {
            fs::remove_dir_all(&logs)?;
        }
        fs::create_dir_all(self.layout.prefix_dir())?;
        fs::create_dir_all(&logs)?;
        Ok(())
    }
}
