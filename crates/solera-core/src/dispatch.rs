use crate::engine::Engine;
use crate::CoreError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::info;

/// The closed set of maintenance actions the dispatcher accepts.
///
/// Each variant carries a no-argument, error-returning operation on the
/// engine; there is no runtime registry and no string lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Uninstall,
    InstallDxvk,
    UninstallDxvk,
    InitPrefix,
    KillPrefix,
    DeletePrefix,
    SaveConfig,
    ClearCache,
    RunTricks,
    RunStudio,
}

impl Action {
    /// Human-readable description shown while the action is in flight.
    pub fn describe(self) -> &'static str {
        match self {
            Action::Install => "Installing Studio",
            Action::Uninstall => "Deleting all deployments",
            Action::InstallDxvk => "Installing DXVK",
            Action::UninstallDxvk => "Uninstalling DXVK",
            Action::InitPrefix => "Initializing wineprefix",
            Action::KillPrefix => "Killing wineprefix",
            Action::DeletePrefix => "Deleting wineprefix",
            Action::SaveConfig => "Saving configuration to file",
            Action::ClearCache => "Cleaning up cache folder",
            Action::RunTricks => "Executing Winetricks",
            Action::RunStudio => "Executing Studio",
        }
    }

    /// Only the long-running Studio session exposes a stop affordance.
    pub fn cancellable(self) -> bool {
        matches!(self, Action::RunStudio)
    }
}

/// Availability signals the interactive surface derives its affordances from.
///
/// Recomputed from the filesystem after every action rather than cached or
/// subscribed to; readers tolerate transient staleness by re-querying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub prefix_exists: bool,
    pub deployments_present: bool,
}

/// The interactive collaborator the dispatcher reports to.
pub trait Surface: Send + Sync {
    fn set_busy(&self, description: &str);
    fn set_idle(&self);
    fn present_error(&self, error: &CoreError);
    fn refresh(&self, visibility: &Visibility);
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("an action is already in flight, refusing {0:?}")]
    Busy(Action),
}

/// Single-slot action dispatcher.
///
/// Exactly one action may be in flight: an atomic busy flag rejects further
/// submissions until the current one completes, making serialization a real
/// invariant rather than a soft UI-level guarantee. Each accepted action runs
/// on its own thread so the interactive surface stays responsive; on
/// completion the surface gets the error (if any), a recomputed visibility,
/// and its idle state back — in that order, unconditionally.
pub struct Dispatcher {
    engine: Arc<Engine>,
    surface: Arc<dyn Surface>,
    busy: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new(engine: Arc<Engine>, surface: Arc<dyn Surface>) -> Self {
        Self {
            engine,
            surface,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Schedule `action` on a background thread.
    ///
    /// Returns the join handle so callers that want to block (the CLI) can;
    /// interactive callers just drop it.
    pub fn submit(&self, action: Action) -> Result<JoinHandle<()>, DispatchError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(DispatchError::Busy(action));
        }

        self.surface.set_busy(action.describe());

        let engine = Arc::clone(&self.engine);
        let surface = Arc::clone(&self.surface);
        let busy = Arc::clone(&self.busy);

        let handle = std::thread::spawn(move || {
            info!("{}...", action.describe());

            if let Err(error) = engine.run(action) {
                surface.present_error(&error);
            }
            surface.refresh(&engine.visibility());
            surface.set_idle();

            busy.store(false, Ordering::SeqCst);
        });

        Ok(handle)
    }
}
