pub mod delete;
pub mod edit;
pub mod exec;
pub mod launch;
pub mod reset;

use indicatif::{ProgressBar, ProgressStyle};
use solera_core::{Action, CoreError, Dispatcher, Engine, Surface, Visibility};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Surface for the non-interactive CLI path: a spinner while busy, errors
/// recorded for the exit code, availability changes demoted to debug logs.
#[derive(Default)]
pub struct CliSurface {
    spinner: Mutex<Option<ProgressBar>>,
    error: Mutex<Option<String>>,
}

impl CliSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Surface for CliSurface {
    fn set_busy(&self, description: &str) {
        let pb = spinner(&format!("{description}..."));
        *self.spinner.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn set_idle(&self) {
        let pb = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pb) = pb {
            let failed = self
                .error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some();
            if failed {
                spin_fail(&pb, "failed");
            } else {
                spin_ok(&pb, "done");
            }
        }
    }

    fn present_error(&self, error: &CoreError) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = Some(error.to_string());
    }

    fn refresh(&self, visibility: &Visibility) {
        tracing::debug!(
            "prefix present: {}, deployments present: {}",
            visibility.prefix_exists,
            visibility.deployments_present
        );
    }
}

/// Submit one action through the dispatcher and block until it completes.
pub fn run_action(engine: &Arc<Engine>, action: Action) -> Result<u8, String> {
    let surface = Arc::new(CliSurface::new());
    let dispatcher = Dispatcher::new(Arc::clone(engine), surface.clone());

    let handle = dispatcher.submit(action).map_err(|e| e.to_string())?;
    handle
        .join()
        .map_err(|_| "action thread panicked".to_owned())?;

    match surface.take_error() {
        Some(msg) => Err(msg),
        None => Ok(EXIT_SUCCESS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_FAILURE);
        assert_ne!(EXIT_FAILURE, EXIT_CONFIG_ERROR);
    }

    #[test]
    fn spinner_helpers_finish_cleanly() {
        let pb = spinner("testing...");
        spin_ok(&pb, "done");
        let pb = spinner("testing...");
        spin_fail(&pb, "failed");
    }

    #[test]
    fn cli_surface_records_and_yields_the_error() {
        let surface = CliSurface::new();
        surface.set_busy("Doing a thing");
        surface.present_error(&CoreError::Io(std::io::Error::other("boom")));
        surface.set_idle();

        let msg = surface.take_error().unwrap();
        assert!(msg.contains("boom"));
        assert!(surface.take_error().is_none());
    }
}
