//! Maintenance-action orchestration for solera.
//!
//! Ties the prefix lifecycle, DXVK patch engine, and persisted state together
//! into the `Engine` — one method per maintenance operation — and runs those
//! operations off the interactive thread through the single-slot `Dispatcher`.

pub mod dispatch;
pub mod engine;
pub mod signal;

pub use dispatch::{Action, DispatchError, Dispatcher, Surface, Visibility};
pub use engine::{Engine, Role, PLAYER_URL, STUDIO_URL};
pub use signal::{install_signal_handler, shutdown_requested};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("prefix error: {0}")]
    Prefix(#[from] solera_prefix::PrefixError),
    #[error("dxvk error: {0}")]
    Dxvk(#[from] solera_dxvk::DxvkError),
    #[error("state error: {0}")]
    State(#[from] solera_state::StateError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
