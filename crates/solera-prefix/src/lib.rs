//! Wine prefix lifecycle and process supervision for solera.
//!
//! This crate implements the execution layer: the `Runner` trait over an
//! external process-execution collaborator, the `Prefix` lifecycle state
//! machine (init, exec, kill, delete), and companion-process supervision via
//! the `ProcessTable` capability.

pub mod mock;
pub mod prefix;
pub mod process;
pub mod runner;

pub use prefix::{validate_transition, Prefix, PrefixState};
pub use process::{wait_for_companion, ProcProcessTable, ProcessTable};
pub use runner::{RunSpec, Runner, SystemRunner};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefixError {
    #[error("prefix I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command '{command}' exited with status {code}")]
    Exit { command: String, code: i32 },
    #[error("invalid prefix state transition: {from} -> {to}")]
    InvalidTransition { from: PrefixState, to: PrefixState },
}
