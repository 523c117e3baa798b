//! Directory layout, persisted installation state, and configuration for solera.
//!
//! This crate owns everything solera remembers between runs: where the data
//! root lives (`Layout`), which application and DXVK versions are currently
//! installed (`InstallationState`), and the user-editable TOML configuration
//! (`Config`).

pub mod config;
pub mod layout;
pub mod state;

pub use config::Config;
pub use layout::Layout;
pub use state::InstallationState;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("failed to encode config: {0}")]
    ConfigEncode(#[from] toml::ser::Error),
    #[error("state file corrupt: checksum mismatch (expected {expected}, got {actual})")]
    IntegrityFailure { expected: String, actual: String },
}
