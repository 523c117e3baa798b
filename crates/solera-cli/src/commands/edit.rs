use super::EXIT_SUCCESS;
use solera_state::Config;
use std::path::Path;
use std::process::Command;

/// Open the configuration file in `$EDITOR`, seeding it with defaults first
/// when it does not exist, and validate the result.
pub fn run(config_path: &Path) -> Result<u8, String> {
    if !config_path.exists() {
        Config::default()
            .save(config_path)
            .map_err(|e| e.to_string())?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_owned());
    let status = Command::new(&editor)
        .arg(config_path)
        .status()
        .map_err(|e| format!("failed to launch editor '{editor}': {e}"))?;
    if !status.success() {
        return Err(format!("editor '{editor}' exited with failure"));
    }

    // Surface a parse error now rather than on the next run.
    Config::load(config_path).map_err(|e| e.to_string())?;
    Ok(EXIT_SUCCESS)
}
