use super::EXIT_SUCCESS;
use solera_core::{Engine, Role};

/// Launch a player or studio session and block until it ends.
///
/// The session wait honors ctrl-c: the first signal abandons the companion
/// wait and the prefix is killed on the way out either way.
pub fn run(engine: &Engine, role: Role, args: &[String]) -> Result<u8, String> {
    engine.run_session(role, args).map_err(|e| e.to_string())?;
    Ok(EXIT_SUCCESS)
}
