use super::EXIT_SUCCESS;
use solera_core::Engine;

pub fn run(engine: &Engine, args: &[String]) -> Result<u8, String> {
    engine.exec(args).map_err(|e| e.to_string())?;
    Ok(EXIT_SUCCESS)
}
