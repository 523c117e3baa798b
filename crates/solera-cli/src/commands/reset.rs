use super::EXIT_SUCCESS;
use solera_core::Engine;

pub fn run(engine: &Engine) -> Result<u8, String> {
    engine.reset().map_err(|e| e.to_string())?;
    println!("prefix and logs reset");
    Ok(EXIT_SUCCESS)
}
