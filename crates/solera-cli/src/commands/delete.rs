use super::EXIT_SUCCESS;
use solera_core::Engine;

pub fn run(engine: &Engine) -> Result<u8, String> {
    engine.delete_data().map_err(|e| e.to_string())?;
    println!(
        "deleted data directory {}",
        engine.layout().root().display()
    );
    Ok(EXIT_SUCCESS)
}
