use pomate_core::error::Result;
use pomate_core::{Config, Database, SettingsStore};

/// Open the settings store at the configured database location.
pub fn open_settings(config: &Config) -> Result<SettingsStore> {
    let db = match config.database_path() {
        Some(path) => Database::open_at(path)?,
        None => Database::open()?,
    };
    Ok(SettingsStore::load(db, &config.defaults))
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
