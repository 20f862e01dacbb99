//! dg-config: plant configuration file format and validation.

pub mod migrate;
pub mod schema;
pub mod validate;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::PlantConfig;
pub use validate::{ValidationError, validate_config};

use std::path::Path;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Simulation error: {0}")]
    Simulation(#[from] dg_sim::SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_yaml_str(content: &str) -> ConfigResult<PlantConfig> {
    let config: PlantConfig = serde_yaml::from_str(content)?;
    finish(config)
}

pub fn from_json_str(content: &str) -> ConfigResult<PlantConfig> {
    let config: PlantConfig = serde_json::from_str(content)?;
    finish(config)
}

/// Load a configuration, picking the format from the file extension.
/// Anything other than `.json` is read as YAML.
pub fn load(path: &Path) -> ConfigResult<PlantConfig> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

pub fn load_yaml(path: &Path) -> ConfigResult<PlantConfig> {
    from_yaml_str(&std::fs::read_to_string(path)?)
}

pub fn save_yaml(path: &Path, config: &PlantConfig) -> ConfigResult<()> {
    validate_config(config)?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ConfigResult<PlantConfig> {
    from_json_str(&std::fs::read_to_string(path)?)
}

pub fn save_json(path: &Path, config: &PlantConfig) -> ConfigResult<()> {
    validate_config(config)?;
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn finish(config: PlantConfig) -> ConfigResult<PlantConfig> {
    let config = migrate_to_latest(config)?;
    validate_config(&config)?;
    Ok(config)
}
