//! Schema migration.

use crate::ConfigError;
use crate::schema::PlantConfig;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut config: PlantConfig) -> Result<PlantConfig, ConfigError> {
    while config.version < LATEST_VERSION {
        config = migrate_one_version(config)?;
    }
    Ok(config)
}

fn migrate_one_version(config: PlantConfig) -> Result<PlantConfig, ConfigError> {
    match config.version {
        0 => migrate_v0_to_v1(config),
        v => Err(ConfigError::Migration {
            what: format!("No migration path from version {v}"),
        }),
    }
}

// Version 0 only marks a file written without a version field. Its layout
// equals version 1, so the step just stamps the number.
fn migrate_v0_to_v1(mut config: PlantConfig) -> Result<PlantConfig, ConfigError> {
    config.version = 1;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unversioned_file_becomes_latest() {
        let config = PlantConfig {
            version: 0,
            ..PlantConfig::default()
        };
        let migrated = migrate_to_latest(config).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated, PlantConfig::default());
    }

    #[test]
    fn default_is_latest() {
        assert_eq!(PlantConfig::default().version, LATEST_VERSION);
    }
}
