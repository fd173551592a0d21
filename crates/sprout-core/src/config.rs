use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Maximum number of plants a single user may track.
pub const DEFAULT_PLANT_QUOTA: u32 = 5;
pub const DEFAULT_POOL_SIZE: u32 = 8;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Top-level config (sprout.toml + SPROUT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SproutConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub garden: GardenConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Connections kept in the pool. Every operation checks out its own.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// How long a writer waits for SQLite's write lock before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GardenConfig {
    #[serde(default = "default_plant_quota")]
    pub plant_quota: u32,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            plant_quota: DEFAULT_PLANT_QUOTA,
        }
    }
}

fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}
fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}
fn default_plant_quota() -> u32 {
    DEFAULT_PLANT_QUOTA
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sprout/sprout.db", home)
}

impl SproutConfig {
    /// Load config from a TOML file with SPROUT_* env var overrides.
    ///
    /// Nested keys use a double underscore, e.g. `SPROUT_GARDEN__PLANT_QUOTA=3`.
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::SproutError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("SPROUT_").split("__"))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sprout/sprout.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config: SproutConfig = Figment::new()
            .merge(Toml::file(&path))
            .extract()
            .unwrap();
        assert_eq!(config.garden.plant_quota, DEFAULT_PLANT_QUOTA);
        assert_eq!(config.database.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.database.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert!(config.database.path.ends_with(".sprout/sprout.db"));
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprout.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/tmp/garden.db\"\n\n[garden]\nplant_quota = 3\n",
        )
        .unwrap();

        let config = SproutConfig::load(path.to_str()).unwrap();
        assert_eq!(config.database.path, "/tmp/garden.db");
        assert_eq!(config.database.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.garden.plant_quota, 3);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprout.toml");
        std::fs::write(&path, "[garden]\nplant_quota = \"lots\"\n").unwrap();

        let err = SproutConfig::load(path.to_str()).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
