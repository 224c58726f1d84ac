//! Configuration management for Lectern

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

/// Default administrator created when the store holds no users
#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    pub admin_id: String,
    pub admin_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Built-in defaults so the binary runs with no config file
            .set_default("database.url", "sqlite://lectern.db?mode=rwc")?
            .set_default("database.max_connections", 1)?
            .set_default("logging.level", "info")?
            .set_default("seed.admin_id", "admin123")?
            .set_default("seed.admin_name", "Administrator")?
            // Optional configuration files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LECTERN_)
            .add_source(
                Environment::with_prefix("LECTERN")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override database URL from DATABASE_URL env var if present
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://lectern.db?mode=rwc".to_string(),
            max_connections: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_id: "admin123".to_string(),
            admin_name: "Administrator".to_string(),
        }
    }
}
