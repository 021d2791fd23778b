//! Configuration management for the StockHub server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with STOCKHUB_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Stock ledger settings
    pub stock: StockConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,

    /// Requests running longer than this are aborted
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StockConfig {
    /// How many movements the unfiltered movement listing returns
    pub recent_movements_limit: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKHUB_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKHUB_ prefix)
            .add_source(
                Environment::with_prefix("STOCKHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.run_migrations", environment == "development")?
            .set_default("stock.recent_movements_limit", 200)?
            .set_default("logging.json", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_everything_but_database_url() {
        let config: Config = Config::builder("development")
            .unwrap()
            .set_override("database.url", "postgres://localhost/stockhub")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.environment, "development");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.stock.recent_movements_limit, 200);
        assert!(config.database.run_migrations);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_production_skips_migrations_by_default() {
        let config: Config = Config::builder("production")
            .unwrap()
            .set_override("database.url", "postgres://db/stockhub")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.environment, "production");
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn test_missing_database_url_fails() {
        let result: Result<Config, _> = Config::builder("development")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize();
        assert!(result.is_err());
    }
}
