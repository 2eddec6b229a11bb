//! Application configuration
//!
//! Loaded from `CLINIC_`-prefixed environment variables, with a `.env`
//! file honoured for local development.

use serde::Deserialize;

use infra_db::DatabaseConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Minimum number of pooled connections
    pub min_connections: u32,
    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/clinic".to_string(),
            max_connections: 10,
            min_connections: 2,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment
    ///
    /// Reads `CLINIC_DATABASE_URL`, `CLINIC_MAX_CONNECTIONS`,
    /// `CLINIC_MIN_CONNECTIONS`, and `CLINIC_LOG_LEVEL`, falling back to
    /// defaults for anything unset. A `.env` file is loaded first when
    /// present.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = AppConfig::default();
        config::Config::builder()
            .set_default("database_url", defaults.database_url)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("min_connections", i64::from(defaults.min_connections))?
            .set_default("log_level", defaults.log_level)?
            .add_source(config::Environment::with_prefix("CLINIC"))
            .build()?
            .try_deserialize()
    }

    /// Pool configuration for [`infra_db::create_pool`]
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url)
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
    }
}
