// Layered settings: built-in defaults, then an optional TOML file, then
// JOBSTORE__* environment variables.

use config::{Config, ConfigError, Environment, File};
use jobstore_db::{ConnectionConfig, DEFAULT_LIMIT};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "jobstore";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: ConnectionConfig,
    pub query: QuerySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySettings {
    /// Page size for list queries that do not set `--limit`
    pub default_limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`
    pub format: String,
}

impl Settings {
    /// Load settings, reading `path` if given or `jobstore.toml` if present
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = ConnectionConfig::default();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .set_default("database.host", defaults.host)?
            .set_default("database.port", i64::from(defaults.port))?
            .set_default("database.name", defaults.name)?
            .set_default("query.default_limit", DEFAULT_LIMIT)?
            .set_default("logging.format", "pretty")?
            .add_source(file)
            .add_source(Environment::with_prefix("JOBSTORE").separator("__"))
            .build()?
            .try_deserialize()
    }
}
