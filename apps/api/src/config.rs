//! API server configuration.
//!
//! Layered with the `config` crate, later layers winning:
//!
//! ```text
//! ApiConfig::default()  ──►  smartpos.toml (optional)  ──►  SMARTPOS_* env vars
//! ```
//!
//! Every field maps to one environment variable, e.g. `http_port` is
//! `SMARTPOS_HTTP_PORT` and `jwt_secret` is `SMARTPOS_JWT_SECRET`.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "smartpos";
const ENV_PREFIX: &str = "SMARTPOS";

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// SQLite database file
    pub database_path: String,

    /// HTTP listen port
    pub http_port: u16,

    /// HS256 signing secret. Must be set in production.
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// Pool size
    pub db_max_connections: u32,

    /// How long a write waits for the database lock before the request
    /// fails with CONFLICT_ABORT
    pub db_busy_timeout_ms: u64,

    /// Give up connecting to the database after this long
    pub startup_max_elapsed_secs: u64,

    /// First manager account, created when no manager exists
    pub admin_username: String,
    pub admin_password: String,

    /// Audit channel capacity
    pub audit_buffer: usize,

    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            database_path: "./smartpos.db".to_string(),
            http_port: 8000,
            jwt_secret: "smartpos-dev-secret-change-in-production".to_string(),
            jwt_access_lifetime_secs: 12 * 60 * 60,
            db_max_connections: 8,
            db_busy_timeout_ms: 5_000,
            startup_max_elapsed_secs: 60,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            audit_buffer: 1_024,
            log_filter: "smartpos_api=info,smartpos_db=info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads defaults, then `smartpos.toml` if present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Self::from_settings(settings)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder().add_source(Config::try_from(&ApiConfig::default())?))
    }

    fn from_settings(settings: Config) -> Result<Self, ConfigError> {
        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("jwt_secret".to_string()));
        }
        if self.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_access_lifetime_secs".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("db_max_connections".to_string()));
        }
        if self.audit_buffer == 0 {
            return Err(ConfigError::InvalidValue("audit_buffer".to_string()));
        }
        if self.admin_username.trim().is_empty() || self.admin_password.is_empty() {
            return Err(ConfigError::MissingRequired("admin credentials".to_string()));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn load_toml(toml: &str) -> Result<ApiConfig, ConfigError> {
        let settings = ApiConfig::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        ApiConfig::from_settings(settings)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = load_toml("").unwrap();
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.jwt_access_lifetime_secs, 43_200);
        assert_eq!(config.admin_username, "admin");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = load_toml("http_port = 9100\ndb_busy_timeout_ms = 250").unwrap();
        assert_eq!(config.http_port, 9100);
        assert_eq!(config.db_busy_timeout_ms, 250);
        assert_eq!(config.database_path, "./smartpos.db");
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            load_toml("jwt_secret = \"  \""),
            Err(ConfigError::InvalidValue(field)) if field == "jwt_secret"
        ));
    }

    #[test]
    fn test_zero_connections_rejected() {
        assert!(matches!(
            load_toml("db_max_connections = 0"),
            Err(ConfigError::InvalidValue(field)) if field == "db_max_connections"
        ));
    }
}
