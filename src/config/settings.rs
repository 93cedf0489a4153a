//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `production` hides error details in responses
    pub environment: String,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL, or `memory://` for the in-process store
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Token and bootstrap account configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub seed_admin_name: Option<String>,
    pub seed_admin_email: Option<String>,
    pub seed_admin_password: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily rolling log file; unset logs to stdout only
    pub file_path: Option<String>,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name("config.local").required(false))
            .add_source(
                config::Environment::with_prefix("CHURCH_ADMIN")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ChurchAdminError> {
        super::validation::validate_settings(self)
    }

    pub fn is_production(&self) -> bool {
        self.server.environment.eq_ignore_ascii_case("production")
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database.url.starts_with("memory://")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                environment: "development".to_string(),
                cors_origins: vec![],
                body_limit_bytes: 10 * 1024 * 1024,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/church_management".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                token_ttl_hours: 24 * 7,
                seed_admin_name: Some("Admin".to_string()),
                seed_admin_email: None,
                seed_admin_password: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                json: false,
            },
        }
    }
}
