//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ChurchAdminError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(ChurchAdminError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.body_limit_bytes == 0 {
        return Err(ChurchAdminError::Config(
            "Body limit must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ChurchAdminError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(ChurchAdminError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(ChurchAdminError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate token configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(ChurchAdminError::Config(
            "JWT secret is required".to_string()
        ));
    }

    if config.token_ttl_hours <= 0 {
        return Err(ChurchAdminError::Config(
            "Token lifetime must be greater than 0".to_string()
        ));
    }

    if config.seed_admin_email.is_some() != config.seed_admin_password.is_some() {
        return Err(ChurchAdminError::Config(
            "Seed admin email and password must be configured together".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ChurchAdminError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ChurchAdminError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
