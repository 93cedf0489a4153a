//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Church Admin application.

use std::path::Path;

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::utils::errors::{ChurchAdminError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ChurchAdminError::Config(format!("Invalid log filter: {}", e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match config.file_path.as_deref().filter(|p| !p.is_empty()) {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(Path::new(dir), "church-admin.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ChurchAdminError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log member record changes
pub fn log_member_action(member_id: i64, action: &str, user_id: i64) {
    info!(
        member_id = member_id,
        action = action,
        user_id = user_id,
        "Member action performed"
    );
}

/// Log small group membership changes
pub fn log_group_event(group_id: i64, event: &str, member_id: Option<i64>, details: Option<&str>) {
    info!(
        group_id = group_id,
        event = event,
        member_id = member_id,
        details = details,
        "Group event occurred"
    );
}

/// Log destructive or bulk actions taken by staff
pub fn log_admin_action(user_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        user_id = user_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}
