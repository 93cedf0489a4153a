//! Church Admin
//!
//! A REST API for church administration. This library provides modular
//! components for member records, small groups, attendance, donations,
//! events and reporting, with role-based access for staff accounts.

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ChurchAdminError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::create_router;
pub use services::ServiceFactory;
pub use state::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
