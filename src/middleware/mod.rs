//! Middleware module
//!
//! This module contains request authentication and request logging

pub mod auth;
pub mod logging;

// Re-export commonly used middleware
pub use auth::{AuthUser, MANAGE_ROLES, WRITE_ROLES};
pub use logging::request_logging;
