//! Integration tests module
//!
//! Organized by resource, plus end-to-end scenarios.

pub mod attendance_test;
pub mod auth_test;
pub mod export_test;
pub mod groups_test;
pub mod members_test;
pub mod reports_test;
