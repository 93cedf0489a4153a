//! Test helpers module
//!
//! This module provides utilities and helpers for testing the Church Admin API.
//! It includes the router-backed test context, fake data builders and the
//! optional PostgreSQL database helper.

#![allow(dead_code)]

pub mod test_context;
pub mod test_data;

pub use database_helper::*;
pub use test_context::*;
pub use test_data::*;
