//! State management module
//!
//! This module holds the shared application state handed to request handlers

pub mod context;

pub use context::AppState;
