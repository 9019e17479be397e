//! Shared library for Highlight Studio.
//!
//! This crate provides common functionality used by the client crate:
//! - Configuration management
//! - Backend data models
//! - Display formatting helpers
//! - Logging infrastructure

pub mod config;
pub mod display;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
