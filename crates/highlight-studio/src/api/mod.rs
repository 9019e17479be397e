//! Highlight backend API client.
//!
//! This module provides the single configured HTTP client every view talks
//! through, plus its error type.

pub mod client;
pub mod error;

pub use client::{StudioClient, UploadRequest};
pub use error::{ApiError, ApiResult};
