//! Highlight Studio client library.
//!
//! Talks to the highlight backend over HTTP: uploads videos, follows their
//! processing status, and renders highlights and content plans as text.

pub mod api;
pub mod app;
pub mod poller;
pub mod routes;
pub mod views;

pub use api::{ApiError, ApiResult, StudioClient, UploadRequest};
pub use app::App;
pub use poller::{PollEvent, PollHandle, StatusPoller};
pub use routes::Route;
