//! Client-side routes.

use shared::RecordId;
use std::fmt;

/// Every page the client can show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Dashboard,
    /// `/upload`
    Upload,
    /// `/videos/{id}`
    VideoDetail(RecordId),
    /// `/videos/{id}/content-plan`
    ContentPlan(RecordId),
    /// Anything else
    NotFound(String),
}

impl Route {
    /// Parse a path; unknown paths map to [`Route::NotFound`].
    ///
    /// One trailing slash, a query string and a fragment are ignored.
    /// Empty segments (`/videos//3`) match nothing.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        match segments.as_slice() {
            [] => Route::Dashboard,
            ["upload"] => Route::Upload,
            ["videos", id] if !id.is_empty() => Route::VideoDetail(RecordId::from(*id)),
            ["videos", id, "content-plan"] if !id.is_empty() => {
                Route::ContentPlan(RecordId::from(*id))
            }
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::Upload => "/upload".to_string(),
            Route::VideoDetail(id) => format!("/videos/{}", id),
            Route::ContentPlan(id) => format!("/videos/{}/content-plan", id),
            Route::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
