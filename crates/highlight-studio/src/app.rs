//! Top-level application state.
//!
//! `App` owns the video list and the single error banner. The list is an
//! immutable snapshot that every successful operation replaces wholesale, so
//! a view holding an older snapshot never observes a partial update.

use crate::api::{ApiResult, StudioClient, UploadRequest};
use shared::{RecordId, Video};
use std::sync::Arc;
use tracing::{error, info};

pub const FETCH_VIDEOS_FAILED: &str = "Failed to fetch videos. Please try again later.";
pub const UPLOAD_FAILED: &str = "Failed to upload video. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete video. Please try again.";

/// Owner of the video list and the shared error banner
pub struct App {
    client: StudioClient,
    videos: Arc<Vec<Video>>,
    error: Option<String>,
    loading: bool,
}

impl App {
    pub fn new(client: StudioClient) -> Self {
        Self {
            client,
            videos: Arc::new(Vec::new()),
            error: None,
            loading: false,
        }
    }

    /// Create the app and fetch the video list once
    pub async fn start(client: StudioClient) -> Self {
        let mut app = Self::new(client);
        app.refresh().await;
        app
    }

    /// Current snapshot of the video list
    pub fn videos(&self) -> Arc<Vec<Video>> {
        Arc::clone(&self.videos)
    }

    /// Message for the error banner, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Refetch the whole video list
    pub async fn refresh(&mut self) {
        self.begin();

        match self.client.list_videos().await {
            Ok(videos) => {
                info!(count = videos.len(), "Fetched videos");
                self.videos = Arc::new(videos);
            }
            Err(e) => {
                error!(error = %e, "Error fetching videos");
                self.error = Some(FETCH_VIDEOS_FAILED.to_string());
            }
        }

        self.loading = false;
    }

    /// Upload a video and append the backend's record to the list.
    ///
    /// The error is returned as well so the caller can keep its form filled.
    pub async fn upload(&mut self, request: &UploadRequest) -> ApiResult<Video> {
        self.begin();
        let result = self.client.upload_video(request).await;
        self.loading = false;

        match result {
            Ok(video) => {
                let mut next = Vec::with_capacity(self.videos.len() + 1);
                next.extend(self.videos.iter().cloned());
                next.push(video.clone());
                self.videos = Arc::new(next);
                Ok(video)
            }
            Err(e) => {
                error!(error = %e, "Error uploading video");
                self.error = Some(UPLOAD_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Delete a video; on success exactly that id leaves the list.
    pub async fn delete(&mut self, id: &RecordId) -> bool {
        self.begin();
        let result = self.client.delete_video(id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                let remaining = self
                    .videos
                    .iter()
                    .filter(|video| &video.id != id)
                    .cloned()
                    .collect();
                self.videos = Arc::new(remaining);
                true
            }
            Err(e) => {
                error!(video_id = %id, error = %e, "Error deleting video");
                self.error = Some(DELETE_FAILED.to_string());
                false
            }
        }
    }
}
