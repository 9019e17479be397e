//! Video detail view.
//!
//! Shows one video. While the backend is still working on it the view
//! follows the status endpoint through a [`StatusPoller`]; once processing
//! completes it refetches the video and then its highlights. Those two
//! requests are independent reads, so the highlight list may briefly lag
//! behind a video that already reports COMPLETED.

use super::{highlight_card, progress_bar, render_error_view, Confirm, DELETE_PROMPT};
use crate::api::StudioClient;
use crate::app::App;
use crate::poller::{PollEvent, StatusPoller};
use crate::routes::Route;
use shared::config::{PlayerConfig, PollingConfig};
use shared::display::{format_calendar_date, format_duration};
use shared::{Highlight, ProcessingStatus, RecordId, Video};
use tracing::{debug, error, info, warn};

pub const LOAD_FAILED: &str = "Failed to load video details. Please try again later.";
pub const PROCESSING_FAILED: &str = "An error occurred while processing the video.";
pub const POLL_STALLED: &str = "Lost contact with the processing service. Please try again later.";

/// What the detail view is showing
#[derive(Debug, Clone)]
pub enum DetailState {
    Loading,
    /// Backend still working; `status` is the latest polled status
    Processing {
        video: Video,
        status: Option<ProcessingStatus>,
    },
    Completed {
        video: Video,
        highlights: Vec<Highlight>,
        /// Index into `highlights` of the clip in the player
        selected: Option<usize>,
    },
    /// Processing failed or polling gave up
    Failed { video: Video, message: String },
    /// The video or its highlights could not be fetched
    LoadError { message: String },
}

/// Discriminant of [`DetailState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Loading,
    Processing,
    Completed,
    Failed,
    LoadError,
}

impl DetailState {
    pub fn kind(&self) -> StateKind {
        match self {
            DetailState::Loading => StateKind::Loading,
            DetailState::Processing { .. } => StateKind::Processing,
            DetailState::Completed { .. } => StateKind::Completed,
            DetailState::Failed { .. } => StateKind::Failed,
            DetailState::LoadError { .. } => StateKind::LoadError,
        }
    }

    /// Put the highlight at `index` in the player.
    ///
    /// Returns false if there is no such highlight.
    pub fn select(&mut self, index: usize) -> bool {
        match self {
            DetailState::Completed {
                highlights,
                selected,
                ..
            } if index < highlights.len() => {
                *selected = Some(index);
                true
            }
            _ => false,
        }
    }

    fn load_error() -> Self {
        DetailState::LoadError {
            message: LOAD_FAILED.to_string(),
        }
    }
}

/// The detail view for one video
pub struct VideoDetail {
    client: StudioClient,
    video_id: RecordId,
    poller: StatusPoller,
}

impl VideoDetail {
    pub fn new(client: StudioClient, video_id: RecordId, polling: &PollingConfig) -> Self {
        Self {
            client,
            video_id,
            poller: StatusPoller::new(polling),
        }
    }

    pub fn video_id(&self) -> &RecordId {
        &self.video_id
    }

    async fn with_highlights(&self, video: Video) -> DetailState {
        match self.client.get_highlights(&self.video_id).await {
            Ok(highlights) => {
                let selected = if highlights.is_empty() { None } else { Some(0) };
                DetailState::Completed {
                    video,
                    highlights,
                    selected,
                }
            }
            Err(e) => {
                error!(video_id = %self.video_id, error = %e, "Error fetching highlights");
                DetailState::load_error()
            }
        }
    }

    /// Fetch the video once and decide the initial state
    pub async fn load(&self) -> DetailState {
        let video = match self.client.get_video(&self.video_id).await {
            Ok(video) => video,
            Err(e) => {
                error!(video_id = %self.video_id, error = %e, "Error fetching video details");
                return DetailState::load_error();
            }
        };

        match video.processing_status {
            ProcessingStatus::Completed => self.with_highlights(video).await,
            ProcessingStatus::Error => {
                let message = video
                    .error_message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| PROCESSING_FAILED.to_string());
                DetailState::Failed { video, message }
            }
            _ => DetailState::Processing {
                video,
                status: None,
            },
        }
    }

    /// Load the video and, if it is still processing, follow it to a
    /// terminal state. `on_change` sees every state the view passes through.
    ///
    /// Dropping the returned future tears the view down, poll task included.
    pub async fn follow<F: FnMut(&DetailState)>(&self, mut on_change: F) -> DetailState {
        let mut state = DetailState::Loading;
        on_change(&state);

        state = self.load().await;
        on_change(&state);

        let mut video = match state {
            DetailState::Processing { ref video, .. } => video.clone(),
            other => return other,
        };

        info!(video_id = %self.video_id, "Following processing status");
        let mut handle = self.poller.spawn(self.client.clone(), self.video_id.clone());

        while let Some(event) = handle.next().await {
            match event {
                PollEvent::Status {
                    status: ProcessingStatus::Completed,
                    ..
                } => {
                    handle.cancel();
                    debug!(video_id = %self.video_id, "Processing completed, refetching");
                    state = match self.client.get_video(&self.video_id).await {
                        Ok(fresh) => self.with_highlights(fresh).await,
                        Err(e) => {
                            error!(video_id = %self.video_id, error = %e, "Error fetching video details");
                            DetailState::load_error()
                        }
                    };
                    on_change(&state);
                    return state;
                }
                PollEvent::Status {
                    status: ProcessingStatus::Error,
                    error_message,
                } => {
                    handle.cancel();
                    video.processing_status = ProcessingStatus::Error;
                    let message = error_message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| PROCESSING_FAILED.to_string());
                    state = DetailState::Failed { video, message };
                    on_change(&state);
                    return state;
                }
                PollEvent::Status { status, .. } => {
                    state = DetailState::Processing {
                        video: video.clone(),
                        status: Some(status),
                    };
                    on_change(&state);
                }
                PollEvent::Stalled {
                    failures,
                    last_error,
                } => {
                    warn!(
                        video_id = %self.video_id,
                        failures,
                        error = %last_error,
                        "Giving up on status polling"
                    );
                    state = DetailState::Failed {
                        video,
                        message: POLL_STALLED.to_string(),
                    };
                    on_change(&state);
                    return state;
                }
            }
        }

        state
    }
}

/// Delete the shown video after confirmation; navigates home on success
pub async fn delete_video(app: &mut App, id: &RecordId, confirm: &mut dyn Confirm) -> Option<Route> {
    if confirm.confirm(DELETE_PROMPT) && app.delete(id).await {
        Some(Route::Dashboard)
    } else {
        None
    }
}

fn player_flags(player: &PlayerConfig) -> String {
    let mut flags = Vec::new();
    if player.controls {
        flags.push("controls".to_string());
    }
    if player.autoplay {
        flags.push("autoplay".to_string());
    }
    flags.push(format!("preload {}", player.preload));
    flags.join(", ")
}

fn render_header(video: &Video) -> String {
    let mut text = format!(
        "{}\n{} | Uploaded on {} | {}\n",
        video.title,
        format_duration(video.duration),
        format_calendar_date(&video.upload_date),
        video.processing_status,
    );
    if let Some(description) = video.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(description);
        text.push('\n');
    }
    text
}

fn render_player(highlight: &Highlight, player: &PlayerConfig) -> String {
    let mut text = format!(
        "Now playing: {}\n  clip: {} ({})\n",
        highlight.title,
        highlight.clip_path,
        player_flags(player)
    );
    if let Some(description) = highlight.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(&format!("  {}\n", description));
    }
    text.push_str(&format!(
        "  starts {} • lasts {}\n",
        format_duration(Some(highlight.start_time)),
        format_duration(Some(highlight.duration()))
    ));
    text
}

/// Render the current state
pub fn render(state: &DetailState, player: &PlayerConfig) -> String {
    let video = match state {
        DetailState::Loading => return "Loading video details...\n".to_string(),
        DetailState::LoadError { message } => {
            return render_error_view(
                "Error Loading Video",
                message,
                "Back to Dashboard",
                &Route::Dashboard,
            )
        }
        DetailState::Processing { video, .. }
        | DetailState::Completed { video, .. }
        | DetailState::Failed { video, .. } => video,
    };

    let mut text = render_header(video);
    text.push('\n');

    match state {
        DetailState::Processing { status, .. } => {
            let status = status.unwrap_or(ProcessingStatus::Unknown);
            text.push_str(status.describe());
            text.push('\n');
            text.push_str(&progress_bar(status.progress_percent(), 20));
            text.push_str(
                "\nThis may take a few minutes. You can close this page and come back later.\n",
            );
        }
        DetailState::Failed { message, .. } => {
            text.push_str(&format!("!! Processing Error\n{}\n", message));
            text.push_str(&format!("-> Delete Video: highlight-studio delete {}\n", video.id));
        }
        DetailState::Completed {
            highlights,
            selected,
            ..
        } => {
            text.push_str(&format!(
                "-> View Content Plan: {}\n\n",
                Route::ContentPlan(video.id.clone())
            ));
            text.push_str("Highlights\n");
            if highlights.is_empty() {
                text.push_str("No highlights were found in this video.\n");
            } else {
                if let Some(current) = selected.and_then(|i| highlights.get(i)) {
                    text.push_str(&render_player(current, player));
                }
                text.push_str("\nAll Highlights\n");
                for (index, highlight) in highlights.iter().enumerate() {
                    text.push_str(&highlight_card::render(
                        highlight,
                        index,
                        *selected == Some(index),
                    ));
                }
            }
        }
        DetailState::Loading | DetailState::LoadError { .. } => {}
    }

    text
}
