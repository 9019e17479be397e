//! Video dashboard: the filtered, newest-first list of uploads.

use super::{Confirm, DELETE_PROMPT};
use crate::app::App;
use crate::routes::Route;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use shared::display::{format_duration, format_relative_str, parse_timestamp};
use shared::{ProcessingStatus, RecordId, Video};
use tracing::{debug, warn};

/// Status filter buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "lower")]
pub enum StatusFilter {
    #[default]
    All,
    Processing,
    Completed,
    Error,
}

impl StatusFilter {
    const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Processing,
        StatusFilter::Completed,
        StatusFilter::Error,
    ];

    /// Exact status match; `All` lets everything through
    pub fn matches(self, status: ProcessingStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Processing => status == ProcessingStatus::Processing,
            StatusFilter::Completed => status == ProcessingStatus::Completed,
            StatusFilter::Error => status == ProcessingStatus::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Processing => "processing",
            StatusFilter::Completed => "completed",
            StatusFilter::Error => "error",
        }
    }

    fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All Videos",
            StatusFilter::Processing => "Processing",
            StatusFilter::Completed => "Completed",
            StatusFilter::Error => "Error",
        }
    }
}

/// Apply the filter and sort by upload date, newest first.
///
/// Videos whose date cannot be parsed go last, keeping their input order.
pub fn visible_videos(videos: &[Video], filter: StatusFilter) -> Vec<&Video> {
    let mut visible: Vec<(Option<DateTime<Utc>>, &Video)> = videos
        .iter()
        .filter(|video| filter.matches(video.processing_status))
        .map(|video| (parse_timestamp(&video.upload_date), video))
        .collect();

    visible.sort_by(|(a, _), (b, _)| b.cmp(a));
    visible.into_iter().map(|(_, video)| video).collect()
}

fn status_badge(status: ProcessingStatus) -> String {
    match status {
        ProcessingStatus::Completed => format!("[ok {}]", status),
        ProcessingStatus::Processing => format!("[.. {}]", status),
        ProcessingStatus::Error => format!("[!! {}]", status),
        _ => format!("[{}]", status),
    }
}

/// One video card
pub fn render_card(video: &Video, now: DateTime<Utc>) -> String {
    let mut meta = String::new();
    if video.duration.is_some_and(|d| d > 0.0) {
        meta.push_str(&format_duration(video.duration));
        meta.push_str(" • ");
    }
    meta.push_str(&format_relative_str(&video.upload_date, now));

    let mut text = format!(
        "{} {}  (id {}, open {})\n    {}\n",
        status_badge(video.processing_status),
        video.title,
        video.id,
        Route::VideoDetail(video.id.clone()),
        meta,
    );

    if video.thumbnail_path.is_some() {
        text.push_str(&format!("    thumbnail: /api/thumbnails/{}\n", video.id));
    }
    if video.highlights_count > 0 {
        text.push_str(&format!("    {} highlights\n", video.highlights_count));
    }

    text
}

/// Render the whole dashboard
pub fn render(videos: &[Video], filter: StatusFilter, loading: bool, now: DateTime<Utc>) -> String {
    let mut text = String::from("Video Dashboard    (refresh: `list`, new upload: /upload)\n");

    let buttons: Vec<String> = StatusFilter::ALL
        .iter()
        .map(|f| {
            if *f == filter {
                format!("[{}]", f.label())
            } else {
                f.label().to_string()
            }
        })
        .collect();
    text.push_str(&buttons.join("  "));
    text.push_str("\n\n");

    if loading {
        text.push_str("Loading videos...\n");
        return text;
    }

    let visible = visible_videos(videos, filter);
    if visible.is_empty() {
        text.push_str("No videos found\n");
        if filter == StatusFilter::All {
            text.push_str("Upload your first video to get started.\n");
        } else {
            text.push_str(&format!(
                "No videos with status \"{}\" found. Try a different filter or upload a new video.\n",
                filter.as_str()
            ));
        }
        text.push_str(&format!("-> Upload Video: {}\n", Route::Upload));
        return text;
    }

    for video in visible {
        text.push_str(&render_card(video, now));
    }
    text
}

/// What the user did on a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// The card itself was activated
    Open(RecordId),
    /// The card's delete control was activated
    Delete(RecordId),
}

/// Result of a delete request from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    Failed,
}

/// Delete after asking for confirmation
pub async fn delete_with_confirmation(
    app: &mut App,
    id: &RecordId,
    confirm: &mut dyn Confirm,
) -> DeleteOutcome {
    if !confirm.confirm(DELETE_PROMPT) {
        debug!(video_id = %id, "Delete cancelled");
        return DeleteOutcome::Cancelled;
    }

    if app.delete(id).await {
        DeleteOutcome::Deleted
    } else {
        warn!(video_id = %id, "Delete failed");
        DeleteOutcome::Failed
    }
}

/// What activating a card led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Navigate(Route),
    /// The delete control was used; the dashboard stays put
    Delete(DeleteOutcome),
}

/// Handle a card action.
///
/// The delete control is consumed here and never falls through to the
/// card's own navigation.
pub async fn activate(app: &mut App, action: CardAction, confirm: &mut dyn Confirm) -> Activation {
    match action {
        CardAction::Open(id) => Activation::Navigate(Route::VideoDetail(id)),
        CardAction::Delete(id) => {
            let outcome = delete_with_confirmation(app, &id, confirm).await;
            debug!(video_id = %id, ?outcome, "Delete control handled");
            Activation::Delete(outcome)
        }
    }
}
