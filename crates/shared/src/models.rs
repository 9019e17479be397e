//! Data models for the highlight backend.
//!
//! These mirror the JSON records served under `/api`. The client never owns
//! them: every value is a copy of the latest successful fetch.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a backend record.
///
/// The backend may send ids as strings or integers; both are kept in their
/// textual form so equality matches what the user types on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for RecordId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(anyhow::anyhow!("Record id must not be empty"));
        }
        Ok(Self::new(trimmed))
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Signed(n) => RecordId(n.to_string()),
            Raw::Unsigned(n) => RecordId(n.to_string()),
        })
    }
}

/// Backend processing pipeline state of a video
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Processing,
    Analyzing,
    ExtractingHighlights,
    GeneratingContentPlan,
    Completed,
    Error,
    /// Any status string this client does not recognise
    #[serde(other)]
    Unknown,
}

impl ProcessingStatus {
    /// COMPLETED and ERROR end polling
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Error)
    }

    /// Cosmetic progress percentage; it never gates a transition.
    pub fn progress_percent(self) -> u8 {
        match self {
            ProcessingStatus::Processing => 25,
            ProcessingStatus::Analyzing => 50,
            ProcessingStatus::ExtractingHighlights => 75,
            ProcessingStatus::GeneratingContentPlan => 90,
            ProcessingStatus::Completed => 100,
            ProcessingStatus::Error | ProcessingStatus::Unknown => 0,
        }
    }

    /// Human readable description shown while processing
    pub fn describe(self) -> &'static str {
        match self {
            ProcessingStatus::Analyzing => "Analyzing video content...",
            ProcessingStatus::ExtractingHighlights => "Extracting highlights...",
            ProcessingStatus::GeneratingContentPlan => "Generating content plan...",
            ProcessingStatus::Error => "Error processing video",
            _ => "Processing video...",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessingStatus::Processing => "PROCESSING",
            ProcessingStatus::Analyzing => "ANALYZING",
            ProcessingStatus::ExtractingHighlights => "EXTRACTING_HIGHLIGHTS",
            ProcessingStatus::GeneratingContentPlan => "GENERATING_CONTENT_PLAN",
            ProcessingStatus::Completed => "COMPLETED",
            ProcessingStatus::Error => "ERROR",
            ProcessingStatus::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ProcessingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(ProcessingStatus::Processing),
            "ANALYZING" => Ok(ProcessingStatus::Analyzing),
            "EXTRACTING_HIGHLIGHTS" => Ok(ProcessingStatus::ExtractingHighlights),
            "GENERATING_CONTENT_PLAN" => Ok(ProcessingStatus::GeneratingContentPlan),
            "COMPLETED" => Ok(ProcessingStatus::Completed),
            "ERROR" => Ok(ProcessingStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid processing status: {}", s)),
        }
    }
}

/// An uploaded video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub upload_date: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub highlights_count: u32,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
}

/// A clip extracted from a video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Offset into the source video in seconds
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub clip_path: String,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
}

impl Highlight {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Generated social media schedule for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPlan {
    #[serde(default)]
    pub generated_date: String,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// One scheduled social media post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub platform: String,
    pub title: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Highlight this post is built around
    #[serde(default)]
    pub clip_id: Option<RecordId>,
    #[serde(default)]
    pub suggested_posting_date: String,
}

/// Response of `GET /api/status/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: ProcessingStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_accepts_strings_and_numbers() {
        let ids: Vec<RecordId> = serde_json::from_str(r#"["abc", 42, -7]"#).unwrap();
        assert_eq!(ids[0].as_str(), "abc");
        assert_eq!(ids[1], RecordId::from("42"));
        assert_eq!(ids[2].to_string(), "-7");
        assert!(" ".parse::<RecordId>().is_err());
        assert_eq!(" 9 ".parse::<RecordId>().unwrap(), RecordId::from("9"));
    }

    #[test]
    fn test_status_wire_names() {
        let status: ProcessingStatus = serde_json::from_str(r#""EXTRACTING_HIGHLIGHTS""#).unwrap();
        assert_eq!(status, ProcessingStatus::ExtractingHighlights);
        assert_eq!(status.to_string(), "EXTRACTING_HIGHLIGHTS");
        assert_eq!(
            "GENERATING_CONTENT_PLAN".parse::<ProcessingStatus>().unwrap(),
            ProcessingStatus::GeneratingContentPlan
        );

        let unknown: ProcessingStatus = serde_json::from_str(r#""TRANSCODING""#).unwrap();
        assert_eq!(unknown, ProcessingStatus::Unknown);
        assert!(!unknown.is_terminal());
    }

    #[test]
    fn test_progress_table() {
        assert_eq!(ProcessingStatus::Processing.progress_percent(), 25);
        assert_eq!(ProcessingStatus::Analyzing.progress_percent(), 50);
        assert_eq!(ProcessingStatus::ExtractingHighlights.progress_percent(), 75);
        assert_eq!(ProcessingStatus::GeneratingContentPlan.progress_percent(), 90);
        assert_eq!(ProcessingStatus::Completed.progress_percent(), 100);
        assert_eq!(ProcessingStatus::Unknown.progress_percent(), 0);
    }

    #[test]
    fn test_video_tolerates_missing_and_extra_fields() {
        let video: Video = serde_json::from_str(
            r#"{
                "id": 3,
                "title": "Match day",
                "processing_status": "COMPLETED",
                "upload_date": "2024-05-01T10:00:00",
                "file_path": "uploads/3.mp4"
            }"#,
        )
        .unwrap();
        assert_eq!(video.id, RecordId::from("3"));
        assert_eq!(video.highlights_count, 0);
        assert!(video.duration.is_none());
        assert!(video.thumbnail_path.is_none());
    }

    #[test]
    fn test_post_clip_reference() {
        let post: Post = serde_json::from_str(
            r#"{"platform": "Instagram", "title": "t", "caption": "c",
                "hashtags": ["goal"], "clip_id": 11,
                "suggested_posting_date": "2024-05-03"}"#,
        )
        .unwrap();
        assert_eq!(post.clip_id, Some(RecordId::from("11")));
        assert_eq!(post.hashtags, vec!["goal".to_string()]);
    }

    #[test]
    fn test_highlight_duration() {
        let highlight = Highlight {
            id: RecordId::from("1"),
            title: "Save".to_string(),
            description: None,
            start_time: 12.5,
            end_time: 30.0,
            clip_path: "clips/1.mp4".to_string(),
            thumbnail_path: None,
        };
        assert_eq!(highlight.duration(), 17.5);
    }
}
