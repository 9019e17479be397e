//! Upload form.
//!
//! A file is validated when it is selected, before anything touches the
//! network: first its declared MIME type, then its size.

use crate::api::UploadRequest;
use crate::app::{App, UPLOAD_FAILED};
use crate::routes::Route;
use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use shared::config::UploadConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const FALLBACK_MIME: &str = "application/octet-stream";

static MIME_BY_EXTENSION: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("mp4", "video/mp4"),
        ("m4v", "video/mp4"),
        ("mov", "video/quicktime"),
        ("avi", "video/x-msvideo"),
        ("mkv", "video/x-matroska"),
        ("webm", "video/webm"),
        ("mpeg", "video/mpeg"),
        ("mpg", "video/mpeg"),
        ("gif", "image/gif"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
        ("mp3", "audio/mpeg"),
        ("wav", "audio/wav"),
        ("pdf", "application/pdf"),
        ("txt", "text/plain"),
        ("zip", "application/zip"),
    ]
    .into_iter()
    .collect()
});

/// MIME type a file declares through its extension
pub fn declared_mime_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| MIME_BY_EXTENSION.get(ext.to_ascii_lowercase().as_str()).copied())
        .unwrap_or(FALLBACK_MIME)
}

/// Why a file or submission was refused locally
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Invalid file type. Please upload {formats} files only.")]
    InvalidType { mime_type: String, formats: String },

    #[error("File is too large. Maximum size is {max_mb}MB.")]
    TooLarge { size: u64, max_mb: u64 },

    #[error("Please select a video file to upload.")]
    NoFile,
}

/// A file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl SelectedFile {
    /// Inspect a file on disk. The MIME type comes from `mime_type` if
    /// given, otherwise from the extension.
    pub fn from_path(path: impl AsRef<Path>, mime_type: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        if !metadata.is_file() {
            bail!("Not a file: {}", path.display());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("No file name in {}", path.display()))?;

        Ok(Self {
            mime_type: mime_type.unwrap_or_else(|| declared_mime_type(path).to_string()),
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }

    /// File name without its last extension
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

/// `["MP4", "MOV", "AVI"]` -> `MP4, MOV, or AVI`
fn human_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} or {}", a, b),
        [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
    }
}

fn format_names(config: &UploadConfig) -> Vec<String> {
    config
        .allowed_extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_uppercase())
        .collect()
}

/// Check a selection against the upload rules, type first
pub fn validate(file: &SelectedFile, config: &UploadConfig) -> Result<(), UploadRejection> {
    if !config.allowed_types.iter().any(|t| t == &file.mime_type) {
        return Err(UploadRejection::InvalidType {
            mime_type: file.mime_type.clone(),
            formats: human_list(&format_names(config)),
        });
    }

    if file.size > config.max_file_size_bytes {
        return Err(UploadRejection::TooLarge {
            size: file.size,
            max_mb: config.max_file_size_mb(),
        });
    }

    Ok(())
}

/// State of the upload form
#[derive(Debug, Clone)]
pub struct UploadForm {
    config: UploadConfig,
    file: Option<SelectedFile>,
    pub title: String,
    pub description: String,
    error: Option<String>,
}

impl UploadForm {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
            file: None,
            title: String::new(),
            description: String::new(),
            error: None,
        }
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Select a file. A rejected file leaves the previous selection and the
    /// text fields untouched.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), UploadRejection> {
        if let Err(rejection) = validate(&file, &self.config) {
            debug!(file = %file.name, reason = %rejection, "File rejected");
            self.error = Some(rejection.to_string());
            return Err(rejection);
        }

        if self.title.is_empty() {
            self.title = file.stem().to_string();
        }
        self.error = None;
        self.file = Some(file);
        Ok(())
    }

    /// Build the multipart request for the current selection
    pub fn request(&self) -> Result<UploadRequest, UploadRejection> {
        let file = self.file.as_ref().ok_or(UploadRejection::NoFile)?;
        let title = if self.title.is_empty() {
            file.name.clone()
        } else {
            self.title.clone()
        };

        Ok(UploadRequest {
            path: file.path.clone(),
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
            title,
            description: self.description.clone(),
        })
    }

    /// Submit through the app. On success returns the new video's route;
    /// on failure the form keeps its contents and shows an error.
    pub async fn submit(&mut self, app: &mut App) -> Option<Route> {
        let request = match self.request() {
            Ok(request) => request,
            Err(rejection) => {
                self.error = Some(rejection.to_string());
                return None;
            }
        };

        match app.upload(&request).await {
            Ok(video) => {
                info!(video_id = %video.id, title = %video.title, "Video uploaded");
                Some(Route::VideoDetail(video.id))
            }
            Err(_) => {
                self.error = Some(UPLOAD_FAILED.to_string());
                None
            }
        }
    }

    pub fn render(&self, loading: bool) -> String {
        let mut text = String::from("Upload Video\n");

        if let Some(error) = &self.error {
            text.push_str(&format!("!! {} (dismiss)\n", error));
        }

        match &self.file {
            Some(file) => text.push_str(&format!(
                "File: {} ({}, {:.1} MB)\n",
                file.name,
                file.mime_type,
                file.size as f64 / (1024.0 * 1024.0)
            )),
            None => text.push_str(&format!(
                "Supported formats: {} (max {}MB)\n",
                format_names(&self.config).join(", "),
                self.config.max_file_size_mb()
            )),
        }

        text.push_str(&format!("Title: {}\n", self.title));
        if !self.description.is_empty() {
            text.push_str(&format!("Description: {}\n", self.description));
        }
        if loading {
            text.push_str("Uploading...\n");
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StudioClient;
    use shared::config::ApiConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MB: u64 = 1024 * 1024;

    fn selected(name: &str, mime: &str, size: u64) -> SelectedFile {
        SelectedFile {
            path: PathBuf::from(name),
            name: name.to_string(),
            mime_type: mime.to_string(),
            size,
        }
    }

    fn app_for(server: &MockServer) -> App {
        App::new(
            StudioClient::new(&ApiConfig {
                base_url: server.uri(),
                ..ApiConfig::default()
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_declared_mime_type() {
        assert_eq!(declared_mime_type(Path::new("a/b/match.MP4")), "video/mp4");
        assert_eq!(declared_mime_type(Path::new("clip.mov")), "video/quicktime");
        assert_eq!(declared_mime_type(Path::new("report.pdf")), "application/pdf");
        assert_eq!(declared_mime_type(Path::new("noext")), FALLBACK_MIME);
    }

    #[test]
    fn test_type_checked_before_size() {
        let config = UploadConfig::default();
        let err = validate(&selected("huge.pdf", "application/pdf", 5000 * MB), &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file type. Please upload MP4, MOV, or AVI files only."
        );
    }

    #[test]
    fn test_size_limit_message() {
        let config = UploadConfig::default();
        let err = validate(&selected("big.mp4", "video/mp4", 1001 * MB), &config).unwrap_err();
        assert_eq!(
            err,
            UploadRejection::TooLarge {
                size: 1001 * MB,
                max_mb: 1000
            }
        );
        assert_eq!(err.to_string(), "File is too large. Maximum size is 1000MB.");

        assert!(validate(&selected("ok.mp4", "video/mp4", 1000 * MB), &config).is_ok());
    }

    #[test]
    fn test_default_title_only_when_empty() {
        let mut form = UploadForm::new(UploadConfig::default());
        form.select_file(selected("my.match.mp4", "video/mp4", MB)).unwrap();
        assert_eq!(form.title, "my.match");

        form.select_file(selected("other.mov", "video/quicktime", MB)).unwrap();
        assert_eq!(form.title, "my.match");
        assert_eq!(form.file().unwrap().name, "other.mov");
    }

    #[test]
    fn test_rejection_keeps_form() {
        let mut form = UploadForm::new(UploadConfig::default());
        form.select_file(selected("keep.mp4", "video/mp4", MB)).unwrap();
        form.description = "first half".to_string();

        assert!(form.select_file(selected("notes.pdf", "application/pdf", MB)).is_err());
        assert_eq!(form.file().unwrap().name, "keep.mp4");
        assert_eq!(form.title, "keep");
        assert_eq!(form.description, "first half");
        assert!(form.error().unwrap().starts_with("Invalid file type"));

        form.dismiss_error();
        assert!(form.error().is_none());
    }

    #[test]
    fn test_title_falls_back_to_file_name() {
        let mut form = UploadForm::new(UploadConfig::default());
        form.select_file(selected("clip.avi", "video/x-msvideo", MB)).unwrap();
        form.title.clear();

        let request = form.request().unwrap();
        assert_eq!(request.title, "clip.avi");
        assert_eq!(request.mime_type, "video/x-msvideo");
    }

    #[tokio::test]
    async fn test_pdf_never_reaches_the_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        let mut form = UploadForm::new(UploadConfig::default());
        assert!(form.select_file(selected("slides.pdf", "application/pdf", MB)).is_err());

        assert_eq!(form.submit(&mut app).await, None);
        assert_eq!(form.error(), Some("Please select a video file to upload."));
    }

    #[tokio::test]
    async fn test_submit_navigates_to_new_video() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 31,
                "title": "kickoff",
                "processing_status": "PROCESSING"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let file_path = dir.path().join("kickoff.mp4");
        std::fs::write(&file_path, vec![0u8; 64]).unwrap();

        let mut app = app_for(&server);
        let mut form = UploadForm::new(UploadConfig::default());
        form.select_file(SelectedFile::from_path(&file_path, None).unwrap())
            .unwrap();
        assert_eq!(form.file().unwrap().size, 64);

        let route = form.submit(&mut app).await;
        assert_eq!(route, Some(Route::VideoDetail(shared::RecordId::from("31"))));
        assert_eq!(app.videos().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let file_path = dir.path().join("retry.mp4");
        std::fs::write(&file_path, b"x").unwrap();

        let mut app = app_for(&server);
        let mut form = UploadForm::new(UploadConfig::default());
        form.select_file(SelectedFile::from_path(&file_path, None).unwrap())
            .unwrap();
        form.description = "second half".to_string();

        assert_eq!(form.submit(&mut app).await, None);
        assert_eq!(form.error(), Some(UPLOAD_FAILED));
        assert_eq!(form.title, "retry");
        assert_eq!(form.description, "second half");
        assert!(form.file().is_some());
        assert_eq!(app.error(), Some(UPLOAD_FAILED));
    }

    #[test]
    fn test_render_form() {
        let mut form = UploadForm::new(UploadConfig::default());
        assert!(form
            .render(false)
            .contains("Supported formats: MP4, MOV, AVI (max 1000MB)"));

        form.select_file(selected("a.mp4", "video/mp4", 3 * MB)).unwrap();
        let text = form.render(true);
        assert!(text.contains("File: a.mp4 (video/mp4, 3.0 MB)"));
        assert!(text.contains("Title: a\n"));
        assert!(text.contains("Uploading..."));
    }
}
