//! Highlight backend client.

use super::error::{ApiError, ApiResult};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response, Url};
use serde::de::DeserializeOwned;
use shared::config::ApiConfig;
use shared::{ContentPlan, Highlight, RecordId, StatusResponse, Video};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A validated upload, ready to be sent as multipart form data
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Local file to stream
    pub path: PathBuf,
    /// File name reported to the backend
    pub file_name: String,
    /// Declared MIME type
    pub mime_type: String,
    /// File size in bytes
    pub size: u64,
    pub title: String,
    pub description: String,
}

/// Client bound to one backend base URL.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct StudioClient {
    http: Client,
    base_url: String,
    base: Url,
    upload_timeout: Duration,
}

impl StudioClient {
    /// Create a new client from the `[api]` config section
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        Ok(Self {
            http,
            base_url,
            base,
            upload_timeout: Duration::from_secs(config.upload_timeout_seconds),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Turn a non-success status into `ApiError::Status`
    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        warn!(
            url = %url,
            status = %status,
            error = %body,
            "Request failed"
        );
        Err(ApiError::Status { status, body })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let response = Self::check(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.url(segments);
        debug!(url = %url, "Making API request");

        let response = self.http.get(url.clone()).send().await?;
        let data = Self::read_json(response).await?;

        debug!(url = %url, "Request successful");
        Ok(data)
    }

    /// `GET /api/videos`
    pub async fn list_videos(&self) -> ApiResult<Vec<Video>> {
        self.get(&["api", "videos"]).await
    }

    /// `GET /api/videos/{id}`
    pub async fn get_video(&self, id: &RecordId) -> ApiResult<Video> {
        self.get(&["api", "videos", id.as_str()]).await
    }

    /// `GET /api/status/{id}`
    pub async fn get_status(&self, id: &RecordId) -> ApiResult<StatusResponse> {
        self.get(&["api", "status", id.as_str()]).await
    }

    /// `GET /api/videos/{id}/highlights`
    pub async fn get_highlights(&self, id: &RecordId) -> ApiResult<Vec<Highlight>> {
        self.get(&["api", "videos", id.as_str(), "highlights"]).await
    }

    /// `GET /api/videos/{id}/content_plan`
    pub async fn get_content_plan(&self, id: &RecordId) -> ApiResult<ContentPlan> {
        self.get(&["api", "videos", id.as_str(), "content_plan"]).await
    }

    /// `GET /api/thumbnails/{id}`, returning the raw image bytes
    pub async fn get_thumbnail(&self, id: &RecordId) -> ApiResult<Vec<u8>> {
        let url = self.url(&["api", "thumbnails", id.as_str()]);
        debug!(url = %url, "Fetching thumbnail");

        let response = Self::check(self.http.get(url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// `DELETE /api/videos/{id}`
    pub async fn delete_video(&self, id: &RecordId) -> ApiResult<()> {
        let url = self.url(&["api", "videos", id.as_str()]);
        debug!(url = %url, "Deleting video");

        Self::check(self.http.delete(url).send().await?).await?;
        info!(video_id = %id, "Video deleted");
        Ok(())
    }

    /// `POST /api/upload` with multipart fields `file`, `title`, `description`.
    ///
    /// The file body is streamed from disk.
    pub async fn upload_video(&self, request: &UploadRequest) -> ApiResult<Video> {
        let url = self.url(&["api", "upload"]);

        let file = tokio::fs::File::open(&request.path)
            .await
            .map_err(|source| ApiError::Io {
                path: request.path.clone(),
                source,
            })?;

        let part = Part::stream_with_length(Body::from(file), request.size)
            .file_name(request.file_name.clone())
            .mime_str(&request.mime_type)?;

        let form = Form::new()
            .part("file", part)
            .text("title", request.title.clone())
            .text("description", request.description.clone());

        info!(
            url = %url,
            file = %request.file_name,
            size_bytes = request.size,
            "Uploading video"
        );

        let response = self
            .http
            .post(url.clone())
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;

        let video: Video = Self::read_json(response).await?;
        info!(video_id = %video.id, "Upload accepted");
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ProcessingStatus;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StudioClient {
        StudioClient::new(&ApiConfig {
            base_url: format!("{}/", server.uri()),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_client_creation_trims_base_url() {
        let client = StudioClient::new(&ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        for base_url in ["not a url", "mailto:backend@example.com"] {
            let err = StudioClient::new(&ApiConfig {
                base_url: base_url.to_string(),
                ..ApiConfig::default()
            })
            .unwrap_err();
            assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
        }
    }

    #[tokio::test]
    async fn test_ids_are_encoded_as_one_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/videos/a%2Fb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "a/b",
                "title": "Slashed",
                "processing_status": "COMPLETED"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/videos/a/b"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let video = client_for(&server)
            .get_video(&RecordId::from("a/b"))
            .await
            .unwrap();
        assert_eq!(video.title, "Slashed");
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/backend/api/status/5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "ANALYZING" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = StudioClient::new(&ApiConfig {
            base_url: format!("{}/backend/", server.uri()),
            ..ApiConfig::default()
        })
        .unwrap();
        let status = client.get_status(&RecordId::from("5")).await.unwrap();
        assert_eq!(status.status, ProcessingStatus::Analyzing);
    }

    #[tokio::test]
    async fn test_get_video() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/videos/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7,
                "title": "Finals",
                "processing_status": "ANALYZING",
                "upload_date": "2024-05-01T10:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let video = client_for(&server)
            .get_video(&RecordId::from("7"))
            .await
            .unwrap();
        assert_eq!(video.title, "Finals");
        assert_eq!(video.processing_status, ProcessingStatus::Analyzing);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/videos/9/content_plan"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no plan"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_content_plan(&RecordId::from("9"))
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(body, "no plan");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_videos().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(body_string_contains("name=\"title\""))
            .and(body_string_contains("Derby"))
            .and(body_string_contains("filename=\"derby.mp4\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "v-1",
                "title": "Derby",
                "processing_status": "PROCESSING"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let file_path = dir.path().join("derby.mp4");
        std::fs::write(&file_path, b"not really a video").unwrap();

        let request = UploadRequest {
            path: file_path,
            file_name: "derby.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            size: 18,
            title: "Derby".to_string(),
            description: String::new(),
        };

        let video = client_for(&server).upload_video(&request).await.unwrap();
        assert_eq!(video.id, RecordId::from("v-1"));
    }

    #[tokio::test]
    async fn test_upload_missing_file_never_hits_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let request = UploadRequest {
            path: PathBuf::from("/definitely/not/here.mp4"),
            file_name: "here.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            size: 1,
            title: "x".to_string(),
            description: String::new(),
        };

        let err = client_for(&server).upload_video(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }

    #[tokio::test]
    async fn test_thumbnail_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/thumbnails/4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .mount(&server)
            .await;

        let bytes = client_for(&server)
            .get_thumbnail(&RecordId::from("4"))
            .await
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }
}
