//! Multipart upload to a Frame.io-style assets endpoint.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client};

use super::{Credentials, UploadError, UploadResponse, UploadResult, UploadService};
use crate::config::UploadSettings;

const USER_AGENT: &str = concat!("reelcheck/", env!("CARGO_PKG_VERSION"));

/// Uploads artifacts as `multipart/form-data` with a bearer token.
#[derive(Debug, Clone)]
pub struct FrameIoUploader {
    endpoint: String,
    client: Client,
}

impl FrameIoUploader {
    /// Build an uploader for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> UploadResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn from_settings(settings: &UploadSettings) -> UploadResult<Self> {
        Self::new(settings.endpoint.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl UploadService for FrameIoUploader {
    fn upload(
        &self,
        artifact: &Path,
        credentials: &Credentials,
        timeout: Duration,
    ) -> UploadResult<UploadResponse> {
        let file_part = multipart::Part::file(artifact).map_err(|source| UploadError::Io {
            path: artifact.to_path_buf(),
            source,
        })?;
        let file_part = file_part
            .mime_str("application/octet-stream")
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("parent_asset_id", credentials.parent_asset_id.clone());

        tracing::debug!("Uploading {} to {}", artifact.display(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&credentials.token)
            .multipart(form)
            .timeout(timeout)
            .send()
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Ok(UploadResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_is_io_error() {
        let uploader = FrameIoUploader::new("http://127.0.0.1:9/assets").unwrap();
        let creds = Credentials::new("t", "p");

        let err = uploader
            .upload(
                Path::new("/nonexistent/segment.mp4"),
                &creds,
                Duration::from_secs(1),
            )
            .unwrap_err();
        assert!(matches!(err, UploadError::Io { .. }));
    }

    #[test]
    fn uses_configured_endpoint() {
        let uploader = FrameIoUploader::from_settings(&UploadSettings::default()).unwrap();
        assert_eq!(uploader.endpoint(), "https://api.frame.io/v2/assets");
    }
}
