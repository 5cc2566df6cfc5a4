//! Review-service upload.
//!
//! The pipeline talks to [`UploadService`]; [`FrameIoUploader`] is the
//! multipart HTTP implementation. Any HTTP status is handed back to the
//! caller, which decides what counts as a failure.

mod frameio;

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::UploadSettings;

pub use frameio::FrameIoUploader;

/// Errors from the upload transport.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The artifact could not be read.
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Connection, TLS or timeout failure.
    #[error("Upload request failed: {0}")]
    Network(String),

    /// A credential is unset: the token variable, or the parent asset id.
    #[error("Upload credentials incomplete: {0} is not set")]
    MissingCredentials(String),
}

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Credentials for one upload target.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub parent_asset_id: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, parent_asset_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            parent_asset_id: parent_asset_id.into(),
        }
    }

    /// Read the token from the environment variable named in `settings`.
    ///
    /// Both the token and `upload.parent_asset_id` must be non-blank.
    pub fn from_settings(settings: &UploadSettings) -> UploadResult<Self> {
        let token = env::var(&settings.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| UploadError::MissingCredentials(format!("${}", settings.token_env)))?;

        let parent_asset_id = settings.parent_asset_id.trim();
        if parent_asset_id.is_empty() {
            return Err(UploadError::MissingCredentials(
                "upload.parent_asset_id".to_string(),
            ));
        }

        Ok(Self::new(token.trim(), parent_asset_id))
    }
}

// Never print the token
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("parent_asset_id", &self.parent_asset_id)
            .finish()
    }
}

/// Status and body returned by the review service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: u16,
    pub body: String,
}

impl UploadResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Upload contract used by the pipeline.
pub trait UploadService: Send + Sync {
    /// Send `artifact` to the review service.
    fn upload(
        &self,
        artifact: &Path,
        credentials: &Credentials,
        timeout: Duration,
    ) -> UploadResult<UploadResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_2xx_only() {
        let ok = UploadResponse {
            status: 201,
            body: String::new(),
        };
        let denied = UploadResponse {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert!(ok.is_success());
        assert!(!denied.is_success());
    }

    #[test]
    fn credentials_from_env() {
        let settings = UploadSettings {
            token_env: "REELCHECK_TEST_TOKEN_PRESENT".to_string(),
            parent_asset_id: "asset-1".to_string(),
            ..UploadSettings::default()
        };
        env::set_var("REELCHECK_TEST_TOKEN_PRESENT", " abc123 ");

        let creds = Credentials::from_settings(&settings).unwrap();
        assert_eq!(creds.token, "abc123");
        assert_eq!(creds.parent_asset_id, "asset-1");
        assert!(!format!("{:?}", creds).contains("abc123"));
    }

    #[test]
    fn missing_token_is_reported() {
        let settings = UploadSettings {
            token_env: "REELCHECK_TEST_TOKEN_ABSENT".to_string(),
            ..UploadSettings::default()
        };
        env::remove_var("REELCHECK_TEST_TOKEN_ABSENT");

        assert!(matches!(
            Credentials::from_settings(&settings),
            Err(UploadError::MissingCredentials(name)) if name == "$REELCHECK_TEST_TOKEN_ABSENT"
        ));
    }

    #[test]
    fn blank_parent_asset_is_reported() {
        env::set_var("REELCHECK_TEST_TOKEN_NO_PARENT", "abc123");
        for parent in ["", "   "] {
            let settings = UploadSettings {
                token_env: "REELCHECK_TEST_TOKEN_NO_PARENT".to_string(),
                parent_asset_id: parent.to_string(),
                ..UploadSettings::default()
            };

            let err = Credentials::from_settings(&settings).unwrap_err();
            assert!(matches!(
                &err,
                UploadError::MissingCredentials(what) if what == "upload.parent_asset_id"
            ));
            assert!(err.to_string().contains("upload.parent_asset_id"));
        }
    }
}
