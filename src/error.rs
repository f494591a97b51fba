// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for screen-noise
//!
//! Every fatal condition in the pipeline funnels into [`ScreenNoiseError`].
//! Per-grouping problems (a report without a temperature, an empty
//! batterystats dump) are not errors: the driver logs them and skips the
//! grouping.

use thiserror::Error;

/// Main error type for screen-noise operations
#[derive(Error, Debug)]
pub enum ScreenNoiseError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The artifact server answered with a non-success status
    #[error("Download failed with status {status}: {url}")]
    Download { url: String, status: u16 },

    /// A download task panicked or could not get a slot
    #[error("Download task failed: {0}")]
    Task(String),

    /// Artifact is neither UTF-8 text nor valid gzip
    #[error("Unreadable artifact: {0}")]
    Artifact(String),

    /// Input manifest is missing or malformed
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal UI errors
    #[error("TUI error: {0}")]
    Tui(String),
}

/// Result type alias for screen-noise operations
pub type Result<T> = std::result::Result<T, ScreenNoiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_mentions_status_and_url() {
        let err = ScreenNoiseError::Download {
            url: "https://example.invalid/task/abc/batterystats.txt".to_string(),
            status: 404,
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("batterystats.txt"));
    }

    #[test]
    fn test_artifact_error() {
        let err = ScreenNoiseError::Artifact("not gzip".to_string());
        assert!(err.to_string().contains("Unreadable artifact"));
    }

    #[test]
    fn test_manifest_error() {
        let err = ScreenNoiseError::Manifest("missing data".to_string());
        assert!(err.to_string().contains("Manifest error"));
    }

    #[test]
    fn test_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ScreenNoiseError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ScreenNoiseError = json_err.into();
        assert!(matches!(err, ScreenNoiseError::Json(_)));
    }

    #[test]
    fn test_result_error() {
        fn test_fn() -> Result<i32> {
            Err(ScreenNoiseError::Config("test".to_string()))
        }

        assert!(test_fn().is_err());
    }
}
