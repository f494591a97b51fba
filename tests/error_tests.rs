// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io;

use screen_noise::error::ScreenNoiseError;

#[test]
fn test_io_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let error: ScreenNoiseError = io_error.into();

    match error {
        ScreenNoiseError::Io(_) => {} // Expected
        _ => panic!("Expected Io error, got different error type"),
    }
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: ScreenNoiseError = json_error.into();
    assert!(error.to_string().starts_with("JSON error"));
}

#[test]
fn test_config_error_display() {
    let error = ScreenNoiseError::Config("max_requests must be at least 1".to_string());
    assert_eq!(
        error.to_string(),
        "Configuration error: max_requests must be at least 1"
    );
}

#[test]
fn test_download_error_display() {
    let error = ScreenNoiseError::Download {
        url: "https://queue.example/task/abc/batterystats.txt".to_string(),
        status: 503,
    };
    assert_eq!(
        error.to_string(),
        "Download failed with status 503: https://queue.example/task/abc/batterystats.txt"
    );
}

#[test]
fn test_task_error_display() {
    let error = ScreenNoiseError::Task("worker panicked".to_string());
    assert_eq!(error.to_string(), "Download task failed: worker panicked");
}

#[test]
fn test_manifest_error_display() {
    let error = ScreenNoiseError::Manifest("missing data".to_string());
    assert_eq!(error.to_string(), "Manifest error: missing data");
}

#[test]
fn test_result_alias() {
    fn parse(flag: bool) -> screen_noise::Result<u8> {
        if flag {
            Ok(1)
        } else {
            Err(ScreenNoiseError::Tui("no terminal".to_string()))
        }
    }

    assert_eq!(parse(true).unwrap(), 1);
    assert!(parse(false).is_err());
}
