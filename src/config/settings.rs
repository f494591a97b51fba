// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for screen-noise
//!
//! Handles loading settings from ~/.screen-noise/settings.json. Every field
//! has a default, so a missing or partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod io;

/// Main settings structure, stored in ~/.screen-noise/settings.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Working root (defaults to $SCREEN_NOISE_HOME or ~/.screen-noise)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,

    /// Artifact manifest (`job.details.url` query result)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Allow-list manifest (`run.taskcluster.id` query result)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_points_file: Option<PathBuf>,

    /// Where raw artifacts are downloaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// Where parsed scalars are cached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_proc_dir: Option<PathBuf>,

    /// Where copies of parsed batterystats files are kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing_dir: Option<PathBuf>,

    /// Maximum number of in-flight downloads
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Highest grouping index to process (None = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Package whose power usage is read from batterystats
    #[serde(default = "default_process_name")]
    pub process_name: String,

    /// Test label attached to parsed power data
    #[serde(default = "default_test_name")]
    pub test_name: String,

    /// Android version of the devices that produced the reports.
    /// The artifacts do not record it, so it has to be supplied.
    #[serde(default = "default_android_version")]
    pub android_version: f64,

    /// Screen power values at or below this are discarded
    #[serde(default = "default_screen_min")]
    pub screen_min: f64,

    /// Screen power values above this are discarded
    #[serde(default = "default_screen_max")]
    pub screen_max: f64,
}

fn default_max_requests() -> usize {
    20
}

fn default_process_name() -> String {
    "org.mozilla.geckoview_example".to_string()
}

fn default_test_name() -> String {
    "test-name".to_string()
}

fn default_android_version() -> f64 {
    8.0
}

fn default_screen_min() -> f64 {
    0.0
}

fn default_screen_max() -> f64 {
    20.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home: None,
            data_file: None,
            data_points_file: None,
            download_dir: None,
            pre_proc_dir: None,
            testing_dir: None,
            max_requests: default_max_requests(),
            limit: None,
            process_name: default_process_name(),
            test_name: default_test_name(),
            android_version: default_android_version(),
            screen_min: default_screen_min(),
            screen_max: default_screen_max(),
        }
    }
}

impl Settings {
    /// Settings rooted at an explicit working directory.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
            ..Self::default()
        }
    }

    /// Check that the numeric settings make sense.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_requests == 0 {
            return Err(crate::ScreenNoiseError::Config(
                "max_requests must be at least 1".to_string(),
            ));
        }
        if self.max_requests > tokio::sync::Semaphore::MAX_PERMITS {
            return Err(crate::ScreenNoiseError::Config(format!(
                "max_requests must be at most {}",
                tokio::sync::Semaphore::MAX_PERMITS
            )));
        }
        if self.screen_min >= self.screen_max {
            return Err(crate::ScreenNoiseError::Config(format!(
                "screen_min ({}) must be below screen_max ({})",
                self.screen_min, self.screen_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"max_requests": 4}"#).unwrap();
        assert_eq!(settings.max_requests, 4);
        assert_eq!(settings.process_name, "org.mozilla.geckoview_example");
        assert!((settings.screen_max - 20.0).abs() < f64::EPSILON);
        assert!(settings.limit.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_requests() {
        let settings = Settings {
            max_requests: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_max_requests_upper_bound() {
        let at_limit = Settings {
            max_requests: tokio::sync::Semaphore::MAX_PERMITS,
            ..Settings::default()
        };
        assert!(at_limit.validate().is_ok());

        let over = Settings {
            max_requests: usize::MAX,
            ..Settings::default()
        };
        let err = over.validate().unwrap_err();
        assert!(err.to_string().contains("max_requests must be at most"));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let settings = Settings {
            screen_min: 30.0,
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("screen_min"));
    }

    #[test]
    fn test_default_is_valid() {
        assert!(Settings::default().validate().is_ok());
    }
}
