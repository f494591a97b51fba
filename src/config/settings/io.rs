// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::Settings;

impl Settings {
    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        Self::default_home().join("settings.json")
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Get the default working root (~/.screen-noise or $SCREEN_NOISE_HOME).
    pub fn default_home() -> PathBuf {
        if let Ok(home) = std::env::var("SCREEN_NOISE_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".screen-noise")
    }

    /// Get the working root for this configuration.
    pub fn home_dir(&self) -> PathBuf {
        self.home.clone().unwrap_or_else(Self::default_home)
    }

    /// Get the artifact manifest path.
    pub fn data_file(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| self.home_dir().join("10000_screen_noise_data_points.json"))
    }

    /// Get the allow-list manifest path.
    pub fn data_points_file(&self) -> PathBuf {
        self.data_points_file
            .clone()
            .unwrap_or_else(|| self.home_dir().join("good_data_points.json"))
    }

    /// Get the download directory.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| self.home_dir().join("downloads"))
    }

    /// Get the parsed-scalar cache directory.
    pub fn pre_proc_dir(&self) -> PathBuf {
        self.pre_proc_dir
            .clone()
            .unwrap_or_else(|| self.home_dir().join("preproced"))
    }

    /// Get the directory holding copies of parsed batterystats files.
    pub fn testing_dir(&self) -> PathBuf {
        self.testing_dir
            .clone()
            .unwrap_or_else(|| self.home_dir().join("testing"))
    }

    /// Ensure all working directories exist.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            self.home_dir(),
            self.download_dir(),
            self.pre_proc_dir(),
            self.testing_dir(),
        ] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
            }
        }

        Ok(())
    }
}
