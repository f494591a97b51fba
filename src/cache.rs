// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Parsed-scalar cache
//!
//! Each parsed artifact leaves a small file holding its scalar (temperature
//! or screen power), named after the artifact. Re-runs read these instead of
//! re-parsing the reports.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Scalar extracted from one artifact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedMeasurement {
    Temperature(f64),
    Screen(f64),
}

impl ParsedMeasurement {
    pub fn value(&self) -> f64 {
        match self {
            Self::Temperature(v) | Self::Screen(v) => *v,
        }
    }
}

/// On-disk cache of parsed scalars
#[derive(Debug, Clone)]
pub struct MeasurementCache {
    dir: PathBuf,
    testing_dir: PathBuf,
}

impl MeasurementCache {
    pub fn new(dir: PathBuf, testing_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        std::fs::create_dir_all(&testing_dir)?;
        Ok(Self { dir, testing_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Read a cached scalar. Unreadable entries count as missing.
    pub fn load(&self, file_name: &str) -> Result<Option<ParsedMeasurement>> {
        let path = self.entry_path(file_name);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let value: f64 = match content.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        tracing::debug!("Already processed {}", file_name);
        if file_name.contains("battery-before") {
            Ok(Some(ParsedMeasurement::Temperature(value)))
        } else {
            Ok(Some(ParsedMeasurement::Screen(value)))
        }
    }

    pub fn store(&self, file_name: &str, measurement: ParsedMeasurement) -> Result<()> {
        std::fs::write(self.entry_path(file_name), measurement.value().to_string())?;
        Ok(())
    }

    /// Keep a copy of a parsed report for later inspection.
    pub fn keep_copy(&self, file_name: &str, text: &str) -> Result<()> {
        std::fs::write(self.testing_dir.join(file_name), text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache(temp_dir: &TempDir) -> MeasurementCache {
        MeasurementCache::new(
            temp_dir.path().join("preproced"),
            temp_dir.path().join("testing"),
        )
        .unwrap()
    }

    #[test]
    fn test_store_then_load_by_kind() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache(&temp_dir);

        cache
            .store(":T:battery-before.txt", ParsedMeasurement::Temperature(31.5))
            .unwrap();
        cache
            .store(":T:batterystats.txt", ParsedMeasurement::Screen(1.0))
            .unwrap();

        assert_eq!(
            cache.load(":T:battery-before.txt").unwrap(),
            Some(ParsedMeasurement::Temperature(31.5))
        );
        assert_eq!(
            cache.load(":T:batterystats.txt").unwrap(),
            Some(ParsedMeasurement::Screen(1.0))
        );
    }

    #[test]
    fn test_missing_entry() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(cache(&temp_dir).load(":T:batterystats.txt").unwrap(), None);
    }

    #[test]
    fn test_corrupt_entry_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache(&temp_dir);
        std::fs::write(cache.dir().join(":T:batterystats.txt"), "garbage").unwrap();

        assert_eq!(cache.load(":T:batterystats.txt").unwrap(), None);
    }

    #[test]
    fn test_keep_copy_writes_testing_file() {
        let temp_dir = TempDir::new().unwrap();
        cache(&temp_dir)
            .keep_copy(":T:batterystats.txt", "report")
            .unwrap();

        let copy = temp_dir.path().join("testing").join(":T:batterystats.txt");
        assert_eq!(std::fs::read_to_string(copy).unwrap(), "report");
    }
}
