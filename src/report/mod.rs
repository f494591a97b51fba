// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Battery diagnostic reports
//!
//! Two artifact kinds feed the analysis:
//! - `battery-before.txt`: `dumpsys battery` taken before the test, carries the temperature
//! - `batterystats.txt`: `dumpsys batterystats` taken after the test, carries power use
//!
//! Artifacts are stored either as plain text or gzip-compressed.

pub mod batterystats;
pub mod temperature;

use flate2::read::GzDecoder;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, ScreenNoiseError};

pub use batterystats::{
    parse_batterystats, AndroidVersion, BatterystatsParser, ParseOptions, PowerBreakdown,
    PowerReportParser,
};
pub use temperature::parse_temperature;

/// Kind of diagnostic artifact, decided by file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Pre-test battery state (temperature)
    BatteryBefore,
    /// Post-test power accounting (screen power)
    Batterystats,
}

impl ArtifactKind {
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.contains("battery-before.txt") {
            Some(Self::BatteryBefore)
        } else if name.contains("batterystats.txt") {
            Some(Self::Batterystats)
        } else {
            None
        }
    }
}

/// Read an artifact as text, falling back to gzip when it is not UTF-8.
pub fn read_artifact(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(not_text) => {
            tracing::debug!("{} is not plain text, trying gzip", path.display());
            let mut decoded = Vec::new();
            GzDecoder::new(not_text.as_bytes())
                .read_to_end(&mut decoded)
                .map_err(|e| {
                    ScreenNoiseError::Artifact(format!("{}: {}", path.display(), e))
                })?;
            Ok(String::from_utf8_lossy(&decoded).into_owned())
        }
    }
}

/// Expand literal `\n` escape sequences into real newlines.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(
            ArtifactKind::from_file_name(":T:runs:0:public:test_info:battery-before.txt"),
            Some(ArtifactKind::BatteryBefore)
        );
        assert_eq!(
            ArtifactKind::from_file_name(":T:runs:0:public:test_info:batterystats.txt"),
            Some(ArtifactKind::Batterystats)
        );
        assert_eq!(ArtifactKind::from_file_name("logcat.txt"), None);
    }

    #[test]
    fn test_read_plain_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("battery-before.txt");
        std::fs::write(&path, "  temperature: 290\n").unwrap();

        assert_eq!(read_artifact(&path).unwrap(), "  temperature: 290\n");
    }

    #[test]
    fn test_read_gzip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("batterystats.txt");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"  Estimated power use (mAh):\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        assert_eq!(
            read_artifact(&path).unwrap(),
            "  Estimated power use (mAh):\n"
        );
    }

    #[test]
    fn test_read_garbage_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("batterystats.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x01]).unwrap();

        let err = read_artifact(&path).unwrap_err();
        assert!(matches!(err, ScreenNoiseError::Artifact(_)));
    }

    #[test]
    fn test_unescape_newlines() {
        assert_eq!(unescape_newlines("a\\nb\nc"), "a\nb\nc");
    }
}
