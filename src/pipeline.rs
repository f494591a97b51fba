// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Pipeline driver
//!
//! fetch -> cache -> parse -> aggregate -> filter:
//! 1. load the allow-list and the artifact manifest
//! 2. skip artifacts whose task id is not allowed
//! 3. download everything else (bounded concurrency, full barrier)
//! 4. drop groupings with any artifact that was not downloaded
//! 5. turn each artifact into a scalar, from the cache or by parsing
//! 6. drop groupings missing the temperature or the screen power
//! 7. drop groupings whose screen power is outside the sanity bounds
//!
//! The surviving (screen power, temperature) pairs are returned for plotting.

use std::path::{Path, PathBuf};

use crate::cache::{MeasurementCache, ParsedMeasurement};
use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{ArtifactFetcher, DownloadRecord};
use crate::manifest::{self, AllowList, ArtifactReference, Grouping};
use crate::report::{
    self, AndroidVersion, ArtifactKind, BatterystatsParser, ParseOptions, PowerReportParser,
};

/// One plotted grouping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub index: usize,
    /// Screen power in mAh (x axis)
    pub screen: f64,
    /// Battery temperature (y axis)
    pub temperature: f64,
}

/// Scalars collected for one grouping
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupingMeasurements {
    pub temperature: Option<f64>,
    pub screen: Option<f64>,
}

impl GroupingMeasurements {
    pub fn record(&mut self, measurement: ParsedMeasurement) {
        match measurement {
            ParsedMeasurement::Temperature(v) => self.temperature = Some(v),
            ParsedMeasurement::Screen(v) => self.screen = Some(v),
        }
    }

    /// Both scalars, if present.
    pub fn pair(&self) -> Option<(f64, f64)> {
        Some((self.screen?, self.temperature?))
    }
}

/// A grouping whose artifacts are all on disk
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGrouping {
    pub index: usize,
    pub files: Vec<PathBuf>,
}

/// Artifacts to download: those whose task id is allowed.
pub fn select_downloads(groupings: &[Grouping], allow: &AllowList) -> Vec<ArtifactReference> {
    let mut wanted = Vec::new();
    for grouping in groupings {
        for artifact in &grouping.artifacts {
            if allow.allows(artifact) {
                wanted.push(artifact.clone());
            } else {
                tracing::info!(
                    "Skipping task ID {}",
                    artifact.task_id().unwrap_or("<none>")
                );
            }
        }
    }
    wanted
}

/// Keep groupings whose every artifact has a local file.
pub fn resolve_groupings(groupings: Vec<Grouping>, record: &DownloadRecord) -> Vec<ResolvedGrouping> {
    groupings
        .into_iter()
        .filter_map(|grouping| {
            let files = grouping
                .artifacts
                .iter()
                .map(|artifact| record.get(&artifact.url).cloned())
                .collect::<Option<Vec<_>>>()?;
            Some(ResolvedGrouping {
                index: grouping.index,
                files,
            })
        })
        .collect()
}

/// Complete, in-range pairs. Screen power must be in `(screen_min, screen_max]`.
pub fn select_points(
    measured: &[(usize, GroupingMeasurements)],
    screen_min: f64,
    screen_max: f64,
) -> Vec<ScatterPoint> {
    let complete: Vec<ScatterPoint> = measured
        .iter()
        .filter_map(|(index, m)| {
            m.pair().map(|(screen, temperature)| ScatterPoint {
                index: *index,
                screen,
                temperature,
            })
        })
        .collect();
    tracing::info!("{} groupings have both measurements", complete.len());

    let points: Vec<ScatterPoint> = complete
        .into_iter()
        .filter(|p| {
            let in_range = p.screen > screen_min && p.screen <= screen_max;
            if !in_range {
                tracing::debug!(
                    "Dropping grouping {}: screen power {} out of range",
                    p.index,
                    p.screen
                );
            }
            in_range
        })
        .collect();
    tracing::info!("{} points within screen power bounds", points.len());

    points
}

/// The pipeline driver
pub struct Pipeline {
    settings: Settings,
    fetcher: ArtifactFetcher,
    cache: MeasurementCache,
    parser: Box<dyn PowerReportParser>,
}

impl Pipeline {
    /// Build a pipeline, creating the working directories.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        settings.ensure_directories()?;

        let fetcher = ArtifactFetcher::new(settings.download_dir())?;
        let cache = MeasurementCache::new(settings.pre_proc_dir(), settings.testing_dir())?;
        let options = ParseOptions::new(&settings.process_name, &settings.test_name)
            .android_version(AndroidVersion(settings.android_version));
        let parser = Box::new(BatterystatsParser::new(options)?);

        Ok(Self {
            settings,
            fetcher,
            cache,
            parser,
        })
    }

    /// Swap the batterystats parser.
    pub fn with_parser(mut self, parser: Box<dyn PowerReportParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run against the manifests named in the settings.
    pub async fn run(&self) -> Result<Vec<ScatterPoint>> {
        let allow = AllowList::load(&self.settings.data_points_file())?;
        let groupings = manifest::load_groupings(&self.settings.data_file(), self.settings.limit)?;
        tracing::info!(
            "Loaded {} groupings and {} allowed task ids",
            groupings.len(),
            allow.len()
        );

        self.run_groupings(groupings, &allow).await
    }

    /// Run against already loaded manifests.
    pub async fn run_groupings(
        &self,
        groupings: Vec<Grouping>,
        allow: &AllowList,
    ) -> Result<Vec<ScatterPoint>> {
        let wanted = select_downloads(&groupings, allow);
        let record = self
            .fetcher
            .fetch_all(&wanted, self.settings.max_requests)
            .await?;

        let resolved = resolve_groupings(groupings, &record);
        tracing::info!("{} groupings fully downloaded", resolved.len());

        let mut measured = Vec::with_capacity(resolved.len());
        for grouping in &resolved {
            measured.push((grouping.index, self.measure_grouping(grouping)?));
        }

        Ok(select_points(
            &measured,
            self.settings.screen_min,
            self.settings.screen_max,
        ))
    }

    /// Collect the scalars of one grouping.
    ///
    /// A report missing its expected content empties the grouping and stops
    /// processing its remaining files.
    pub fn measure_grouping(&self, grouping: &ResolvedGrouping) -> Result<GroupingMeasurements> {
        let mut measurements = GroupingMeasurements::default();

        for path in &grouping.files {
            let file_name = file_name_of(path);

            if let Some(cached) = self.cache.load(&file_name)? {
                measurements.record(cached);
                continue;
            }

            let measurement = match ArtifactKind::from_file_name(&file_name) {
                Some(ArtifactKind::BatteryBefore) => {
                    let text = report::read_artifact(path)?;
                    report::parse_temperature(&text).map(ParsedMeasurement::Temperature)
                }
                Some(ArtifactKind::Batterystats) => self.measure_batterystats(path, &file_name)?,
                None => {
                    tracing::warn!("Unknown file name: {}", path.display());
                    continue;
                }
            };

            match measurement {
                Some(measurement) => {
                    self.cache.store(&file_name, measurement)?;
                    measurements.record(measurement);
                }
                None => {
                    tracing::warn!(
                        "Failed on file {}; skipping grouping number {}",
                        path.display(),
                        grouping.index
                    );
                    return Ok(GroupingMeasurements::default());
                }
            }
        }

        Ok(measurements)
    }

    fn measure_batterystats(&self, path: &Path, file_name: &str) -> Result<Option<ParsedMeasurement>> {
        let text = report::read_artifact(path)?;
        if text.is_empty() {
            return Ok(None);
        }
        self.cache.keep_copy(file_name, &text)?;

        let breakdown = self.parser.parse(&report::unescape_newlines(&text));
        Ok(Some(ParsedMeasurement::Screen(breakdown.screen)))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
