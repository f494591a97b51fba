// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for screen-noise.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;

/// screen-noise - does device temperature correlate with screen power noise?
#[derive(Parser, Debug)]
#[command(name = "screen-noise")]
#[command(
    version,
    about = "Correlate battery temperature with screen power from CI battery artifacts"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path (defaults to ~/.screen-noise/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download, parse and plot (default when no command given)
    Run(RunArgs),

    /// Parse one batterystats artifact and print its power breakdown
    Batterystats(BatterystatsArgs),

    /// Extract the temperature from one battery-before artifact
    Temperature(TemperatureArgs),
}

/// Arguments for the run subcommand
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Artifact manifest (job.details.url query result)
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Allow-list manifest (run.taskcluster.id query result)
    #[arg(long, value_name = "PATH")]
    pub allow_list: Option<PathBuf>,

    /// Working directory for downloads and caches
    #[arg(long, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Maximum number of parallel downloads
    #[arg(long)]
    pub max_requests: Option<usize>,

    /// Highest grouping index to process
    #[arg(long)]
    pub limit: Option<usize>,

    /// Android version of the test devices
    #[arg(long)]
    pub android_version: Option<f64>,

    /// Print the points instead of opening the plot
    #[arg(long)]
    pub no_plot: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of loaded settings.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(home) = &self.home {
            settings.home = Some(home.clone());
        }
        if let Some(path) = &self.data_file {
            settings.data_file = Some(path.clone());
        }
        if let Some(path) = &self.allow_list {
            settings.data_points_file = Some(path.clone());
        }
        if let Some(max_requests) = self.max_requests {
            settings.max_requests = max_requests;
        }
        if let Some(limit) = self.limit {
            settings.limit = Some(limit);
        }
        if let Some(version) = self.android_version {
            settings.android_version = version;
        }
        settings
    }
}

/// Arguments for the batterystats subcommand
#[derive(clap::Args, Debug)]
pub struct BatterystatsArgs {
    /// Report file (plain text or gzip)
    pub file: PathBuf,

    /// Package name to report on (defaults to the configured process)
    #[arg(short, long)]
    pub process: Option<String>,

    /// Treat the report as a whole-device baseline
    #[arg(long)]
    pub baseline: bool,

    /// Android version of the device
    #[arg(long)]
    pub android_version: Option<f64>,
}

/// Arguments for the temperature subcommand
#[derive(clap::Args, Debug)]
pub struct TemperatureArgs {
    /// Report file (plain text or gzip)
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_override_settings() {
        let args = RunArgs {
            max_requests: Some(5),
            limit: Some(100),
            allow_list: Some(PathBuf::from("/x/allow.json")),
            ..RunArgs::default()
        };
        let settings = args.apply(Settings::default());

        assert_eq!(settings.max_requests, 5);
        assert_eq!(settings.limit, Some(100));
        assert_eq!(settings.data_points_file(), PathBuf::from("/x/allow.json"));
        assert!((settings.android_version - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_run_args_default_keeps_settings() {
        let base = Settings::with_home("/tmp/sn");
        let settings = RunArgs::default().apply(base.clone());
        assert_eq!(settings.home, base.home);
        assert_eq!(settings.max_requests, base.max_requests);
    }
}
