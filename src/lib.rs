// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! screen-noise - battery temperature vs. screen power investigation.
//!
//! Pulls battery-diagnostic artifacts produced by CI power tests, scrapes a
//! temperature from each `battery-before.txt` and a screen power figure from
//! each `batterystats.txt`, and plots the two against each other.
//!
//! Module map:
//! - `manifest`: input manifests, task ids and artifact file names
//! - `fetch`: cached, bounded-concurrency artifact downloads
//! - `report`: artifact reading and the two report scrapers
//! - `cache`: parsed-scalar cache so re-runs skip parsing
//! - `pipeline`: the fetch -> parse -> filter driver
//! - `plot`: terminal scatter plot
//! - `cli`, `config`: command line and settings

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod pipeline;
pub mod plot;
pub mod report;

pub use error::{Result, ScreenNoiseError};
