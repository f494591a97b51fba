// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Batterystats report parser
//!
//! Scrapes the "Estimated power use (mAh)" section of a `dumpsys batterystats`
//! dump. For a single app the parser first finds the app's uid from its
//! `proc=<uid>:"<package>"` line, then reads the `Uid <uid>: ...` entry:
//!
//! ```text
//!   Estimated power use (mAh):
//!     Capacity: 3000, Computed drain: 120, actual drain: 100-110
//!     Screen: 40.2
//!     Wifi: 3.1
//!     Uid u0a123: 5.00 (cpu=3.00 wifi=1.00) Including smearing: 0.50 (screen=1.00 proportional=0.25)
//! ```
//!
//! The `Including smearing` suffix only exists on Android 8+. Whole-device
//! `Screen:` and `Wifi:` totals are kept as fallbacks for fields the uid
//! entry did not provide.
//!
//! Scan order and the early-stop rule matter: the first complete set of
//! values wins and later lines never overwrite it.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::{Result, ScreenNoiseError};

/// Android release of the device that produced a report
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct AndroidVersion(pub f64);

impl AndroidVersion {
    pub fn major(&self) -> u32 {
        self.0.max(0.0).floor() as u32
    }

    /// Smearing (and with it `proportional`) is reported from Android 8 on.
    pub fn reports_proportional(&self) -> bool {
        self.major() >= 8
    }
}

impl Default for AndroidVersion {
    fn default() -> Self {
        Self(8.0)
    }
}

/// What to look for in a report
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Package name whose uid is looked up
    pub process_name: String,
    /// Label copied into the breakdown
    pub test_name: String,
    /// Whole-device report: no uid scoping, read until the entry list ends
    pub baseline: bool,
    pub android_version: AndroidVersion,
}

impl ParseOptions {
    pub fn new(process_name: impl Into<String>, test_name: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            test_name: test_name.into(),
            baseline: false,
            android_version: AndroidVersion::default(),
        }
    }

    pub fn baseline(mut self, baseline: bool) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn android_version(mut self, version: AndroidVersion) -> Self {
        self.android_version = version;
        self
    }
}

/// Power attributed to one app (or the whole device), in mAh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerBreakdown {
    pub test: String,
    pub unit: String,
    /// Uid the values belong to (`all` for a baseline, None if never found)
    pub uid: Option<String>,
    pub total: f64,
    pub cpu: f64,
    pub wifi: f64,
    pub screen: f64,
    /// Only present when the device reports smearing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proportional: Option<f64>,
}

impl PowerBreakdown {
    /// Render in the `{"type": "power", ...}` shape used for results ingestion.
    pub fn to_power_data(&self) -> serde_json::Value {
        let mut values = serde_json::json!({
            "cpu": self.cpu,
            "wifi": self.wifi,
            "screen": self.screen,
        });
        if let Some(proportional) = self.proportional {
            values["proportional"] = serde_json::json!(proportional);
        }

        serde_json::json!({
            "type": "power",
            "test": self.test,
            "unit": self.unit,
            "values": values,
        })
    }
}

/// Turns raw report text into a [`PowerBreakdown`].
pub trait PowerReportParser: Send + Sync {
    fn parse(&self, text: &str) -> PowerBreakdown;
}

const POWER_TAIL: &str = r"[:]\s+([\d.]+) [(]([\s\w.=]*)(?:([)] Including smearing:.*)|[)])";

struct Patterns {
    estimated_power: Regex,
    full_screen: Regex,
    full_wifi: Regex,
    any_uid_power: Regex,
    cpu: Regex,
    wifi: Regex,
    smear: Regex,
    screen: Regex,
    proportional: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        estimated_power: Regex::new(r"^\s+Estimated power use [(]mAh[)]").unwrap(),
        full_screen: Regex::new(r"^\s+Screen:\s+([\d.]+)").unwrap(),
        full_wifi: Regex::new(r"^\s+Wifi:\s+([\d.]+)").unwrap(),
        any_uid_power: Regex::new(&format!(r"^\s+Uid\s+\w+{}", POWER_TAIL)).unwrap(),
        cpu: Regex::new(r"^.*cpu=([\d.]+)").unwrap(),
        wifi: Regex::new(r"^.*wifi=([\d.]+)").unwrap(),
        smear: Regex::new(r"^.*smearing:\s+([\d.]+)\s+").unwrap(),
        screen: Regex::new(r"screen=([\d.]+)").unwrap(),
        proportional: Regex::new(r"proportional=([\d.]+)").unwrap(),
    })
}

fn capture_f64(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Regex-based batterystats parser
pub struct BatterystatsParser {
    options: ParseOptions,
    uid_line: Regex,
}

impl BatterystatsParser {
    pub fn new(options: ParseOptions) -> Result<Self> {
        let uid_line = Regex::new(&format!(
            r#"proc=([^:]+):"{}""#,
            regex::escape(&options.process_name)
        ))
        .map_err(|e| ScreenNoiseError::Config(format!("Invalid process name: {}", e)))?;

        Ok(Self { options, uid_line })
    }

    fn uid_power_pattern(uid: &str) -> Option<Regex> {
        match Regex::new(&format!(r"^\s+Uid {}{}", regex::escape(uid), POWER_TAIL)) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Cannot scope power lines to uid {}: {}", uid, e);
                None
            }
        }
    }
}

impl PowerReportParser for BatterystatsParser {
    fn parse(&self, text: &str) -> PowerBreakdown {
        let p = patterns();
        let baseline = self.options.baseline;

        let mut estimated_power = false;
        let mut uid: Option<String> = None;
        let mut uid_power: Option<Regex> = None;
        let (mut total, mut cpu, mut wifi) = (0.0, 0.0, 0.0);
        let (mut smearing, mut screen, mut proportional) = (0.0, 0.0, 0.0);
        let mut full_screen = 0.0;
        let mut full_wifi = 0.0;

        for line in text.split('\n') {
            // The proc line naming the uid comes before the power section
            if uid.is_none() && !baseline {
                if let Some(found) = self
                    .uid_line
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                {
                    tracing::debug!("Matched uid {} for {}", found, self.options.process_name);
                    uid_power = Self::uid_power_pattern(&found);
                    uid = Some(found);
                    continue;
                }
            }

            if !estimated_power {
                if p.estimated_power.is_match(line) {
                    estimated_power = true;
                }
                continue;
            }

            if full_screen == 0.0 {
                if let Some(value) = capture_f64(&p.full_screen, line) {
                    full_screen += value;
                    continue;
                }
            }
            if full_wifi == 0.0 {
                if let Some(value) = capture_f64(&p.full_wifi, line) {
                    full_wifi += value;
                    continue;
                }
            }

            let power = uid_power.as_ref().unwrap_or(&p.any_uid_power);
            if let Some(caps) = power.captures(line) {
                total += caps
                    .get(1)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .unwrap_or(0.0);

                let breakdown = caps.get(2).map_or("", |m| m.as_str());
                if let Some(value) = capture_f64(&p.cpu, breakdown) {
                    cpu += value;
                }
                if let Some(value) = capture_f64(&p.wifi, breakdown) {
                    wifi += value;
                }

                if let Some(smear_info) = caps.get(3).map(|m| m.as_str()) {
                    if let Some(value) = capture_f64(&p.smear, smear_info) {
                        smearing += value;
                    }
                    // Searched over the whole line, not just the smearing part
                    if let Some(value) = capture_f64(&p.screen, line) {
                        screen += value;
                    }
                    if let Some(value) = capture_f64(&p.proportional, smear_info) {
                        proportional += value;
                    }
                }
            }

            let have_totals = full_screen != 0.0 && full_wifi != 0.0;
            let have_entry = (cpu != 0.0 && wifi != 0.0 && smearing != 0.0) || total != 0.0;
            if have_totals && have_entry {
                // A baseline lists every uid; read until the list ends
                if !baseline || line.chars().all(|c| c == ' ') {
                    break;
                }
            }
        }

        if cpu == 0.0 {
            cpu = total;
        }
        if screen == 0.0 {
            screen = full_screen;
        }
        if wifi == 0.0 {
            wifi = full_wifi;
        }

        if baseline {
            uid = Some("all".to_string());
        }

        tracing::info!(
            "power data for uid: {}, cpu: {}, wifi: {}, screen: {}, proportional: {}",
            uid.as_deref().unwrap_or("None"),
            cpu,
            wifi,
            screen,
            proportional
        );

        PowerBreakdown {
            test: self.options.test_name.clone(),
            unit: "mAh".to_string(),
            uid,
            total,
            cpu,
            wifi,
            screen,
            proportional: self
                .options
                .android_version
                .reports_proportional()
                .then_some(proportional),
        }
    }
}

/// Parse a report with a one-off parser.
pub fn parse_batterystats(text: &str, options: ParseOptions) -> Result<PowerBreakdown> {
    Ok(BatterystatsParser::new(options)?.parse(text))
}
