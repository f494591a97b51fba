// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Battery temperature extraction from `dumpsys battery` output.

use regex::Regex;
use std::sync::OnceLock;

/// Return the first `temperature: <number>` value in the text.
pub fn parse_temperature(text: &str) -> Option<f64> {
    static TEMPERATURE: OnceLock<Regex> = OnceLock::new();
    let regex = TEMPERATURE.get_or_init(|| Regex::new(r".*\s+temperature:\s+([\d.]+)").unwrap());

    regex.captures(text)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_found() {
        let text = "Current Battery Service state:\n  level: 87\n  temperature: 31.5\n  technology: Li-ion\n";
        assert_eq!(parse_temperature(text), Some(31.5));
    }

    #[test]
    fn test_temperature_inline() {
        assert_eq!(parse_temperature("... temperature: 31.5 ..."), Some(31.5));
    }

    #[test]
    fn test_first_of_several() {
        let text = "  temperature: 300\n  voltage: 4000\n  temperature: 250\n";
        assert_eq!(parse_temperature(text), Some(300.0));
    }

    #[test]
    fn test_temperature_absent() {
        assert_eq!(parse_temperature("  level: 87\n  voltage: 4000\n"), None);
        assert_eq!(parse_temperature(""), None);
    }

    #[test]
    fn test_requires_whitespace_before_label() {
        assert_eq!(parse_temperature("temperature: 30"), None);
    }
}
