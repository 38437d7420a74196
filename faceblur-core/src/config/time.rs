//! Parsing of cut start/duration values.
//!
//! The canonical format is `mm:ss`. Raw whole seconds are accepted only when
//! the settings select [`TimeFormat::Seconds`] explicitly.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// How start/duration values are written in the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// `mm:ss`, e.g. `"01:30"` for ninety seconds.
    #[default]
    MinutesSeconds,
    /// Whole seconds, e.g. `"90"`.
    Seconds,
}

impl TimeFormat {
    /// Parses a time value into whole seconds.
    pub fn parse_secs(self, value: &str) -> CoreResult<u32> {
        let value = value.trim();
        match self {
            TimeFormat::Seconds => value
                .parse::<u32>()
                .map_err(|e| CoreError::InvalidTime(value.to_string(), e.to_string())),
            TimeFormat::MinutesSeconds => {
                let (minutes, seconds) = value.split_once(':').ok_or_else(|| {
                    CoreError::InvalidTime(value.to_string(), "expected mm:ss".to_string())
                })?;
                let minutes = minutes
                    .parse::<u32>()
                    .map_err(|e| CoreError::InvalidTime(value.to_string(), e.to_string()))?;
                let seconds = seconds
                    .parse::<u32>()
                    .map_err(|e| CoreError::InvalidTime(value.to_string(), e.to_string()))?;
                if seconds >= 60 {
                    return Err(CoreError::InvalidTime(
                        value.to_string(),
                        "seconds must be below 60".to_string(),
                    ));
                }
                minutes
                    .checked_mul(60)
                    .and_then(|m| m.checked_add(seconds))
                    .ok_or_else(|| CoreError::InvalidTime(value.to_string(), "overflow".to_string()))
            }
        }
    }

    /// Renders whole seconds back into this format.
    #[must_use]
    pub fn format_secs(self, secs: u32) -> String {
        match self {
            TimeFormat::Seconds => secs.to_string(),
            TimeFormat::MinutesSeconds => format!("{:02}:{:02}", secs / 60, secs % 60),
        }
    }
}

impl FromStr for TimeFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm:ss" | "minutes" => Ok(TimeFormat::MinutesSeconds),
            "seconds" | "secs" | "s" => Ok(TimeFormat::Seconds),
            other => Err(CoreError::InvalidSettings(format!(
                "unknown time format '{other}' (expected \"mm:ss\" or \"seconds\")"
            ))),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::MinutesSeconds => f.write_str("mm:ss"),
            TimeFormat::Seconds => f.write_str("seconds"),
        }
    }
}
