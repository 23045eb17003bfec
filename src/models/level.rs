//! Syslog-style severity levels and their name conversions.
//!
//! GELF carries the severity as an integer 0 (most severe) to 7 (least
//! severe); logging interfaces address the same levels by their customary
//! names. Both directions are exposed here as pure conversions so callers
//! holding only a name or only an integer can translate without an event
//! instance.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A level value that is not a valid syslog severity or level name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid log level: {0}")]
pub struct InvalidLevel(pub String);

/// Log severity level.
///
/// Follows the syslog severity ordering: `Emergency` (0) is the most
/// severe, `Debug` (7) the least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    /// System is unusable.
    Emergency = 0,
    /// Action must be taken immediately.
    Alert = 1,
    /// Critical conditions.
    Critical = 2,
    /// Error conditions.
    Error = 3,
    /// Warning conditions.
    Warning = 4,
    /// Normal but significant condition.
    Notice = 5,
    /// Informational messages.
    Info = 6,
    /// Debug-level messages.
    Debug = 7,
}

impl LogLevel {
    /// Returns the raw syslog severity (0-7).
    #[must_use]
    pub const fn severity(self) -> u8 {
        self as u8
    }

    /// Returns the customary lowercase name of this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Converts a raw syslog severity into a level.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidLevel`] when `severity` is outside 0-7.
    pub fn from_severity(severity: u8) -> Result<Self, InvalidLevel> {
        match severity {
            0 => Ok(Self::Emergency),
            1 => Ok(Self::Alert),
            2 => Ok(Self::Critical),
            3 => Ok(Self::Error),
            4 => Ok(Self::Warning),
            5 => Ok(Self::Notice),
            6 => Ok(Self::Info),
            7 => Ok(Self::Debug),
            other => Err(InvalidLevel(other.to_string())),
        }
    }
}

impl Default for LogLevel {
    /// GELF events default to `Alert` (severity 1).
    fn default() -> Self {
        Self::Alert
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = InvalidLevel;

    /// Parses a level name, case-insensitively.
    ///
    /// Accepts the eight customary names plus the common short aliases
    /// `err` and `warn`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "emergency" => Ok(Self::Emergency),
            "alert" => Ok(Self::Alert),
            "critical" => Ok(Self::Critical),
            "error" | "err" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "notice" => Ok(Self::Notice),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            _ => Err(InvalidLevel(s.to_string())),
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = InvalidLevel;

    fn try_from(value: u8) -> Result<Self, InvalidLevel> {
        Self::from_severity(value)
    }
}

impl TryFrom<i32> for LogLevel {
    type Error = InvalidLevel;

    fn try_from(value: i32) -> Result<Self, InvalidLevel> {
        u8::try_from(value)
            .map_err(|_| InvalidLevel(value.to_string()))
            .and_then(Self::from_severity)
    }
}
