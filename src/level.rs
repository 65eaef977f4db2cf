//! # Severity Levels
//!
//! A [`Level`] is an ordered integer severity: higher values are more severe.
//! The four built-in levels are spaced four apart so that applications can
//! slot their own severities in between (for example a "notice" level at
//! `INFO + 2`).
//!
//! ## Display Convention
//!
//! Built-in levels render as `DEBUG`, `INFO`, `WARN` and `ERROR`. Any other
//! value renders as the nearest lower built-in name followed by its signed
//! distance from it, e.g. `WARN+2` or `DEBUG-1`. Custom level names are not
//! known to `Level` itself; they are substituted at output time by the
//! attribute rewriter in [`crate::config`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An ordered log severity.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Level(pub i32);

impl Level {
    /// Diagnostic detail normally hidden in production.
    pub const DEBUG: Level = Level(-4);
    /// Routine operational messages. The default threshold.
    pub const INFO: Level = Level(0);
    /// Something unexpected that the program recovered from.
    pub const WARN: Level = Level(4);
    /// An operation failed.
    pub const ERROR: Level = Level(8);

    /// Built-in levels keyed by their lowercase flag name, least severe first.
    pub const BUILTIN: [(&'static str, Level); 4] = [
        ("debug", Level::DEBUG),
        ("info", Level::INFO),
        ("warn", Level::WARN),
        ("error", Level::ERROR),
    ];

    /// Returns the raw integer severity.
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Looks up a built-in level by name, ignoring case.
    pub fn builtin(name: &str) -> Option<Level> {
        Self::BUILTIN
            .iter()
            .find(|(builtin, _)| builtin.eq_ignore_ascii_case(name))
            .map(|(_, level)| *level)
    }

    /// Returns this level shifted by `delta` steps.
    pub const fn offset(self, delta: i32) -> Level {
        Level(self.0 + delta)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (base, name) = if *self < Level::INFO {
            (Level::DEBUG, "DEBUG")
        } else if *self < Level::WARN {
            (Level::INFO, "INFO")
        } else if *self < Level::ERROR {
            (Level::WARN, "WARN")
        } else {
            (Level::ERROR, "ERROR")
        };

        let delta = self.0 - base.0;
        if delta == 0 {
            f.write_str(name)
        } else {
            write!(f, "{}{:+}", name, delta)
        }
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

/// Error returned when a string cannot be parsed as a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLevelError {
    #[error("unknown level name {0:?}")]
    UnknownName(String),
    #[error("invalid level offset {offset:?} in {input:?}")]
    InvalidOffset { input: String, offset: String },
}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses the textual form produced by `Display`, e.g. `"warn"`,
    /// `"INFO+1"` or `"debug-2"`. Names are case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, offset) = match s.find(|c: char| c == '+' || c == '-') {
            Some(idx) => (&s[..idx], Some(&s[idx..])),
            None => (s, None),
        };

        let base =
            Level::builtin(name).ok_or_else(|| ParseLevelError::UnknownName(s.to_string()))?;

        match offset {
            None => Ok(base),
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .and_then(|delta| base.0.checked_add(delta))
                .map(Level)
                .ok_or_else(|| ParseLevelError::InvalidOffset {
                    input: s.to_string(),
                    offset: raw.to_string(),
                }),
        }
    }
}
