//! Record severity scale.
//!
//! Six levels ordered from `Trace` to `Critical`. `Critical` sits above
//! `Error` so producers that distinguish fatal conditions keep their most
//! severe tier when records cross the bridge into a chat.

use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl Level {
    /// Marker glyph for message decoration: white circle below `Info`,
    /// blue circle at `Info`, red circle above it.
    pub fn emoji(self) -> char {
        match self {
            Level::Trace | Level::Debug => '\u{26AA}',
            Level::Info => '\u{1F535}',
            Level::Warn | Level::Error | Level::Critical => '\u{1F534}',
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

impl FromStr for Level {
    type Err = ();

    /// Case-insensitive name lookup. "WARNING" is accepted as an alias of
    /// `Warn` for configurations written against other logging stacks.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(()),
        }
    }
}
