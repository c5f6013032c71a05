//! Severity levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Log severity level.
///
/// Four tiers, ordered from least to most severe. The wrapper itself never
/// filters on level; what to keep is the sinks' decision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Diagnostic detail.
    Debug,
    /// Routine operational messages.
    Info,
    /// Unexpected but recoverable conditions.
    Warn,
    /// Failures.
    Error,
}

impl Level {
    /// All levels, least to most severe.
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// Lowercase name, as it appears in serialized records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&Level::Warn).unwrap();
        assert_eq!(json, "\"warn\"");

        let parsed: Level = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(parsed, Level::Debug);
    }

    #[test]
    fn test_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_display_matches_as_str() {
        for level in Level::ALL {
            assert_eq!(level.to_string(), level.as_str());
        }
    }
}
