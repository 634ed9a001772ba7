//! Knobs for a [`DateBuiltin`](crate::DateBuiltin).

use std::fmt;
use std::str::FromStr;

use crate::zone::HostZone;

/// How `Date.UTC` turns its components into a time value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UtcMode {
    /// Interpret the components on a UTC calendar.
    #[default]
    Calendar,
    /// Run the local-time component constructor and read back its time
    /// value. Only agrees with `Calendar` when the local zone is UTC; kept
    /// for hosts whose conformance results depend on it.
    LocalDelegate,
}

impl FromStr for UtcMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calendar" | "utc" => Ok(UtcMode::Calendar),
            "local-delegate" | "local" | "delegate" => Ok(UtcMode::LocalDelegate),
            other => Err(format!(
                "invalid UTC mode {other:?}, expected calendar or local-delegate"
            )),
        }
    }
}

impl fmt::Display for UtcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtcMode::Calendar => write!(f, "calendar"),
            UtcMode::LocalDelegate => write!(f, "local-delegate"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DateConfig {
    pub zone: HostZone,
    pub utc_mode: UtcMode,
}

impl DateConfig {
    pub fn with_zone(mut self, zone: HostZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_utc_mode(mut self, utc_mode: UtcMode) -> Self {
        self.utc_mode = utc_mode;
        self
    }
}
