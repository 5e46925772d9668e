// Check Cadence - Maps a requested re-check frequency to an interval
//
// The core only exposes the mapping. Running checks on a timer belongs to an
// external scheduler, which reads `next_check_at` from each check report.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Supported re-check intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckCadence {
    #[default]
    Hourly,
    EveryTwoHours,
    EveryFourHours,
    EveryEightHours,
    EveryTwelveHours,
    Daily,
    Weekly,
    Monthly,
}

impl CheckCadence {
    /// Every supported cadence, shortest first
    pub const ALL: [CheckCadence; 8] = [
        CheckCadence::Hourly,
        CheckCadence::EveryTwoHours,
        CheckCadence::EveryFourHours,
        CheckCadence::EveryEightHours,
        CheckCadence::EveryTwelveHours,
        CheckCadence::Daily,
        CheckCadence::Weekly,
        CheckCadence::Monthly,
    ];

    /// Parse a cadence token. Unknown or blank tokens map to the default (1h).
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "1h" => CheckCadence::Hourly,
            "2h" => CheckCadence::EveryTwoHours,
            "4h" => CheckCadence::EveryFourHours,
            "8h" => CheckCadence::EveryEightHours,
            "12h" => CheckCadence::EveryTwelveHours,
            "daily" => CheckCadence::Daily,
            "weekly" => CheckCadence::Weekly,
            "monthly" => CheckCadence::Monthly,
            _ => CheckCadence::default(),
        }
    }

    /// Parse an optional token; absent maps to the default
    pub fn from_optional(token: Option<&str>) -> Self {
        token.map(Self::from_token).unwrap_or_default()
    }

    /// Canonical token
    pub fn token(&self) -> &'static str {
        match self {
            CheckCadence::Hourly => "1h",
            CheckCadence::EveryTwoHours => "2h",
            CheckCadence::EveryFourHours => "4h",
            CheckCadence::EveryEightHours => "8h",
            CheckCadence::EveryTwelveHours => "12h",
            CheckCadence::Daily => "daily",
            CheckCadence::Weekly => "weekly",
            CheckCadence::Monthly => "monthly",
        }
    }

    /// Interval between two checks
    pub fn interval(&self) -> Duration {
        match self {
            CheckCadence::Hourly => Duration::hours(1),
            CheckCadence::EveryTwoHours => Duration::hours(2),
            CheckCadence::EveryFourHours => Duration::hours(4),
            CheckCadence::EveryEightHours => Duration::hours(8),
            CheckCadence::EveryTwelveHours => Duration::hours(12),
            CheckCadence::Daily => Duration::hours(24),
            CheckCadence::Weekly => Duration::hours(168),
            CheckCadence::Monthly => Duration::hours(720),
        }
    }

    /// Interval as a std Duration, for tokio timers in external schedulers
    pub fn std_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval().num_seconds().unsigned_abs())
    }

    /// When the next check is due if one ran at `now`
    pub fn next_check_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.interval()
    }
}

impl std::fmt::Display for CheckCadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for CheckCadence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for CheckCadence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(CheckCadence::from_token(&token))
    }
}
