// Certificate Status - Classify a certificate by time left before expiry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Lifecycle status of a certificate relative to an alert threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Valid,
    Expiring,
    Expired,
}

impl CertificateStatus {
    /// Lowercase token used on the wire and by the persistence service
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Valid => "valid",
            CertificateStatus::Expiring => "expiring",
            CertificateStatus::Expired => "expired",
        }
    }

    /// Whether this status warrants an alert
    pub fn needs_attention(&self) -> bool {
        !matches!(self, CertificateStatus::Valid)
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole days between `now` and `not_after`, rounded toward negative infinity
///
/// A certificate expiring in 36 hours has 1 day remaining; one that expired
/// 1 hour ago has -1.
pub fn days_remaining(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (not_after - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Classify from an already computed day count
pub fn classify_days(days_remaining: i64, threshold_days: u32) -> CertificateStatus {
    if days_remaining <= 0 {
        CertificateStatus::Expired
    } else if days_remaining <= i64::from(threshold_days) {
        CertificateStatus::Expiring
    } else {
        CertificateStatus::Valid
    }
}

/// Classify a certificate expiring at `not_after`, observed at `now`
pub fn classify(
    not_after: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold_days: u32,
) -> CertificateStatus {
    classify_days(days_remaining(not_after, now), threshold_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_days_remaining_floors() {
        let now = now();
        assert_eq!(days_remaining(now + Duration::hours(36), now), 1);
        assert_eq!(days_remaining(now + Duration::hours(23), now), 0);
        assert_eq!(days_remaining(now - Duration::hours(1), now), -1);
        assert_eq!(days_remaining(now - Duration::days(3), now), -3);
        assert_eq!(days_remaining(now + Duration::days(5), now), 5);
    }

    #[test]
    fn test_expired_when_no_days_left() {
        for days in [-400, -1, 0] {
            assert_eq!(classify_days(days, 10), CertificateStatus::Expired);
        }
        // Still valid for a few hours, but 0 whole days remain
        let now = now();
        assert_eq!(
            classify(now + Duration::hours(5), now, 10),
            CertificateStatus::Expired
        );
    }

    #[test]
    fn test_expiring_within_threshold() {
        for days in 1..=10 {
            assert_eq!(classify_days(days, 10), CertificateStatus::Expiring);
        }
    }

    #[test]
    fn test_threshold_boundary_is_expiring() {
        assert_eq!(classify_days(10, 10), CertificateStatus::Expiring);
        assert_eq!(classify_days(11, 10), CertificateStatus::Valid);
    }

    #[test]
    fn test_valid_beyond_threshold() {
        for days in [11, 30, 365] {
            assert_eq!(classify_days(days, 10), CertificateStatus::Valid);
        }
    }

    #[test]
    fn test_zero_threshold_never_expiring() {
        assert_eq!(classify_days(1, 0), CertificateStatus::Valid);
        assert_eq!(classify_days(0, 0), CertificateStatus::Expired);
    }

    #[test]
    fn test_threshold_is_respected() {
        let now = now();
        let not_after = now + Duration::days(20);
        assert_eq!(classify(not_after, now, 10), CertificateStatus::Valid);
        assert_eq!(classify(not_after, now, 30), CertificateStatus::Expiring);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&CertificateStatus::Expiring).unwrap(),
            "\"expiring\""
        );
        assert_eq!(CertificateStatus::Expired.to_string(), "expired");
        assert!(CertificateStatus::Expired.needs_attention());
        assert!(!CertificateStatus::Valid.needs_attention());
    }
}
