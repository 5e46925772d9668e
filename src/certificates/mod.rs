// Certificates module - Probing, expiry classification and key matching

pub mod key_match;
pub mod probe;
pub mod status;

pub use key_match::{KeyMatchReport, KeyMatchResult, KeyMatcher, MismatchReason, match_key};
pub use probe::TlsProbe;
pub use status::{CertificateStatus, classify, days_remaining};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a probe observed about a domain's leaf certificate.
///
/// Produced fresh by every probe and never mutated; a newer probe supersedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateFact {
    pub domain: String,
    pub common_name: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
}

impl CertificateFact {
    /// Whole days left before expiry, as of `now`
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        status::days_remaining(self.not_after, now)
    }

    /// Status as of `now` for the given alert threshold
    pub fn status(&self, now: DateTime<Utc>, threshold_days: u32) -> CertificateStatus {
        status::classify(self.not_after, now, threshold_days)
    }
}
