// Expiry Notice - Decide whether a check result warrants an alert
//
// Only the decision and the structured notice live here. Rendering and
// delivery belong to the notification service.

use crate::certificates::CertificateStatus;
use crate::checker::CheckReport;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Urgency of an expiry notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    Medium,
    High,
    Critical,
}

impl NoticeSeverity {
    fn for_days(status: CertificateStatus, days_remaining: i64) -> Self {
        if status == CertificateStatus::Expired || days_remaining <= 1 {
            NoticeSeverity::Critical
        } else if days_remaining <= 7 {
            NoticeSeverity::High
        } else {
            NoticeSeverity::Medium
        }
    }
}

/// Alert to hand to the notification service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryNotice {
    pub domain: String,
    pub common_name: String,
    pub status: CertificateStatus,
    pub severity: NoticeSeverity,
    pub days_remaining: i64,
    pub expires_on: NaiveDate,
    pub threshold_days: u32,
    pub recipients: Vec<String>,
    pub subject: String,
    pub message: String,
    pub generated_at: DateTime<Utc>,
}

impl ExpiryNotice {
    /// Plan a notice for `report`
    ///
    /// Returns `None` unless the certificate is expiring or expired, someone is
    /// listed to receive it and no notice went out for this certificate yet.
    pub fn plan(report: &CheckReport, already_notified: bool) -> Option<Self> {
        if already_notified
            || !report.status.needs_attention()
            || !report.alert_policy.has_recipients()
        {
            return None;
        }

        let (subject, message) = match report.status {
            CertificateStatus::Expired => (
                format!("SSL certificate expired: {}", report.domain),
                format!(
                    "The certificate for {} ({}) expired on {}.",
                    report.domain, report.cn, report.end_date
                ),
            ),
            _ => (
                format!("SSL certificate expiring: {}", report.domain),
                format!(
                    "The certificate for {} ({}) expires on {}, in {} days.",
                    report.domain, report.cn, report.end_date, report.days_remaining
                ),
            ),
        };

        Some(Self {
            domain: report.domain.clone(),
            common_name: report.cn.clone(),
            status: report.status,
            severity: NoticeSeverity::for_days(report.status, report.days_remaining),
            days_remaining: report.days_remaining,
            expires_on: report.end_date,
            threshold_days: report.alert_policy.threshold_days,
            recipients: report.alert_policy.recipients.clone(),
            subject,
            message,
            generated_at: report.observed_at,
        })
    }

    /// Key identifying the certificate this notice is about; one notice per key
    pub fn dedup_key(&self) -> String {
        format!("expiry:{}:{}", self.domain, self.expires_on)
    }
}
