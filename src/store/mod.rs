// Store module - External collaborators for plan state, check results and teams
//
// The core never owns storage. These traits describe what it asks of the
// services that do, with in-memory, file and HTTP implementations.

pub mod file;
pub mod http;
pub mod memory;
pub mod traits;

pub use file::FilePlanStore;
pub use http::{EngineClient, HttpCertificateSink, HttpPlanStore};
pub use memory::{MemoryCertificateSink, MemoryPlanStore, StaticTeamDirectory};
pub use traits::{CertificateSink, PlanStore, TeamDirectory};

use crate::certificates::CertificateStatus;
use crate::monitor::cadence::CheckCadence;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Check result as handed to the persistence service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub domain: String,
    pub cn: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_remaining: i64,
    pub status: CertificateStatus,
    pub last_checked: DateTime<Utc>,
    pub check_frequency: CheckCadence,
    pub next_check_at: DateTime<Utc>,
    pub custom_alert_days: Option<u32>,
    pub custom_emails: Option<String>,
    pub team_id: Option<String>,
    /// A fresh check has not been notified yet
    pub notified: bool,
}
