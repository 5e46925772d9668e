// Collaborator Traits
// Interfaces to the services that own plan, certificate and team records

use super::CheckRecord;
use crate::monitor::alerts::TeamDefaults;
use crate::plan::{PlanIdentity, PlanState};
use async_trait::async_trait;

/// Plan collaborator: owns every identity's plan state
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Current plan state of `identity`. Unknown identities are fresh free plans.
    async fn load(&self, identity: &PlanIdentity) -> crate::Result<PlanState>;

    /// Atomically mark the free trial of `identity` as consumed
    ///
    /// Returns `true` when this call made the transition and `false` when the
    /// trial was already consumed. Among concurrent callers exactly one wins.
    async fn commit_trial_consumed(&self, identity: &PlanIdentity) -> crate::Result<bool>;

    /// Short name used in logs and upstream errors
    fn store_name(&self) -> &str;
}

/// Persistence collaborator: stores check results
#[async_trait]
pub trait CertificateSink: Send + Sync {
    /// Upsert the record for `record.domain`
    async fn persist(&self, record: &CheckRecord) -> crate::Result<()>;

    fn sink_name(&self) -> &str;
}

/// Team collaborator: alert defaults per team
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// Defaults for `team_id`, or `None` when the team does not exist
    async fn team(&self, team_id: &str) -> crate::Result<Option<TeamDefaults>>;
}
