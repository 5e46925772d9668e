// In-memory collaborators
//
// Used by tests, the CLI and single-process deployments. The trial
// compare-and-set runs under one mutex.

use super::CheckRecord;
use super::traits::{CertificateSink, PlanStore, TeamDirectory};
use crate::monitor::alerts::TeamDefaults;
use crate::plan::{PlanIdentity, PlanState, PlanTier};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Plan store held in process memory
#[derive(Debug)]
pub struct MemoryPlanStore {
    default_tier: PlanTier,
    states: Mutex<HashMap<PlanIdentity, PlanState>>,
}

impl MemoryPlanStore {
    /// New identities start on `default_tier` with the trial unused
    pub fn new(default_tier: PlanTier) -> Self {
        Self {
            default_tier,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Set the state of one identity
    pub async fn set_state(&self, identity: &PlanIdentity, state: PlanState) {
        self.states.lock().await.insert(identity.clone(), state);
    }

    fn initial_state(&self) -> PlanState {
        PlanState {
            tier: self.default_tier,
            trial_consumed: false,
        }
    }
}

impl Default for MemoryPlanStore {
    fn default() -> Self {
        Self::new(PlanTier::Free)
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn load(&self, identity: &PlanIdentity) -> crate::Result<PlanState> {
        let states = self.states.lock().await;
        Ok(states
            .get(identity)
            .copied()
            .unwrap_or_else(|| self.initial_state()))
    }

    async fn commit_trial_consumed(&self, identity: &PlanIdentity) -> crate::Result<bool> {
        let mut states = self.states.lock().await;
        let initial = self.initial_state();
        let state = states.entry(identity.clone()).or_insert(initial);

        if state.trial_consumed {
            return Ok(false);
        }
        state.trial_consumed = true;
        Ok(true)
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}

/// Persistence sink keeping the latest record per domain
#[derive(Debug, Default)]
pub struct MemoryCertificateSink {
    records: Mutex<Vec<CheckRecord>>,
}

impl MemoryCertificateSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored records, in insertion order
    pub async fn records(&self) -> Vec<CheckRecord> {
        self.records.lock().await.clone()
    }

    /// Latest record for `domain` (case-insensitive)
    pub async fn get(&self, domain: &str) -> Option<CheckRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.domain.eq_ignore_ascii_case(domain))
            .cloned()
    }
}

#[async_trait]
impl CertificateSink for MemoryCertificateSink {
    async fn persist(&self, record: &CheckRecord) -> crate::Result<()> {
        let mut records = self.records.lock().await;
        match records
            .iter_mut()
            .find(|r| r.domain.eq_ignore_ascii_case(&record.domain))
        {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "memory"
    }
}

/// Team directory backed by a fixed map, usually loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticTeamDirectory {
    teams: HashMap<String, TeamDefaults>,
}

impl StaticTeamDirectory {
    pub fn new(teams: impl IntoIterator<Item = TeamDefaults>) -> Self {
        Self {
            teams: teams
                .into_iter()
                .map(|team| (team.team_id.clone(), team))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

#[async_trait]
impl TeamDirectory for StaticTeamDirectory {
    async fn team(&self, team_id: &str) -> crate::Result<Option<TeamDefaults>> {
        Ok(self.teams.get(team_id.trim()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::CertificateStatus;
    use crate::monitor::cadence::CheckCadence;
    use chrono::Utc;
    use std::sync::Arc;

    fn identity(id: &str) -> PlanIdentity {
        PlanIdentity::new(id).unwrap()
    }

    fn record(domain: &str, days: i64) -> CheckRecord {
        let now = Utc::now();
        CheckRecord {
            domain: domain.to_string(),
            cn: domain.to_string(),
            start_date: now.date_naive(),
            end_date: now.date_naive(),
            days_remaining: days,
            status: CertificateStatus::Valid,
            last_checked: now,
            check_frequency: CheckCadence::Daily,
            next_check_at: now,
            custom_alert_days: None,
            custom_emails: None,
            team_id: None,
            notified: false,
        }
    }

    #[tokio::test]
    async fn test_unknown_identity_is_fresh() {
        let store = MemoryPlanStore::default();
        assert_eq!(store.load(&identity("a")).await.unwrap(), PlanState::fresh());
    }

    #[tokio::test]
    async fn test_commit_is_compare_and_set() {
        let store = MemoryPlanStore::default();
        let id = identity("a");

        assert!(store.commit_trial_consumed(&id).await.unwrap());
        assert!(!store.commit_trial_consumed(&id).await.unwrap());
        assert!(store.load(&id).await.unwrap().trial_consumed);

        // Other identities are unaffected
        assert!(!store.load(&identity("b")).await.unwrap().trial_consumed);
    }

    #[tokio::test]
    async fn test_concurrent_commits_have_one_winner() {
        let store = Arc::new(MemoryPlanStore::default());
        let id = identity("race");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store.commit_trial_consumed(&id).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_sink_upserts_by_domain() {
        let sink = MemoryCertificateSink::new();
        sink.persist(&record("example.test", 30)).await.unwrap();
        sink.persist(&record("EXAMPLE.test", 29)).await.unwrap();
        sink.persist(&record("other.test", 5)).await.unwrap();

        let records = sink.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(sink.get("example.test").await.unwrap().days_remaining, 29);
    }

    #[tokio::test]
    async fn test_static_team_directory() {
        let directory = StaticTeamDirectory::new(vec![TeamDefaults {
            team_id: "ops".to_string(),
            alert_days: Some(15),
            emails: vec!["ops@example.test".to_string()],
        }]);

        assert_eq!(directory.len(), 1);
        assert_eq!(
            directory.team("ops").await.unwrap().unwrap().alert_days,
            Some(15)
        );
        assert!(directory.team("missing").await.unwrap().is_none());
    }
}
