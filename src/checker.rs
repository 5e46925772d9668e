// Certificate Checker - Runs one certificate check end to end
//
// Order of a check:
// 1. Validate the URL, team and alert overrides (no network yet)
// 2. Ask the plan gate for admission
// 3. Probe the host and classify the certificate
// 4. Hand the record to the persistence collaborator
// 5. Commit the free trial at the plan store (free tier only)
//
// The trial is committed last, so a check that fails or is cancelled before
// it completes never consumes it. A check that loses the trial race keeps its
// stored record and reports TrialExhausted.

use crate::Result;
use crate::certificates::{CertificateFact, CertificateStatus, TlsProbe};
use crate::error::{TrialExhaustedReason, WardenError};
use crate::monitor::alerts::{AlertOverrides, AlertPolicy, TeamDefaults, resolve_policy_from};
use crate::monitor::cadence::CheckCadence;
use crate::plan::{PlanIdentity, PlanSummary, admit, resolve_plan};
use crate::security::{CheckTarget, validate_check_url};
use crate::store::{CertificateSink, CheckRecord, PlanStore, TeamDirectory};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Default number of checks `check_many` runs at once
pub const DEFAULT_MAX_CONCURRENT_CHECKS: usize = 16;

/// One certificate check as requested by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub identity: PlanIdentity,
    pub url: String,
    pub team_id: Option<String>,
    /// Comma-separated recipients overriding the team's
    pub custom_emails: Option<String>,
    pub custom_alert_days: Option<u32>,
    /// Cadence token (`1h`, `daily`, ...)
    pub cadence: Option<String>,
}

impl CheckRequest {
    pub fn new(identity: PlanIdentity, url: impl Into<String>) -> Self {
        Self {
            identity,
            url: url.into(),
            team_id: None,
            custom_emails: None,
            custom_alert_days: None,
            cadence: None,
        }
    }

    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn with_emails(mut self, emails: impl Into<String>) -> Self {
        self.custom_emails = Some(emails.into());
        self
    }

    pub fn with_alert_days(mut self, days: u32) -> Self {
        self.custom_alert_days = Some(days);
        self
    }

    pub fn with_cadence(mut self, token: impl Into<String>) -> Self {
        self.cadence = Some(token.into());
        self
    }

    fn team_id(&self) -> Option<&str> {
        self.team_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Result of a successful check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub domain: String,
    pub cn: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_remaining: i64,
    pub status: CertificateStatus,
    pub alert_policy: AlertPolicy,
    /// Status warrants an alert and someone is listed to receive it
    pub alert_due: bool,
    pub cadence: CheckCadence,
    pub next_check_at: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
}

impl CheckReport {
    fn build(fact: &CertificateFact, policy: AlertPolicy, cadence: CheckCadence) -> Self {
        let now = fact.observed_at;
        let status = fact.status(now, policy.threshold_days);

        Self {
            domain: fact.domain.clone(),
            cn: fact.common_name.clone(),
            start_date: fact.not_before.date_naive(),
            end_date: fact.not_after.date_naive(),
            days_remaining: fact.days_remaining(now),
            status,
            alert_due: status.needs_attention() && policy.has_recipients(),
            alert_policy: policy,
            cadence,
            next_check_at: cadence.next_check_at(now),
            observed_at: now,
        }
    }

    fn to_record(&self, request: &CheckRequest) -> CheckRecord {
        CheckRecord {
            domain: self.domain.clone(),
            cn: self.cn.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            days_remaining: self.days_remaining,
            status: self.status,
            last_checked: self.observed_at,
            check_frequency: self.cadence,
            next_check_at: self.next_check_at,
            custom_alert_days: request.custom_alert_days,
            custom_emails: request
                .custom_emails
                .as_deref()
                .filter(|raw| !raw.trim().is_empty())
                .map(|_| self.alert_policy.recipients.join(", ")),
            team_id: request.team_id().map(str::to_string),
            notified: false,
        }
    }
}

/// Certificate checker
///
/// Holds only shared handles to its collaborators; cloning is cheap and every
/// check is independent.
#[derive(Clone)]
pub struct CertificateChecker {
    probe: TlsProbe,
    plans: Arc<dyn PlanStore>,
    sink: Arc<dyn CertificateSink>,
    teams: Arc<dyn TeamDirectory>,
    base_policy: AlertPolicy,
    default_port: u16,
    max_concurrent: usize,
}

impl CertificateChecker {
    /// Create new checker with the default probe
    pub fn new(
        plans: Arc<dyn PlanStore>,
        sink: Arc<dyn CertificateSink>,
        teams: Arc<dyn TeamDirectory>,
    ) -> Self {
        Self {
            probe: TlsProbe::default(),
            plans,
            sink,
            teams,
            base_policy: AlertPolicy::system_default(),
            default_port: crate::certificates::probe::DEFAULT_TLS_PORT,
            max_concurrent: DEFAULT_MAX_CONCURRENT_CHECKS,
        }
    }

    pub fn with_probe(mut self, probe: TlsProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Threshold applied when neither team nor request sets one
    pub fn with_default_threshold(mut self, threshold_days: u32) -> Self {
        self.base_policy.threshold_days = threshold_days;
        self
    }

    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Plan summary for `identity`
    pub async fn plan_status(&self, identity: &PlanIdentity) -> Result<PlanSummary> {
        let state = self.plans.load(identity).await?;
        Ok(resolve_plan(&state, Utc::now()))
    }

    /// Validate everything the caller supplied before touching the network
    async fn prepare(
        &self,
        request: &CheckRequest,
    ) -> Result<(CheckTarget, AlertPolicy, CheckCadence)> {
        let target = validate_check_url(&request.url, self.default_port)?;

        let team: Option<TeamDefaults> = match request.team_id() {
            Some(team_id) => Some(self.teams.team(team_id).await?.ok_or_else(|| {
                WardenError::invalid_input(format!("unknown team '{}'", team_id))
            })?),
            None => None,
        };

        let policy = resolve_policy_from(
            self.base_policy.clone(),
            team.as_ref(),
            AlertOverrides {
                alert_days: request.custom_alert_days,
                emails: request.custom_emails.as_deref(),
            },
        )?;

        let cadence = CheckCadence::from_optional(request.cadence.as_deref());

        Ok((target, policy, cadence))
    }

    /// Run one check
    pub async fn check(&self, request: &CheckRequest) -> Result<CheckReport> {
        let (target, policy, cadence) = self.prepare(request).await?;

        let state = self.plans.load(&request.identity).await?;
        let admission = admit(&state, Utc::now())?;
        debug!(
            "Admitted check of {} for {} as {:?}",
            target.hostname, request.identity, admission
        );

        let fact = self.probe.probe(&target.hostname, target.port).await?;
        let report = CheckReport::build(&fact, policy, cadence);

        self.sink.persist(&report.to_record(request)).await?;
        debug!("Stored {} via {}", report.domain, self.sink.sink_name());

        if admission.requires_commit()
            && !self.plans.commit_trial_consumed(&request.identity).await?
        {
            warn!(
                "Free check of {} for {} lost the trial race at {}",
                target.hostname,
                request.identity,
                self.plans.store_name()
            );
            return Err(WardenError::TrialExhausted {
                reason: TrialExhaustedReason::TrialConsumed,
            });
        }

        info!(
            "Checked {}:{} - {} ({} days remaining)",
            target.hostname, target.port, report.status, report.days_remaining
        );

        Ok(report)
    }

    /// Run several checks concurrently
    ///
    /// Results come back in request order; one failure does not affect the
    /// other checks.
    pub async fn check_many(&self, requests: Vec<CheckRequest>) -> Vec<Result<CheckReport>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = Vec::with_capacity(requests.len());

        for request in requests {
            let checker = self.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.ok();
                checker.check(&request).await
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            results.push(task.await.unwrap_or_else(|e| {
                Err(WardenError::upstream(
                    "worker",
                    None,
                    format!("check task failed: {}", e),
                ))
            }));
        }
        results
    }
}
