// Plan Gate - Freemium admission rule
//
// Free tier: one lifetime check per identity. Pro tier: unlimited while the
// license has not expired. The local decision here is advisory; the plan
// store's compare-and-set on the trial is what makes the free check unique.

use crate::Result;
use crate::error::{TrialExhaustedReason, WardenError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Site cap reported for free plans
pub const FREE_MAX_SITES: u32 = 1;

/// Identity keying a plan state (API key, session or account id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanIdentity(String);

impl PlanIdentity {
    /// Build an identity; blank identities are rejected
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(WardenError::invalid_input("plan identity cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlanIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plan tier. Only a paid tier can carry a license expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro {
        license_expires_at: Option<DateTime<Utc>>,
        max_sites: u32,
    },
}

impl PlanTier {
    pub fn name(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro { .. } => "pro",
        }
    }
}

/// Plan state of one identity, as held by the plan store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanState {
    pub tier: PlanTier,
    pub trial_consumed: bool,
}

impl PlanState {
    /// Free plan with the trial still available
    pub fn fresh() -> Self {
        Self {
            tier: PlanTier::Free,
            trial_consumed: false,
        }
    }

    /// Gate phase as of `now`
    pub fn phase(&self, now: DateTime<Utc>) -> GatePhase {
        match self.tier {
            PlanTier::Free if self.trial_consumed => GatePhase::FreeConsumed,
            PlanTier::Free => GatePhase::FreeUnused,
            PlanTier::Pro {
                license_expires_at: Some(expires_at),
                ..
            } if expires_at <= now => GatePhase::ProExpired,
            PlanTier::Pro { .. } => GatePhase::ProActive,
        }
    }
}

impl Default for PlanState {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Admission phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePhase {
    FreeUnused,
    FreeConsumed,
    ProActive,
    ProExpired,
}

/// How a check was admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Free check; the trial must be committed once the check succeeds
    Trial,
    /// Unexpired paid license; nothing to commit
    Licensed,
}

impl Admission {
    pub fn requires_commit(&self) -> bool {
        matches!(self, Admission::Trial)
    }
}

/// Decide whether a check may run for `state` at `now`
pub fn admit(state: &PlanState, now: DateTime<Utc>) -> Result<Admission> {
    match state.phase(now) {
        GatePhase::ProActive => Ok(Admission::Licensed),
        GatePhase::FreeUnused => Ok(Admission::Trial),
        GatePhase::FreeConsumed => Err(WardenError::TrialExhausted {
            reason: TrialExhaustedReason::TrialConsumed,
        }),
        GatePhase::ProExpired => Err(WardenError::TrialExhausted {
            reason: TrialExhaustedReason::LicenseExpired,
        }),
    }
}

/// Plan status as reported to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub tier: String,
    pub max_sites: u32,
    pub free_run_available: bool,
    pub license_expires_at: Option<DateTime<Utc>>,
    pub phase: GatePhase,
}

/// Summarize `state` as of `now`
pub fn resolve_plan(state: &PlanState, now: DateTime<Utc>) -> PlanSummary {
    let phase = state.phase(now);

    match state.tier {
        PlanTier::Free => PlanSummary {
            tier: "free".to_string(),
            max_sites: FREE_MAX_SITES,
            free_run_available: !state.trial_consumed,
            license_expires_at: None,
            phase,
        },
        PlanTier::Pro {
            license_expires_at,
            max_sites,
        } => PlanSummary {
            tier: "pro".to_string(),
            max_sites: max_sites.max(1),
            free_run_available: false,
            license_expires_at,
            phase,
        },
    }
}
