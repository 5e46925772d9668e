// Upstream Plan - Normalize plan responses from the plan service
//
// The plan service has answered in three shapes over time. Each known shape
// has one normalization into PlanState. Anything else is treated as a free
// plan with the trial already used; an unknown plan name never grants pro.

use super::gate::{PlanState, PlanTier};
use super::license::{DEFAULT_PRO_MAX_SITES, parse_expiry};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET /plan/status` response of the engine
#[derive(Debug, Clone, Deserialize)]
pub struct EngineStatus {
    #[serde(default)]
    pub ok: Option<bool>,
    pub plan: String,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub remaining: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// License limits as resolved by the dashboard backend
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseLimits {
    pub tier: String,
    pub max_sites: i64,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub free_run_available: Option<bool>,
}

/// Bare free-run flag
#[derive(Debug, Clone, Deserialize)]
pub struct FreeGuard {
    pub free_run_available: bool,
}

/// Any plan response the service may send
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UpstreamPlan {
    Engine(EngineStatus),
    Limits(LicenseLimits),
    Guard(FreeGuard),
    Unrecognized(serde_json::Value),
}

impl UpstreamPlan {
    /// Parse a response body; bodies that are not JSON are unrecognized
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| {
            UpstreamPlan::Unrecognized(serde_json::Value::String(body.to_string()))
        })
    }

    /// Normalize into a plan state
    pub fn normalize(self) -> PlanState {
        match self {
            UpstreamPlan::Engine(status) => normalize_engine(status),
            UpstreamPlan::Limits(limits) => normalize_limits(limits),
            UpstreamPlan::Guard(guard) => PlanState {
                tier: PlanTier::Free,
                trial_consumed: !guard.free_run_available,
            },
            UpstreamPlan::Unrecognized(value) => {
                tracing::warn!(
                    "Unrecognized plan response, assuming free without trial: {}",
                    value
                );
                exhausted_free()
            }
        }
    }
}

fn exhausted_free() -> PlanState {
    PlanState {
        tier: PlanTier::Free,
        trial_consumed: true,
    }
}

fn clamp_sites(limit: Option<i64>) -> u32 {
    match limit {
        Some(n) if n < 1 => 1,
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
        None => DEFAULT_PRO_MAX_SITES,
    }
}

/// `None` for absent or blank, `Err` for unparseable
fn expiry_of(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_expiry(raw).map(Some).ok_or_else(|| raw.to_string()),
    }
}

fn pro_or_exhausted(limit: Option<i64>, expires_at: Option<&str>) -> PlanState {
    match expiry_of(expires_at) {
        Ok(license_expires_at) => PlanState {
            tier: PlanTier::Pro {
                license_expires_at,
                max_sites: clamp_sites(limit),
            },
            trial_consumed: false,
        },
        Err(raw) => {
            tracing::warn!("Unparseable license expiry '{}' from plan service", raw);
            exhausted_free()
        }
    }
}

fn normalize_engine(status: EngineStatus) -> PlanState {
    if status.ok == Some(false) {
        return exhausted_free();
    }

    match status.plan.trim().to_ascii_uppercase().as_str() {
        "PRO" => pro_or_exhausted(status.limit, status.expires_at.as_deref()),
        "FREE" => PlanState {
            tier: PlanTier::Free,
            trial_consumed: status.remaining.unwrap_or(0) <= 0,
        },
        other => {
            tracing::warn!("Unknown plan '{}' from plan service", other);
            exhausted_free()
        }
    }
}

fn normalize_limits(limits: LicenseLimits) -> PlanState {
    match limits.tier.trim().to_ascii_lowercase().as_str() {
        "pro" => pro_or_exhausted(Some(limits.max_sites), limits.expires_at.as_deref()),
        "free" => PlanState {
            tier: PlanTier::Free,
            trial_consumed: !limits.free_run_available.unwrap_or(true),
        },
        other => {
            tracing::warn!("Unknown tier '{}' from plan service", other);
            exhausted_free()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> PlanState {
        UpstreamPlan::from_body(body).normalize()
    }

    #[test]
    fn test_engine_free_with_remaining() {
        let state = parse(
            r#"{"ok": true, "plan": "FREE", "limit": 1, "remaining": 1, "expires_at": null}"#,
        );
        assert_eq!(state, PlanState::fresh());
    }

    #[test]
    fn test_engine_free_used() {
        let state = parse(r#"{"ok": true, "plan": "FREE", "limit": 1, "remaining": 0}"#);
        assert!(state.trial_consumed);
        assert_eq!(state.tier, PlanTier::Free);
    }

    #[test]
    fn test_engine_pro() {
        let state = parse(
            r#"{"ok": true, "plan": "PRO", "limit": 999999,
                "remaining": null, "expires_at": "2030-01-01T00:00:00+00:00"}"#,
        );
        match state.tier {
            PlanTier::Pro {
                license_expires_at,
                max_sites,
            } => {
                assert_eq!(max_sites, 999_999);
                assert_eq!(
                    license_expires_at.unwrap().to_rfc3339(),
                    "2030-01-01T00:00:00+00:00"
                );
            }
            PlanTier::Free => panic!("expected pro"),
        }
    }

    #[test]
    fn test_engine_pro_with_date_only_expiry() {
        let state = parse(
            r#"{"ok": true, "plan": "PRO", "limit": 999999, "expires_at": "2030-01-01"}"#,
        );
        assert!(!state.trial_consumed);
        assert_eq!(
            state.tier,
            PlanTier::Pro {
                license_expires_at: parse_expiry("2030-01-01T00:00:00Z"),
                max_sites: 999_999,
            }
        );

        let now = "2029-06-01T00:00:00Z".parse().unwrap();
        assert!(crate::plan::admit(&state, now).is_ok());
    }

    #[test]
    fn test_limits_pro_with_date_only_expiry() {
        let state = parse(r#"{"tier": "pro", "max_sites": 5, "expires_at": "2031-02-03"}"#);
        match state.tier {
            PlanTier::Pro {
                license_expires_at, ..
            } => assert_eq!(
                license_expires_at.unwrap().date_naive().to_string(),
                "2031-02-03"
            ),
            PlanTier::Free => panic!("expected pro"),
        }
    }

    #[test]
    fn test_engine_unknown_plan_is_never_pro() {
        let state = parse(r#"{"ok": true, "plan": "ENTERPRISE", "limit": 5}"#);
        assert_eq!(state.tier, PlanTier::Free);
        assert!(state.trial_consumed);
    }

    #[test]
    fn test_license_limits_shape() {
        let pro = parse(r#"{"tier": "pro", "max_sites": 0, "expires_at": null}"#);
        assert_eq!(
            pro.tier,
            PlanTier::Pro {
                license_expires_at: None,
                max_sites: 1
            }
        );

        let free = parse(r#"{"tier": "free", "max_sites": 1}"#);
        assert_eq!(free, PlanState::fresh());
    }

    #[test]
    fn test_free_guard_shape() {
        assert_eq!(parse(r#"{"free_run_available": true}"#), PlanState::fresh());
        assert!(parse(r#"{"free_run_available": false}"#).trial_consumed);
    }

    #[test]
    fn test_unrecognized_shapes_are_exhausted_free() {
        for body in [r#"{"status": "weird"}"#, "[]", "not json", r#"{"plan": 7}"#] {
            let state = parse(body);
            assert_eq!(state.tier, PlanTier::Free, "body {}", body);
            assert!(state.trial_consumed, "body {}", body);
        }
    }

    #[test]
    fn test_bad_pro_expiry_fails_closed() {
        let state = parse(r#"{"plan": "PRO", "expires_at": "soon"}"#);
        assert!(state.trial_consumed);
        assert_eq!(state.tier, PlanTier::Free);
    }
}
