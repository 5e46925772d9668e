// HTTP collaborators - Plan store and persistence sink backed by the engine
//
// Every request carries the shared `X-Engine-Token`. Plan requests also
// carry the caller identity in `X-Plan-Identity`.

use super::CheckRecord;
use super::traits::{CertificateSink, PlanStore};
use crate::error::{TrialExhaustedReason, WardenError};
use crate::plan::{PlanIdentity, PlanState, UpstreamPlan};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Header carrying the engine shared secret
pub const ENGINE_TOKEN_HEADER: &str = "X-Engine-Token";

/// Header carrying the plan identity
pub const PLAN_IDENTITY_HEADER: &str = "X-Plan-Identity";

/// Engine code for a plan that cannot take another domain
pub const FREE_LIMIT_REACHED: &str = "FREE_LIMIT_REACHED";

/// Default request timeout for engine calls
pub const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body the engine sends with non-2xx responses
#[derive(Debug, Default, Deserialize)]
struct EngineErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl EngineErrorBody {
    fn is_plan_limit(&self) -> bool {
        self.code.as_deref().or(self.error.as_deref()) == Some(FREE_LIMIT_REACHED)
    }

    fn describe(self, fallback: &str) -> String {
        let code = self.code.or(self.error);
        let message = self.message.or(self.detail);
        match (code, message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (Some(code), None) => code,
            (None, Some(message)) => message,
            (None, None) => fallback.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConsumeTrialBody {
    #[serde(default)]
    consumed: Option<bool>,
}

/// Thin client for the engine HTTP API
#[derive(Debug, Clone)]
pub struct EngineClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl EngineClient {
    /// Create a client for the engine at `base_url`
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WardenError::upstream("engine", None, e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.header(ENGINE_TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send(&self, collaborator: &str, request: RequestBuilder) -> crate::Result<Response> {
        request.send().await.map_err(|e| {
            error!("{} request failed: {}", collaborator, e);
            WardenError::upstream(collaborator, e.status().map(|s| s.as_u16()), e.to_string())
        })
    }

    async fn error_from(collaborator: &str, response: Response) -> WardenError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<EngineErrorBody>(&body).unwrap_or_default();

        if body.is_plan_limit() {
            warn!("{} refused by plan limit: {:?}", collaborator, body.message);
            return WardenError::TrialExhausted {
                reason: TrialExhaustedReason::SiteLimitReached,
            };
        }

        let message = body.describe(status.canonical_reason().unwrap_or("request failed"));
        error!("{} returned {}: {}", collaborator, status, message);
        WardenError::upstream(collaborator, Some(status.as_u16()), message)
    }
}

/// Plan store delegating to the engine
#[derive(Debug, Clone)]
pub struct HttpPlanStore {
    engine: EngineClient,
}

impl HttpPlanStore {
    const COLLABORATOR: &'static str = "plan";

    pub fn new(engine: EngineClient) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl PlanStore for HttpPlanStore {
    async fn load(&self, identity: &PlanIdentity) -> crate::Result<PlanState> {
        let request = self
            .engine
            .request(Method::GET, "/plan/status")
            .header(PLAN_IDENTITY_HEADER, identity.as_str());
        let response = self.engine.send(Self::COLLABORATOR, request).await?;

        if !response.status().is_success() {
            return Err(EngineClient::error_from(Self::COLLABORATOR, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| WardenError::upstream(Self::COLLABORATOR, None, e.to_string()))?;
        debug!("Plan status for {}: {}", identity, body);

        Ok(UpstreamPlan::from_body(&body).normalize())
    }

    async fn commit_trial_consumed(&self, identity: &PlanIdentity) -> crate::Result<bool> {
        let request = self
            .engine
            .request(Method::POST, "/plan/consume-trial")
            .header(PLAN_IDENTITY_HEADER, identity.as_str())
            .json(&serde_json::json!({ "identity": identity.as_str() }));
        let response = self.engine.send(Self::COLLABORATOR, request).await?;

        // Engine answers 409 when another request consumed the trial first
        if response.status() == StatusCode::CONFLICT {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(EngineClient::error_from(Self::COLLABORATOR, response).await);
        }

        let body: ConsumeTrialBody = response
            .json()
            .await
            .map_err(|e| WardenError::upstream(Self::COLLABORATOR, None, e.to_string()))?;
        Ok(body.consumed.unwrap_or(true))
    }

    fn store_name(&self) -> &str {
        Self::COLLABORATOR
    }
}

/// Persistence sink posting records to the engine `/run` endpoint
#[derive(Debug, Clone)]
pub struct HttpCertificateSink {
    engine: EngineClient,
}

impl HttpCertificateSink {
    const COLLABORATOR: &'static str = "persistence";

    pub fn new(engine: EngineClient) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl CertificateSink for HttpCertificateSink {
    async fn persist(&self, record: &CheckRecord) -> crate::Result<()> {
        let request = self.engine.request(Method::POST, "/run").json(record);
        let response = self.engine.send(Self::COLLABORATOR, request).await?;

        if !response.status().is_success() {
            return Err(EngineClient::error_from(Self::COLLABORATOR, response).await);
        }

        debug!("Persisted check record for {}", record.domain);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        Self::COLLABORATOR
    }
}
