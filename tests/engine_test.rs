// HTTP plan store and persistence sink against a fake engine

mod common;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use certwarden::WardenError;
use certwarden::certificates::{CertificateStatus, TlsProbe};
use certwarden::checker::{CertificateChecker, CheckRequest};
use certwarden::error::TrialExhaustedReason;
use certwarden::monitor::cadence::CheckCadence;
use certwarden::plan::{PlanIdentity, PlanTier};
use certwarden::store::http::DEFAULT_ENGINE_TIMEOUT;
use certwarden::store::{
    CertificateSink, CheckRecord, EngineClient, HttpCertificateSink, HttpPlanStore, PlanStore,
    StaticTeamDirectory,
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

const TOKEN: &str = "engine-secret";

#[derive(Default)]
struct FakeEngine {
    consumed: Mutex<HashSet<String>>,
    records: Mutex<Vec<Value>>,
}

type Reply = (StatusCode, Json<Value>);

fn authorized(headers: &HeaderMap) -> Result<(), Reply> {
    match headers.get("X-Engine-Token").and_then(|v| v.to_str().ok()) {
        Some(TOKEN) => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "code": "UNAUTHORIZED", "message": "bad engine token"})),
        )),
    }
}

fn identity_of(headers: &HeaderMap) -> String {
    headers
        .get("X-Plan-Identity")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn plan_status(State(engine): State<Arc<FakeEngine>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    let identity = identity_of(&headers);
    if identity == "pro-customer" {
        return (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "plan": "PRO",
                "limit": 25,
                "expires_at": "2099-01-01T00:00:00Z"
            })),
        );
    }

    let remaining = if engine.consumed.lock().await.contains(&identity) { 0 } else { 1 };
    (
        StatusCode::OK,
        Json(json!({"ok": true, "plan": "FREE", "limit": 1, "remaining": remaining})),
    )
}

async fn consume_trial(State(engine): State<Arc<FakeEngine>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    if engine.consumed.lock().await.insert(identity_of(&headers)) {
        (StatusCode::OK, Json(json!({"consumed": true})))
    } else {
        (
            StatusCode::CONFLICT,
            Json(json!({"ok": false, "code": "TRIAL_ALREADY_CONSUMED"})),
        )
    }
}

async fn run(
    State(engine): State<Arc<FakeEngine>>,
    headers: HeaderMap,
    Json(record): Json<Value>,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    if record["domain"] == "blocked.example.test" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "ok": false,
                "code": "FREE_LIMIT_REACHED",
                "message": "Free plan allows only 1 domain on this machine."
            })),
        );
    }
    engine.records.lock().await.push(record);
    (StatusCode::OK, Json(json!({"ok": true})))
}

async fn spawn_engine() -> (SocketAddr, Arc<FakeEngine>) {
    let engine = Arc::new(FakeEngine::default());
    let app = Router::new()
        .route("/plan/status", get(plan_status))
        .route("/plan/consume-trial", post(consume_trial))
        .route("/run", post(run))
        .with_state(engine.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, engine)
}

fn client(addr: SocketAddr, token: &str) -> EngineClient {
    EngineClient::new(
        format!("http://{}/", addr),
        Some(token.to_string()),
        DEFAULT_ENGINE_TIMEOUT,
    )
    .unwrap()
}

fn record(domain: &str) -> CheckRecord {
    let now = Utc::now();
    CheckRecord {
        domain: domain.to_string(),
        cn: domain.to_string(),
        start_date: (now - Duration::days(30)).date_naive(),
        end_date: (now + Duration::days(60)).date_naive(),
        days_remaining: 60,
        status: CertificateStatus::Valid,
        last_checked: now,
        check_frequency: CheckCadence::Daily,
        next_check_at: now + Duration::days(1),
        custom_alert_days: None,
        custom_emails: None,
        team_id: None,
        notified: false,
    }
}

#[tokio::test]
async fn test_plan_store_trial_compare_and_set() {
    let (addr, _engine) = spawn_engine().await;
    let store = HttpPlanStore::new(client(addr, TOKEN));
    let id = PlanIdentity::new("machine-a").unwrap();

    let state = store.load(&id).await.unwrap();
    assert_eq!(state.tier, PlanTier::Free);
    assert!(!state.trial_consumed);

    assert!(store.commit_trial_consumed(&id).await.unwrap());
    assert!(!store.commit_trial_consumed(&id).await.unwrap());
    assert!(store.load(&id).await.unwrap().trial_consumed);

    // Identities are independent
    let other = PlanIdentity::new("machine-b").unwrap();
    assert!(!store.load(&other).await.unwrap().trial_consumed);
}

#[tokio::test]
async fn test_plan_store_reads_pro_plan() {
    let (addr, _engine) = spawn_engine().await;
    let store = HttpPlanStore::new(client(addr, TOKEN));

    let state = store
        .load(&PlanIdentity::new("pro-customer").unwrap())
        .await
        .unwrap();
    match state.tier {
        PlanTier::Pro {
            max_sites,
            license_expires_at,
        } => {
            assert_eq!(max_sites, 25);
            assert!(license_expires_at.is_some());
        }
        other => panic!("expected pro tier, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_token_is_upstream_error() {
    let (addr, _engine) = spawn_engine().await;
    let store = HttpPlanStore::new(client(addr, "wrong"));

    let err = store
        .load(&PlanIdentity::new("machine-a").unwrap())
        .await
        .unwrap_err();
    match err {
        WardenError::Upstream {
            collaborator,
            status,
            message,
        } => {
            assert_eq!(collaborator, "plan");
            assert_eq!(status, Some(401));
            assert!(message.starts_with("UNAUTHORIZED"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sink_maps_plan_limit_to_trial_exhausted() {
    let (addr, engine) = spawn_engine().await;
    let sink = HttpCertificateSink::new(client(addr, TOKEN));

    sink.persist(&record("ok.example.test")).await.unwrap();
    let stored = engine.records.lock().await.clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["check_frequency"], "daily");
    assert_eq!(stored[0]["status"], "valid");
    assert_eq!(stored[0]["end_date"].as_str().unwrap().len(), 10);

    let err = sink
        .persist(&record("blocked.example.test"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TRIAL_EXHAUSTED");
    match err {
        WardenError::TrialExhausted { reason } => {
            assert_eq!(reason, TrialExhaustedReason::SiteLimitReached);
        }
        other => panic!("expected trial exhausted, got {:?}", other),
    }
    assert_eq!(engine.records.lock().await.len(), 1);
}

#[tokio::test]
async fn test_unreachable_engine_is_upstream_error() {
    let port = common::closed_port().await;
    let store = HttpPlanStore::new(client(
        format!("127.0.0.1:{}", port).parse().unwrap(),
        TOKEN,
    ));

    let err = store
        .load(&PlanIdentity::new("machine-a").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_checker_with_engine_collaborators() {
    let cert = common::cert_expiring_in("engine.example.test", 20);
    let tls_addr = common::spawn_tls_server(&cert).await;
    let (engine_addr, engine) = spawn_engine().await;

    let checker = CertificateChecker::new(
        Arc::new(HttpPlanStore::new(client(engine_addr, TOKEN))),
        Arc::new(HttpCertificateSink::new(client(engine_addr, TOKEN))),
        Arc::new(StaticTeamDirectory::new(Vec::new())),
    )
    .with_probe(
        TlsProbe::new(std::time::Duration::from_secs(5))
            .with_resolve("engine.example.test", tls_addr.ip()),
    );

    let id = PlanIdentity::new("machine-c").unwrap();
    let url = format!("https://engine.example.test:{}", tls_addr.port());

    let report = checker
        .check(&CheckRequest::new(id.clone(), url.clone()).with_cadence("weekly"))
        .await
        .unwrap();
    assert_eq!(report.status, CertificateStatus::Valid);
    assert_eq!(report.days_remaining, 20);

    let stored = engine.records.lock().await.clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["domain"], "engine.example.test");
    assert_eq!(stored[0]["check_frequency"], "weekly");

    let err = checker
        .check(&CheckRequest::new(id, url))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TRIAL_EXHAUSTED");
}
