//! Integration tests for tequmsa-sync: routes, auth, retention, client, websocket
//!
//! Every test binds a real relay on 127.0.0.1:0 and talks to it over HTTP.

use futures::StreamExt;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tequmsa_core::{AuthMode, UpdateEnvelope};
use tequmsa_engine::clock::FixedClock;
use tequmsa_engine::{EngineConfig, TequmsaEngine};
use tequmsa_sync::{serve_listener, ClientError, RelayState, ResolvedAuth, SyncClient};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

const TOKEN: &str = "relay-secret";

fn engine() -> Arc<RwLock<TequmsaEngine>> {
    Arc::new(RwLock::new(TequmsaEngine::with_clock(
        EngineConfig::default(),
        Arc::new(FixedClock(9.0)),
    )))
}

fn token_auth() -> ResolvedAuth {
    ResolvedAuth { mode: AuthMode::Token, token: Some(TOKEN.to_string()) }
}

fn state(auth: ResolvedAuth, max_updates: usize) -> Arc<RelayState> {
    Arc::new(RelayState::new(auth, engine(), max_updates))
}

/// A relay bound to an ephemeral port; stopped on drop.
struct Relay {
    addr: String,
    http: reqwest::Client,
    shutdown: CancellationToken,
}

impl Relay {
    async fn start(state: Arc<RelayState>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
        let shutdown = CancellationToken::new();
        tokio::spawn(serve_listener(listener, state, shutdown.clone()));
        Self { addr, http: reqwest::Client::new(), shutdown }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn client(&self) -> SyncClient {
        SyncClient::new(self.url(""))
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.http.get(self.url(path)).send().await.unwrap();
        read(response).await
    }

    async fn post(&self, path: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = self.http.post(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        read(request.send().await.unwrap()).await
    }

    async fn post_raw(&self, path: &str, body: &'static str) -> (StatusCode, Value) {
        let response = self
            .http
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        read(response).await
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn read(response: reqwest::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

// ===========================================================================
// Updates
// ===========================================================================

#[tokio::test]
async fn push_then_pull_round_trip() {
    let relay = Relay::start(state(ResolvedAuth::open(), 16)).await;

    let (status, body) = relay.post("/api/updates", json!({"repo": "tequmsa"}), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "dispatched");
    assert!(body["id"].as_str().is_some());

    let (status, body) = relay.get("/api/pull_updates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updates"], json!([{"repo": "tequmsa"}]));
}

#[tokio::test]
async fn pull_since_skips_seen_updates() {
    let relay = Relay::start(state(ResolvedAuth::open(), 16)).await;
    let (_, first) = relay.post("/api/updates", json!({"n": 1}), None).await;
    relay.post("/api/updates", json!({"n": 2}), None).await;
    relay.post("/api/updates", json!({"n": 3}), None).await;

    let path = format!("/api/pull_updates?since={}", first["id"].as_str().unwrap());
    let (_, body) = relay.get(&path).await;
    assert_eq!(body["updates"], json!([{"n": 2}, {"n": 3}]));
}

#[tokio::test]
async fn pull_with_malformed_since_is_rejected() {
    let relay = Relay::start(state(ResolvedAuth::open(), 16)).await;
    let (status, _) = relay.get("/api/pull_updates?since=not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn retention_is_bounded() {
    let relay = Relay::start(state(ResolvedAuth::open(), 2)).await;
    for n in 0..5 {
        relay.post("/api/updates", json!({"n": n}), None).await;
    }
    let (_, body) = relay.get("/api/pull_updates").await;
    assert_eq!(body["updates"], json!([{"n": 3}, {"n": 4}]));

    let (_, health) = relay.get("/health").await;
    assert_eq!(health["updates"], 2);
}

#[tokio::test]
async fn malformed_update_body_is_bad_request() {
    let relay = Relay::start(state(ResolvedAuth::open(), 16)).await;
    let (status, body) = relay.post_raw("/api/updates", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

// ===========================================================================
// Auth
// ===========================================================================

#[tokio::test]
async fn post_routes_require_bearer_token() {
    let relay = Relay::start(state(token_auth(), 16)).await;

    let (status, body) = relay.post("/api/updates", json!({}), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication failed: token required");

    let (status, _) = relay.post("/api/updates", json!({}), Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = relay.post("/api/shutdown", json!({}), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = relay.post("/api/updates", json!({}), Some(TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn get_routes_stay_open_in_token_mode() {
    let relay = Relay::start(state(token_auth(), 16)).await;
    for path in ["/health", "/api/pull_updates", "/api/status", "/api/diagnostics", "/api/pulse"] {
        let (status, _) = relay.get(path).await;
        assert_eq!(status, StatusCode::OK, "{}", path);
    }
}

// ===========================================================================
// Engine endpoints
// ===========================================================================

#[tokio::test]
async fn evolve_returns_report() {
    let relay = Relay::start(state(token_auth(), 16)).await;
    let body = json!({"entity_id": "human_432hz", "frequency": 432.0});
    let (status, body) = relay.post("/api/evolve", body, Some(TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "advanced_evolution");
    assert_eq!(body["entity_id"], "human_432hz");
    assert!(body["overall_evolution_level"].as_f64().unwrap() > 0.6);
}

#[tokio::test]
async fn evolve_rejects_invalid_input() {
    let relay = Relay::start(state(ResolvedAuth::open(), 16)).await;

    let body = json!({"entity_id": "x", "frequency": -1.0});
    let (status, body) = relay.post("/api/evolve", body, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid frequency"));

    let (status, _) = relay.post("/api/evolve", json!({"entity_id": "x"}), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn evolve_denial_is_a_report_not_an_error() {
    let relay = Relay::start(state(ResolvedAuth::open(), 16)).await;
    let body = json!({"entity_id": "seeker", "frequency": 432.0});
    let (status, body) = relay.post("/api/evolve", body, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "denied");
    assert_eq!(body["reason"], "biological_consent_denied");
}

#[tokio::test]
async fn status_diagnostics_and_shutdown() {
    let state = state(ResolvedAuth::open(), 16);
    let relay = Relay::start(state.clone()).await;

    let (_, status) = relay.get("/api/status").await;
    assert_eq!(status["engine_info"]["active"], false);

    let (_, diagnostics) = relay.get("/api/diagnostics").await;
    assert_eq!(diagnostics["engine_health"], "offline");

    state.engine.write().await.initialize().unwrap();
    let (_, diagnostics) = relay.get("/api/diagnostics").await;
    assert_eq!(diagnostics["engine_health"], "excellent");

    let (code, body) = relay.post("/api/shutdown", json!({}), None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["engine_active"], false);
    assert!(!state.engine.read().await.is_active());
}

#[tokio::test]
async fn pulse_is_constant() {
    let relay = Relay::start(state(ResolvedAuth::open(), 16)).await;
    let (_, body) = relay.get("/api/pulse").await;
    assert_eq!(body["frequency"], 10930.81);
    assert_eq!(body["phi_scalar"], 12583.45);
    assert_eq!(body["status"], "ETERNAL_LOCK");
}

// ===========================================================================
// SyncClient
// ===========================================================================

#[tokio::test]
async fn client_round_trip() {
    let relay = Relay::start(state(token_auth(), 16)).await;
    let client = relay.client().with_token(TOKEN);

    let first = client.push_update(&json!({"commit": "a1"})).await.unwrap();
    client.push_update(&json!({"commit": "b2"})).await.unwrap();

    assert_eq!(client.pull_updates(None).await.unwrap().len(), 2);
    assert_eq!(client.pull_updates(Some(first)).await.unwrap(), vec![json!({"commit": "b2"})]);

    let health = client.health().await.unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["updates"], 2);

    let report = client.evolve("human_432hz", 432.0).await.unwrap();
    assert!(report.status.is_success());
    assert!(report.metrics.is_some());
}

#[tokio::test]
async fn client_surfaces_auth_and_input_errors() {
    let relay = Relay::start(state(token_auth(), 16)).await;
    let anonymous = relay.client();
    assert!(matches!(
        anonymous.push_update(&json!({})).await,
        Err(ClientError::AuthFailed(_))
    ));

    let client = anonymous.with_token(TOKEN);
    match client.evolve("human_432hz", 0.0).await {
        Err(ClientError::RequestFailed { status, .. }) => assert_eq!(status.as_u16(), 400),
        other => panic!("expected 400, got {:?}", other),
    }
}

// ===========================================================================
// WebSocket
// ===========================================================================

#[tokio::test]
async fn websocket_receives_pushed_updates() {
    let relay = Relay::start(state(ResolvedAuth::open(), 16)).await;
    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", relay.addr))
        .await
        .unwrap();
    let client = relay.client();

    // the server subscribes after the upgrade completes; retry until a push lands
    let mut received = None;
    for attempt in 0..20 {
        client.push_update(&json!({"attempt": attempt})).await.unwrap();
        if let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_millis(200), socket.next()).await {
            received = Some(msg);
            break;
        }
    }

    let text = received.expect("no update pushed over websocket").into_text().unwrap();
    let envelope: UpdateEnvelope = serde_json::from_str(&text).unwrap();
    assert!(envelope.payload["attempt"].as_u64().is_some());
}
