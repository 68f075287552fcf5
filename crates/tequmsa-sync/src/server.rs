//! Relay server: update inbox/outbox, engine endpoints, websocket fan-out

use crate::auth::{ResolvedAuth, TOKEN_ENV};
use crate::state::RelayState;
use crate::ws::handle_connection;
use axum::{
    extract::{rejection::JsonRejection, Query, Request, State, WebSocketUpgrade},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tequmsa_core::{AuthMode, Error, RelayConfig};
use tequmsa_engine::recognition::universal_pulse;
use tequmsa_engine::{EvolutionReport, TequmsaEngine};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// JSON error body with the matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::AuthFailed { .. } => StatusCode::UNAUTHORIZED,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string() }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PullQuery {
    pub since: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct EvolveRequest {
    pub entity_id: String,
    pub frequency: f64,
}

/// Build the relay router. POST routes sit behind the auth layer.
pub fn app(state: Arc<RelayState>) -> Router {
    let protected = Router::new()
        .route("/api/updates", post(push_update_handler))
        .route("/api/evolve", post(evolve_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route("/api/pull_updates", get(pull_updates_handler))
        .route("/api/status", get(status_handler))
        .route("/api/diagnostics", get(diagnostics_handler))
        .route("/api/pulse", get(pulse_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

/// Bind per `config` and serve until `shutdown` is cancelled.
pub async fn serve(
    config: RelayConfig,
    engine: Arc<RwLock<TequmsaEngine>>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let env_token = std::env::var(TOKEN_ENV).ok();
    let auth = ResolvedAuth::from_config(&config.auth, env_token);
    if auth.mode == AuthMode::Token && auth.token.is_none() {
        warn!("Token auth enabled but no token configured; POST routes will reject every request");
    }

    let bind_addr: SocketAddr = format!("{}:{}", config.bind.to_addr(), config.port).parse()?;
    let listener = TcpListener::bind(&bind_addr).await?;

    info!("Tequmsa relay v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  WebSocket: ws://{}/ws", bind_addr);
    info!("  Auth mode: {:?}", auth.mode);
    info!("  Retained updates: {}", config.max_updates);

    let state = Arc::new(RelayState::new(auth, engine, config.max_updates));
    serve_listener(listener, state, shutdown).await
}

/// Serve on an already bound listener.
pub async fn serve_listener(
    listener: TcpListener,
    state: Arc<RelayState>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("Relay stopped");
    Ok(())
}

async fn require_auth(
    State(state): State<Arc<RelayState>>,
    request: Request,
    next: Next,
) -> Response {
    match state.auth.verify_headers(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            ApiError::from(e).into_response()
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn health_handler(State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    let updates = state.updates.lock().await.len();
    let engine_active = state.engine.read().await.is_active();
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "updates": updates,
        "engine_active": engine_active,
        "started_at": state.started_at,
    }))
}

async fn push_update_handler(
    State(state): State<Arc<RelayState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload?;
    debug!("Update payload: {}", payload);
    let id = state.dispatch(payload).await;
    info!("Update received: {}", id);
    Ok(Json(json!({ "status": "dispatched", "id": id })))
}

async fn pull_updates_handler(
    State(state): State<Arc<RelayState>>,
    Query(query): Query<PullQuery>,
) -> impl IntoResponse {
    let updates = state.updates.lock().await.payloads_since(query.since);
    Json(json!({ "updates": updates }))
}

async fn status_handler(State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    Json(state.engine.read().await.status())
}

async fn diagnostics_handler(State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    Json(state.engine.write().await.diagnostics())
}

async fn pulse_handler() -> impl IntoResponse {
    Json(universal_pulse())
}

async fn evolve_handler(
    State(state): State<Arc<RelayState>>,
    body: Result<Json<EvolveRequest>, JsonRejection>,
) -> Result<Json<EvolutionReport>, ApiError> {
    let Json(request) = body?;
    let report = state
        .engine
        .write()
        .await
        .activate_evolution(&request.entity_id, request.frequency)?;
    Ok(Json(report))
}

async fn shutdown_handler(State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    let mut engine = state.engine.write().await;
    engine.emergency_shutdown();
    Json(json!({ "status": "shutdown", "engine_active": engine.is_active() }))
}
