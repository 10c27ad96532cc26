/**
 * Router Configuration
 *
 * Assembles the top-level routes, the nested API groups and the layers
 * shared by every request.
 *
 * # Route Order
 *
 * 1. Service routes (`/`, `/api/health`, `/ws`)
 * 2. API groups from `api_routes`
 * 3. JSON 404 fallback
 *
 * # Layers
 *
 * - `DefaultBodyLimit` caps JSON bodies at `config.body_limit`
 * - `CorsLayer` allows the configured origin, or any origin
 * - `TraceLayer` opens a span per request
 */
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::realtime::ws_handler;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Body of `GET /api/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since startup
    pub uptime: f64,
    pub environment: String,
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "askVeda API is running" }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        uptime: state.uptime_secs(),
        environment: state.config.environment.clone(),
    })
}

async fn not_found() -> BackendError {
    BackendError::not_found("Route not found")
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    match config.cors_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!("Ignoring invalid CORS_ORIGIN ({}), allowing any origin", e);
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

/// Create the Axum router with all routes configured
///
/// # Routes
///
/// - `GET /` - liveness message
/// - `GET /api/health` - status, uptime and environment
/// - `GET /ws` - WebSocket relay
/// - `/api/auth`, `/api/chats`, `/api/messages`, `/api/admin`, `/api/ai`
///
/// Unknown paths answer `404 {"error": "Route not found", "status": 404}`.
pub fn create_router(app_state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/ws", get(ws_handler));

    let router = configure_api_routes(router, &app_state);

    router
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(app_state.config.body_limit))
        .layer(cors_layer(&app_state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
