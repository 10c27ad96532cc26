/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is the central state container, holding:
 * - the storage repository (Postgres or in-memory)
 * - the WebSocket room registry
 * - the loaded configuration
 * - the AI service client
 *
 * Every field is cheap to clone (`Arc` or a handle type), so the whole
 * state is cloned into each request.
 *
 * # Example
 *
 * ```rust,no_run
 * use askveda::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(state): State<AppState>) {
 *     let backend = state.repository.backend_name();
 *     // ...
 * }
 * ```
 */
use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use crate::backend::ai::AiUpstream;
use crate::backend::realtime::RoomRegistry;
use crate::backend::store::Repository;
use crate::shared::AppConfig;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Storage backend for users, sessions, chats and messages
    pub repository: Arc<dyn Repository>,

    /// Per-room broadcast channels of the WebSocket relay
    pub rooms: RoomRegistry,

    pub config: Arc<AppConfig>,

    /// Client for the external AI service
    pub ai: AiUpstream,

    /// Process start, reported as uptime by `/api/health`
    pub started_at: Instant,
}

impl AppState {
    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

/// Implement FromRef for the repository
///
/// Handlers that only touch storage can take `State<Arc<dyn Repository>>`.
impl FromRef<AppState> for Arc<dyn Repository> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.repository.clone()
    }
}

impl FromRef<AppState> for RoomRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rooms.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for AiUpstream {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.ai.clone()
    }
}
