/**
 * Server Initialization
 *
 * Builds the application state from a validated `AppConfig` and assembles
 * the router.
 *
 * # Initialization Process
 *
 * 1. Select the repository (Postgres with migrations, or in-memory)
 * 2. Create the room registry and the AI service client
 * 3. Create the router with all routes and layers
 * 4. Spawn the periodic sweep of empty rooms
 *
 * A database that cannot be reached or migrated aborts startup.
 */
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;

use crate::backend::ai::AiUpstream;
use crate::backend::error::BackendError;
use crate::backend::realtime::RoomRegistry;
use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;
use crate::backend::store::create_repository;
use crate::shared::AppConfig;

/// Interval between sweeps of rooms nobody is subscribed to
pub const ROOM_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Build the shared application state
pub async fn build_state(config: AppConfig) -> Result<AppState, BackendError> {
    let repository = create_repository(&config).await?;
    tracing::info!("Storage backend: {}", repository.backend_name());

    let ai = AiUpstream::new(config.ai_service_url.clone(), config.ai_connect_timeout)
        .map_err(|e| BackendError::internal("Failed to create AI service client", e))?;
    tracing::info!("AI service: {}", ai.base_url());

    Ok(AppState {
        repository,
        rooms: RoomRegistry::new(),
        config: Arc::new(config),
        ai,
        started_at: Instant::now(),
    })
}

/// Create and configure the Axum application
///
/// Must be called inside a Tokio runtime; the room sweeper is spawned onto it.
pub async fn create_app(config: AppConfig) -> Result<Router, BackendError> {
    tracing::info!("Initializing askVeda backend server");

    let app_state = build_state(config).await?;
    let app = create_router(app_state.clone());

    spawn_room_sweeper(app_state.rooms.clone(), ROOM_SWEEP_INTERVAL);
    tracing::info!("Router configured with periodic room cleanup");

    Ok(app)
}

/// Periodically drop room channels without subscribers
pub fn spawn_room_sweeper(rooms: RoomRegistry, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = rooms.cleanup_inactive_channels();
            tracing::debug!("Cleaned up {} inactive room channels", removed);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_state_defaults_to_memory() {
        let state = build_state(AppConfig::builder().build().unwrap()).await.unwrap();
        assert_eq!(state.repository.backend_name(), "memory");
        assert_eq!(state.rooms.room_count(), 0);
        assert_eq!(state.ai.base_url(), "http://localhost:8004");
    }

    #[tokio::test]
    async fn test_sweeper_removes_empty_rooms() {
        let rooms = RoomRegistry::new();
        drop(rooms.subscribe("abandoned"));
        let _kept = rooms.subscribe("kept");
        assert_eq!(rooms.room_count(), 2);

        let sweeper = spawn_room_sweeper(rooms.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweeper.abort();

        assert_eq!(rooms.room_count(), 1);
        assert_eq!(rooms.subscriber_count("kept"), 1);
    }
}
