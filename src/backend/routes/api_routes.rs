/**
 * API Route Groups
 *
 * Each group is built as its own `Router<AppState>` and nested under its
 * prefix by `create_router`.
 *
 * # Routes
 *
 * ## Authentication (`/api/auth`, public)
 * - `POST /register`, `POST /login`, `GET /me`, `POST /logout`
 *
 * ## Chats (`/api/chats`, authenticated)
 * - `GET /`, `POST /`
 * - `GET|PUT|DELETE /{chat_id}`
 * - `POST /{chat_id}/participants`
 *
 * ## Messages (`/api/messages`, authenticated)
 * - `POST /`
 * - `GET /chat/{chat_id}`, `GET /chat/{chat_id}/unread`
 * - `PUT /{message_id}/read`, `DELETE /{message_id}`
 *
 * ## Admin (`/api/admin`, authenticated)
 * - `GET /chats`, `GET /chats/{chat_id}`, `GET /messages`, `GET /users`
 * - `GET /export/chat/{chat_id}`, `GET /export/session/{session_id}`
 * - `GET /stats`
 *
 * ## AI proxy (`/api/ai`, token only)
 * - `POST /stream`, `POST /chat`
 */
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::backend::middleware::{auth_middleware, token_middleware};
use crate::backend::server::state::AppState;
use crate::backend::{admin, ai, auth, chat, messaging};

/// Authentication routes
///
/// `/me` and `/logout` check the token inside the handler so that the
/// router itself stays public.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::get_me))
        .route("/logout", post(auth::logout))
}

/// Chat management routes
pub fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(chat::handlers::list_chats).post(chat::handlers::create_chat),
        )
        .route(
            "/{chat_id}",
            get(chat::handlers::get_chat)
                .put(chat::handlers::update_chat)
                .delete(chat::handlers::delete_chat),
        )
        .route("/{chat_id}/participants", post(chat::handlers::add_participant))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Message routes
pub fn message_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(messaging::send_message))
        .route("/chat/{chat_id}", get(messaging::list_chat_messages))
        .route("/chat/{chat_id}/unread", get(messaging::unread_count))
        .route("/{message_id}/read", put(messaging::mark_as_read))
        .route("/{message_id}", delete(messaging::delete_message))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Admin dashboard routes
pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/chats", get(admin::list_chats))
        .route("/chats/{chat_id}", get(admin::get_chat_detail))
        .route("/messages", get(admin::list_messages))
        .route("/users", get(admin::list_users))
        .route("/export/chat/{chat_id}", get(admin::export_chat))
        .route("/export/session/{session_id}", get(admin::export_session))
        .route("/stats", get(admin::stats))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// AI proxy routes
///
/// Only the token is verified; the user record is not loaded.
pub fn ai_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stream", post(ai::stream_handler))
        .route("/chat", post(ai::chat_handler))
        .route_layer(middleware::from_fn_with_state(state, token_middleware))
}

/// Nest every API group under its prefix
pub fn configure_api_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .nest("/api/auth", auth_routes())
        .nest("/api/chats", chat_routes(state.clone()))
        .nest("/api/messages", message_routes(state.clone()))
        .nest("/api/admin", admin_routes(state.clone()))
        .nest("/api/ai", ai_routes(state.clone()))
}
