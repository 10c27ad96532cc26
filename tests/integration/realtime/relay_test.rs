//! Socket relay integration tests
//!
//! Drives `SocketSession`s on the application's own room registry and
//! repository, then checks the results through the HTTP API.

use std::time::Duration;

use askveda::backend::realtime::SocketSession;
use askveda::shared::ServerEvent;
use axum::http::StatusCode;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::assert_status;
use crate::common::{create_chat, register_unique_user, TestApp};

struct Client {
    session: SocketSession,
    inbox: mpsc::Receiver<ServerEvent>,
}

impl Client {
    fn connect(app: &TestApp) -> Self {
        let (tx, inbox) = mpsc::channel(16);
        Self {
            session: SocketSession::new(app.state.rooms.clone(), app.state.repository.clone(), tx),
            inbox,
        }
    }

    async fn send(&mut self, frame: serde_json::Value) {
        self.session.handle_text(&frame.to_string()).await;
    }

    async fn next(&mut self) -> Option<serde_json::Value> {
        timeout(Duration::from_millis(200), self.inbox.recv())
            .await
            .ok()
            .flatten()
            .map(|event| serde_json::to_value(event).expect("event serializes"))
    }
}

#[tokio::test]
async fn test_socket_message_lands_in_chat_history() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &user, "live").await;

    let mut sender = Client::connect(&app);
    let mut watcher = Client::connect(&app);
    for client in [&mut sender, &mut watcher] {
        client.send(json!({ "event": "join-chat", "data": chat_id })).await;
    }

    sender
        .send(json!({
            "event": "message",
            "data": { "chatId": chat_id, "content": "from the socket", "role": "assistant" }
        }))
        .await;

    let relayed = watcher.next().await.expect("watcher receives the message");
    assert_eq!(relayed["event"], "message");
    assert_eq!(relayed["data"]["content"], "from the socket");
    assert_eq!(relayed["data"]["chatId"], chat_id.as_str());
    assert!(sender.next().await.is_none());

    let history = app
        .get(&format!("/api/messages/chat/{}", chat_id), Some(&user.token))
        .await;
    assert_status!(history, StatusCode::OK);
    let body = history.json();
    assert_eq!(body["messages"][0]["content"], "from the socket");
    assert_eq!(body["messages"][0]["role"], "assistant");
    assert!(body["messages"][0]["sender"].is_null());
}

#[tokio::test]
async fn test_typing_indicators_reach_room_members() {
    let app = TestApp::new().await;

    let mut typist = Client::connect(&app);
    let mut reader = Client::connect(&app);
    let mut outsider = Client::connect(&app);
    typist.send(json!({ "event": "join-chat", "data": "room-1" })).await;
    reader.send(json!({ "event": "join-chat", "data": "room-1" })).await;
    outsider.send(json!({ "event": "join-chat", "data": "room-2" })).await;

    let payload = json!({ "chatId": "room-1", "user": "asha" });
    typist.send(json!({ "event": "typing", "data": payload })).await;
    typist.send(json!({ "event": "stop-typing", "data": payload })).await;

    assert_eq!(
        reader.next().await,
        Some(json!({ "event": "typing", "data": payload }))
    );
    assert_eq!(
        reader.next().await,
        Some(json!({ "event": "stop-typing", "data": payload }))
    );
    assert!(outsider.next().await.is_none());
}

#[tokio::test]
async fn test_closed_connections_are_swept() {
    let app = TestApp::new().await;

    {
        let mut client = Client::connect(&app);
        client.send(json!({ "event": "join-chat", "data": "ephemeral" })).await;
        assert_eq!(app.state.rooms.subscriber_count("ephemeral"), 1);
    }

    // Forwarders are aborted on drop; give the runtime a moment to release them
    tokio::time::sleep(Duration::from_millis(50)).await;
    app.state.rooms.cleanup_inactive_channels();
    assert_eq!(app.state.rooms.room_count(), 0);
}
