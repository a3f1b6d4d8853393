//! Chat rooms and messages
//!
//! Rooms are keyed by a client-chosen room id; messages live in a per-room
//! collection and are returned oldest first.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{FixedOffset, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::AppState;
use crate::error::ServiceError;
use crate::models::{ChatRoom, Message};

const CHATS: &str = "chats";

/// Boarding facility's local timezone (UTC+7), used for message timestamps
/// shown to clients
const LOCAL_UTC_OFFSET_SECS: i32 = 7 * 3600;

fn messages_collection(room_id: &str) -> String {
    format!("{CHATS}/{room_id}/messages")
}

/// POST /chats/{roomId}
///
/// Creates the room if it does not exist; an existing room is echoed back
/// untouched, so clients can call this idempotently before chatting.
pub async fn create_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(mut room): Json<ChatRoom>,
) -> Result<Json<ChatRoom>, ServiceError> {
    info!("CreateChatRoom called for roomId: {room_id}");

    if let Some(existing) = state.store.get(CHATS, &room_id).await {
        info!("Chat room already exists: {room_id}");
        let mut room: ChatRoom =
            serde_json::from_value(existing).map_err(|e| ServiceError::Store(e.to_string()))?;
        room.id = room_id;
        return Ok(Json(room));
    }

    room.created_at = Some(Utc::now());
    let doc = serde_json::to_value(&room).map_err(|e| ServiceError::Store(e.to_string()))?;
    state.store.set(CHATS, &room_id, doc).await;
    room.id = room_id.clone();

    info!("Chat room created: {room_id}");
    Ok(Json(room))
}

/// POST /chats/{roomId}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(mut message): Json<Message>,
) -> Result<Json<Message>, ServiceError> {
    info!("SendMessage called for roomId: {room_id}");

    message.room_id = room_id.clone();
    message.timestamp = Some(Utc::now());

    let doc = serde_json::to_value(&message).map_err(|e| ServiceError::Store(e.to_string()))?;
    let id = state.store.add(&messages_collection(&room_id), doc).await;
    message.id = id;

    info!("Message sent with ID: {} in roomId: {room_id}", message.id);
    Ok(Json(message))
}

/// Message as shown to clients: timestamp rendered in local facility time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub content: String,
    pub sender_id: String,
    pub room_id: String,
    pub timestamp: String,
}

/// GET /chats/{roomId}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, ServiceError> {
    info!("GetMessages called for roomId: {room_id}");

    let offset = FixedOffset::east_opt(LOCAL_UTC_OFFSET_SECS)
        .ok_or(ServiceError::Unavailable("timezone"))?;
    let docs = state
        .store
        .list_ordered(&messages_collection(&room_id), "timestamp")
        .await;

    let mut decoded: Vec<(String, Message)> = Vec::with_capacity(docs.len());
    for (id, doc) in docs {
        match serde_json::from_value::<Message>(doc) {
            Ok(message) => decoded.push((id, message)),
            Err(e) => error!("Error decoding message {id}: {e}"),
        }
    }
    decoded.sort_by(|(a_id, a), (b_id, b)| a.timestamp.cmp(&b.timestamp).then_with(|| a_id.cmp(b_id)));

    let messages: Vec<MessageResponse> = decoded
        .into_iter()
        .map(|(id, message)| {
            let timestamp = message
                .timestamp
                .map(|t| t.with_timezone(&offset).to_rfc3339())
                .unwrap_or_default();
            MessageResponse {
                id,
                content: message.content,
                sender_id: message.sender_id,
                room_id: message.room_id,
                timestamp,
            }
        })
        .collect();

    info!("Fetched {} messages for roomId: {room_id}", messages.len());
    Ok(Json(messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{router, test_support};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_room() {
        let app = router(test_support::state());
        let response = app
            .oneshot(post("/chats/room-1", r#"{"userIds":["user-1","staff-1"]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let room = body_json(response).await;
        assert_eq!(room["id"], "room-1");
        assert_eq!(room["userIds"][0], "user-1");
        assert!(room["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_create_room_twice_does_not_overwrite() {
        let app = router(test_support::state());
        app.clone()
            .oneshot(post("/chats/room-1", r#"{"userIds":["user-1","staff-1"]}"#))
            .await
            .unwrap();

        // Second creation with different participants echoes the original
        let response = app
            .oneshot(post("/chats/room-1", r#"{"userIds":["intruder"]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let room = body_json(response).await;
        assert_eq!(room["userIds"][0], "user-1");
    }

    #[tokio::test]
    async fn test_send_and_fetch_messages_in_order() {
        let app = router(test_support::state());
        app.clone()
            .oneshot(post("/chats/room-1", r#"{"userIds":["user-1"]}"#))
            .await
            .unwrap();

        for content in ["first", "second", "third"] {
            let body = format!(r#"{{"senderId":"user-1","content":"{content}"}}"#);
            let response = app
                .clone()
                .oneshot(post("/chats/room-1/messages", &body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let sent = body_json(response).await;
            assert!(!sent["id"].as_str().unwrap().is_empty());
            assert_eq!(sent["roomId"], "room-1");
        }

        let request = Request::builder()
            .uri("/chats/room-1/messages")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let messages = body_json(response).await;
        let contents: Vec<&str> = messages
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        // Timestamps are rendered in facility-local time
        assert!(messages[0]["timestamp"].as_str().unwrap().ends_with("+07:00"));
    }

    #[tokio::test]
    async fn test_fetch_messages_empty_room() {
        let app = router(test_support::state());
        let request = Request::builder()
            .uri("/chats/empty/messages")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_messages_are_scoped_per_room() {
        let app = router(test_support::state());
        app.clone()
            .oneshot(post(
                "/chats/room-1/messages",
                r#"{"senderId":"user-1","content":"hello"}"#,
            ))
            .await
            .unwrap();

        let request = Request::builder()
            .uri("/chats/room-2/messages")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(body_json(response).await.as_array().unwrap().is_empty());
    }
}
