//! HTTP API
//!
//! Route assembly and shared application state. Handlers live in the
//! per-resource submodules; every route gets the request-logging layer, and
//! `/login` additionally goes through the bearer-token middleware.

pub mod admin;
pub mod chat;
pub mod pets;
pub mod users;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tracing::info;

use crate::auth::{self, TokenVerifier};
use crate::logging::RotationScheduler;
use crate::store::DocumentStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Absent when the rotation service was never constructed; the admin
    /// log listing reports 503 in that case
    pub log_service: Option<Arc<RotationScheduler>>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let authed = Router::new()
        .route("/login", post(users::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/register", post(users::register))
        .merge(authed)
        .route("/pets", post(pets::create_pet))
        .route("/pets/:id", get(pets::get_pet))
        .route("/pets/:pet_id/activate", patch(pets::activate_pet))
        .route("/pets/:pet_id/delete", delete(pets::delete_pet))
        .route(
            "/pets/:pet_id/updates",
            post(pets::create_pet_update).get(pets::get_pet_updates),
        )
        .route("/chats/:room_id", post(chat::create_room))
        .route(
            "/chats/:room_id/messages",
            post(chat::send_message).get(chat::get_messages),
        )
        .route("/admin/logs", get(admin::get_log_files))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Log every request with its status and duration
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        "HTTP {method} {path} - Status: {} - Duration: {:?}",
        response.status(),
        start.elapsed()
    );
    response
}
