//! User registration and login

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::AppState;
use crate::auth::AuthedUser;
use crate::error::ServiceError;
use crate::models::User;

const USERS: &str = "users";

/// POST /register
///
/// Upserts the account document for the given user id, stamping
/// `createdAt` server-side. Registration is field-merging, so repeating it
/// does not wipe fields a previous registration set.
pub async fn register(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<Value>, ServiceError> {
    info!("Registering user: {}", user.id);
    if user.id.is_empty() {
        return Err(ServiceError::InvalidBody("user id is required".into()));
    }

    let fields = json!({
        "name": user.name,
        "email": user.email,
        "phone": user.phone,
        "role": user.role,
        "createdAt": Utc::now(),
    });
    let fields = fields
        .as_object()
        .cloned()
        .unwrap_or_default();
    state
        .store
        .merge(USERS, &user.id, fields)
        .await
        .map_err(|e| ServiceError::Store(e.to_string()))?;

    info!("User registered: {}", user.id);
    Ok(Json(json!({"status": "ok"})))
}

/// POST /login (authenticated)
///
/// Returns the stored profile for the verified caller.
pub async fn login(
    State(state): State<AppState>,
    Extension(AuthedUser { uid }): Extension<AuthedUser>,
) -> Result<Json<Value>, ServiceError> {
    info!("UserLogin called for uid: {uid}");

    let Some(doc) = state.store.get(USERS, &uid).await else {
        warn!("Login for unknown user: {uid}");
        return Err(ServiceError::NotFound("user"));
    };

    let field = |name: &str| doc.get(name).and_then(Value::as_str).unwrap_or_default().to_string();
    Ok(Json(json!({
        "status": "authenticated",
        "uid": uid,
        "name": field("name"),
        "email": field("email"),
        "phone": field("phone"),
        "role": field("role"),
    })))
}
