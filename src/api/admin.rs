//! Admin endpoints

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::error::ServiceError;

/// GET /admin/logs
///
/// Lists the log files available on disk, newest first, with
/// human-readable sizes. Fails with 503 if the rotation service was never
/// constructed and 500 if the directory scan fails; a partial listing is
/// never returned.
pub async fn get_log_files(
    State(state): State<AppState>,
) -> Result<Json<Value>, ServiceError> {
    info!("GetLogFiles called");

    let Some(service) = state.log_service.as_ref() else {
        return Err(ServiceError::Unavailable("log rotation service"));
    };
    let files = service.log_files().map_err(ServiceError::ReadError)?;

    info!("Retrieved {} log files", files.len());
    Ok(Json(json!({
        "count": files.len(),
        "files": files,
    })))
}
