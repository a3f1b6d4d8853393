//! Pet CRUD and status updates

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info};

use super::AppState;
use crate::error::ServiceError;
use crate::models::{Pet, PetUpdate};

const PETS: &str = "pets";
const PET_UPDATES: &str = "pet_updates";

fn to_fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

/// POST /pets
pub async fn create_pet(
    State(state): State<AppState>,
    Json(mut pet): Json<Pet>,
) -> Result<Json<Pet>, ServiceError> {
    info!("Creating pet: {}", pet.pet_id);
    if pet.pet_id.is_empty() {
        return Err(ServiceError::InvalidBody("petId is required".into()));
    }
    pet.created_at = Some(Utc::now());

    let doc = serde_json::to_value(&pet).map_err(|e| ServiceError::Store(e.to_string()))?;
    state.store.set(PETS, &pet.pet_id, doc).await;

    info!("Pet saved with ID: {}", pet.pet_id);
    Ok(Json(pet))
}

/// GET /pets/{id}
pub async fn get_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
) -> Result<Json<Pet>, ServiceError> {
    info!("Fetching pet with ID: {pet_id}");

    let Some(doc) = state.store.get(PETS, &pet_id).await else {
        return Err(ServiceError::NotFound("pet"));
    };
    let mut pet: Pet =
        serde_json::from_value(doc).map_err(|e| ServiceError::Store(e.to_string()))?;
    pet.pet_id = pet_id;
    Ok(Json(pet))
}

/// Body for PATCH /pets/{petId}/activate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatePetRequest {
    pub check_in: String,
    pub check_out: String,
}

/// PATCH /pets/{petId}/activate
///
/// Marks the pet as actively boarded for the given stay window. Timestamps
/// must be RFC 3339.
pub async fn activate_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
    Json(request): Json<ActivatePetRequest>,
) -> Result<StatusCode, ServiceError> {
    info!("ActivatePet called for petId: {pet_id}");

    let check_in: DateTime<Utc> = DateTime::parse_from_rfc3339(&request.check_in)?.into();
    let check_out: DateTime<Utc> = DateTime::parse_from_rfc3339(&request.check_out)?.into();

    state
        .store
        .update(
            PETS,
            &pet_id,
            to_fields(json!({
                "active": true,
                "checkIn": check_in,
                "checkOut": check_out,
            })),
        )
        .await
        .map_err(|_| ServiceError::NotFound("pet"))?;

    info!("Successfully activated pet: {pet_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /pets/{petId}/delete
pub async fn delete_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
) -> StatusCode {
    info!("DeletePet called for petId: {pet_id}");
    state.store.delete(PETS, &pet_id).await;
    info!("Successfully deleted pet: {pet_id}");
    StatusCode::NO_CONTENT
}

/// POST /pets/{petId}/updates
///
/// Records a status update and then mirrors its caption into the pet's
/// `status` field. The two writes are independent; a failed status mirror
/// is logged but never fails the request.
pub async fn create_pet_update(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
    Json(mut update): Json<PetUpdate>,
) -> Result<StatusCode, ServiceError> {
    info!("CreatePetUpdate called for petId: {pet_id}");

    update.pet_id = pet_id.clone();
    update.timestamp = Some(Utc::now());
    let status = update.caption.clone();

    let doc = serde_json::to_value(&update).map_err(|e| ServiceError::Store(e.to_string()))?;
    state.store.add(PET_UPDATES, doc).await;

    if let Err(e) = state
        .store
        .update(PETS, &pet_id, to_fields(json!({"status": status})))
        .await
    {
        error!("Failed to update pet status: {e}");
    }

    info!("Pet update added for petId: {pet_id}");
    Ok(StatusCode::CREATED)
}

/// GET /pets/{petId}/updates
pub async fn get_pet_updates(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
) -> Result<Json<Vec<PetUpdate>>, ServiceError> {
    info!("GetPetUpdates called for petId: {pet_id}");

    let docs = state
        .store
        .query_eq(PET_UPDATES, "petId", &json!(pet_id))
        .await;

    let mut updates = Vec::with_capacity(docs.len());
    for (id, doc) in docs {
        match serde_json::from_value::<PetUpdate>(doc) {
            Ok(mut update) => {
                update.id = id;
                updates.push(update);
            }
            // A malformed document is skipped, not fatal to the listing
            Err(e) => error!("Error decoding pet update {id}: {e}"),
        }
    }

    info!("Fetched {} updates for petId: {pet_id}", updates.len());
    Ok(Json(updates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{router, test_support};
    use axum::body::Body;
    use axum::http::Request;
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
    async fn test_create_and_get_pet() {
        let app = router(test_support::state());

        let response = app
            .clone()
            .oneshot(post(
                "/pets",
                r#"{"petId":"pet-1","name":"Biscuit","type":"dog","ownerId":"user-1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["petId"], "pet-1");
        assert!(created["createdAt"].is_string());

        let request = Request::builder()
            .uri("/pets/pet-1")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["name"], "Biscuit");
        assert_eq!(fetched["type"], "dog");
    }

    #[tokio::test]
    async fn test_get_missing_pet_is_404() {
        let app = router(test_support::state());
        let request = Request::builder()
            .uri("/pets/ghost")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_pet_without_id_is_rejected() {
        let app = router(test_support::state());
        let response = app
            .oneshot(post("/pets", r#"{"petId":"","name":"NoId"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_activate_pet() {
        let state = test_support::state();
        let app = router(state.clone());
        app.clone()
            .oneshot(post("/pets", r#"{"petId":"pet-1","name":"Biscuit"}"#))
            .await
            .unwrap();

        let request = Request::builder()
            .method("PATCH")
            .uri("/pets/pet-1/activate")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"checkIn":"2026-08-30T09:00:00Z","checkOut":"2026-09-02T17:00:00Z"}"#,
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let doc = state.store.get("pets", "pet-1").await.unwrap();
        assert_eq!(doc["active"], true);
        assert!(doc["checkIn"].is_string());
    }

    #[tokio::test]
    async fn test_activate_with_bad_timestamp_is_400() {
        let app = router(test_support::state());
        app.clone()
            .oneshot(post("/pets", r#"{"petId":"pet-1","name":"Biscuit"}"#))
            .await
            .unwrap();

        let request = Request::builder()
            .method("PATCH")
            .uri("/pets/pet-1/activate")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"checkIn":"tomorrow","checkOut":"later"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_activate_missing_pet_is_404() {
        let app = router(test_support::state());
        let request = Request::builder()
            .method("PATCH")
            .uri("/pets/ghost/activate")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"checkIn":"2026-08-30T09:00:00Z","checkOut":"2026-09-02T17:00:00Z"}"#,
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_pet() {
        let state = test_support::state();
        let app = router(state.clone());
        app.clone()
            .oneshot(post("/pets", r#"{"petId":"pet-1","name":"Biscuit"}"#))
            .await
            .unwrap();

        let request = Request::builder()
            .method("DELETE")
            .uri("/pets/pet-1/delete")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.store.get("pets", "pet-1").await.is_none());
    }

    #[tokio::test]
    async fn test_pet_update_mirrors_status() {
        let state = test_support::state();
        let app = router(state.clone());
        app.clone()
            .oneshot(post("/pets", r#"{"petId":"pet-1","name":"Biscuit"}"#))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post(
                "/pets/pet-1/updates",
                r#"{"caption":"Out for a walk","description":"Morning stroll"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // Caption mirrored into the pet document
        let doc = state.store.get("pets", "pet-1").await.unwrap();
        assert_eq!(doc["status"], "Out for a walk");

        let request = Request::builder()
            .uri("/pets/pet-1/updates")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let updates = body_json(response).await;
        assert_eq!(updates.as_array().unwrap().len(), 1);
        assert_eq!(updates[0]["caption"], "Out for a walk");
        assert_eq!(updates[0]["petId"], "pet-1");
        assert!(updates[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_pet_update_for_unknown_pet_still_records() {
        // The status mirror fails quietly; the update itself is stored
        let state = test_support::state();
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(post("/pets/ghost/updates", r#"{"caption":"Fed"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let request = Request::builder()
            .uri("/pets/ghost/updates")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let updates = body_json(response).await;
        assert_eq!(updates.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_updates_for_pet_with_none() {
        let app = router(test_support::state());
        let request = Request::builder()
            .uri("/pets/pet-1/updates")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await.as_array().unwrap().is_empty());
    }
}
