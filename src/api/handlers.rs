use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use super::{error::ApiError, AppState};
use crate::models::{
    Acknowledgement, Location, LocationCreate, LocationPatch, PinVerification, UploadReceipt,
};

/// Name of the multipart field carrying the upload
const FILE_FIELD: &str = "file";

const SERVICE_MESSAGE: &str = "Hospital AR Navigation API";

/// `GET /` and `GET /<prefix>/`
pub async fn root() -> Json<Value> {
    Json(json!({ "message": SERVICE_MESSAGE }))
}

/// `POST /<prefix>/admin/verify-pin`
pub async fn verify_pin(
    State(state): State<AppState>,
    payload: Result<Json<PinVerification>, JsonRejection>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let Json(payload) = payload?;
    state.admin.verify_pin(&payload.pin).await?;
    Ok(Json(Acknowledgement::ok("PIN verified")))
}

/// `GET /<prefix>/locations`
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(state.locations.list().await?))
}

/// `GET /<prefix>/locations/{id}`
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Location>, ApiError> {
    Ok(Json(state.locations.get(&id).await?))
}

/// `POST /<prefix>/locations`
pub async fn create_location(
    State(state): State<AppState>,
    payload: Result<Json<LocationCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let Json(payload) = payload?;
    let location = state.locations.create(payload).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// `PUT /<prefix>/locations/{id}`
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<LocationPatch>, JsonRejection>,
) -> Result<Json<Location>, ApiError> {
    let Json(patch) = payload?;
    Ok(Json(state.locations.update(&id, patch).await?))
}

/// `DELETE /<prefix>/locations/{id}`
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Acknowledgement>, ApiError> {
    state.locations.delete(&id).await?;
    Ok(Json(Acknowledgement::ok("Location deleted")))
}

/// `POST /<prefix>/upload`, multipart with a `file` field
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let original_name = field.file_name().map(str::to_owned);
        let content = field.bytes().await?;
        let receipt = state
            .uploads
            .store(original_name.as_deref(), &content)
            .await?;
        return Ok(Json(receipt));
    }

    Err(ApiError::MissingFile)
}

/// `GET /<prefix>/uploads/{filename}`
pub async fn get_upload(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stored = state.uploads.retrieve(&file_name).await?;
    Ok(([(header::CONTENT_TYPE, stored.content_type)], stored.content))
}
