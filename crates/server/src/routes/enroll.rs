use crate::error::{ServerError, ServerResult};
use crate::routes::decode_image_payload;
use crate::state::ServerState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Enrollment request
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    /// Arbitrary profile payload stored alongside the fingerprints
    #[serde(default)]
    pub profile: serde_json::Value,

    /// Base64-encoded face image (bare or data URL)
    #[serde(default)]
    pub face_image: Option<String>,

    /// Base64-encoded thumbprint image (bare or data URL)
    #[serde(default)]
    pub thumb_image: Option<String>,
}

/// Enrollment response
#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub face_bucket: Option<u32>,
    pub thumb_bucket: Option<u32>,
}

/// Enroll a new record.
///
/// Decodes the submitted images, fingerprints them, and persists the record.
/// At least one of `face_image` or `thumb_image` must be present. Cached
/// search results are invalidated so the new record is immediately findable.
pub async fn enroll_record(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<EnrollRequest>,
) -> ServerResult<impl IntoResponse> {
    if request.face_image.is_none() && request.thumb_image.is_none() {
        return Err(ServerError::BadRequest(
            "at least one of face_image or thumb_image is required".to_string(),
        ));
    }

    let face = request
        .face_image
        .as_deref()
        .map(|payload| decode_image_payload("face_image", payload))
        .transpose()?;
    let thumb = request
        .thumb_image
        .as_deref()
        .map(|payload| decode_image_payload("thumb_image", payload))
        .transpose()?;

    let record = biomatch::enroll_and_store(
        &state.store,
        request.profile,
        face.as_deref(),
        thumb.as_deref(),
    )?;

    // The new record may win searches that currently have cached answers
    if let Some(cache) = &state.cache {
        cache.invalidate(&record.id.to_string());
    }

    tracing::info!(id = %record.id, "record enrolled");

    Ok((
        StatusCode::CREATED,
        Json(EnrollResponse {
            id: record.id,
            enrolled_at: record.enrolled_at,
            face_bucket: record.face_bucket,
            thumb_bucket: record.thumb_bucket,
        }),
    ))
}
