use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn parse_record_id(raw: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(raw).map_err(|err| ServerError::BadRequest(format!("invalid record id: {err}")))
}

/// Fetch a single record by ID.
pub async fn get_record(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let id = parse_record_id(&id)?;
    match state.store.get(&id)? {
        Some(record) => Ok(Json(record)),
        None => Err(ServerError::NotFound),
    }
}

/// Delete a record by ID.
///
/// Cached search results are invalidated so the deleted record stops being
/// served from stale answers.
pub async fn delete_record(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let id = parse_record_id(&id)?;
    if state.store.get(&id)?.is_none() {
        return Err(ServerError::NotFound);
    }

    state.store.delete(&id)?;
    if let Some(cache) = &state.cache {
        cache.invalidate(&id.to_string());
    }

    tracing::info!(id = %id, "record deleted");

    Ok(Json(json!({
        "id": id,
        "status": "deleted",
    })))
}
