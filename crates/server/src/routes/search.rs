use crate::error::ServerResult;
use crate::routes::decode_image_payload;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use engine::{Matcher, MatchQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use store::{ImageKind, Record};

/// Search request
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Base64-encoded query image (bare or data URL)
    pub image: String,

    /// Which fingerprint to search: `"face"` or `"thumb"`
    #[serde(default = "default_kind")]
    pub kind: ImageKind,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub matched: bool,
    /// The matched record; omitted when no candidate cleared the threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,
    /// Hamming distance to the closest candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    pub elapsed_ms: u128,
}

fn default_kind() -> ImageKind {
    ImageKind::Face
}

/// Search enrolled records for the closest fingerprint match.
///
/// The query image is fingerprinted and compared against stored records of
/// the requested kind. The response reports whether the closest candidate
/// cleared the engine's distance threshold; the full record is included only
/// on a match.
pub async fn search_records(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SearchRequest>,
) -> ServerResult<impl IntoResponse> {
    let start = Instant::now();

    let image = decode_image_payload("image", &request.image)?;
    let query = MatchQuery::new(image, request.kind);
    let outcome = state.engine.search(&query)?;

    Ok(Json(SearchResponse {
        matched: outcome.matched,
        record: if outcome.matched { outcome.record } else { None },
        distance: outcome.distance,
        elapsed_ms: start.elapsed().as_millis(),
    }))
}
