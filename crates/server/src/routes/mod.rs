//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the biomatch
//! server. Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, and metrics
//! - `enroll`: Record enrollment
//! - `search`: Fingerprint similarity search
//! - `records`: Record retrieval and deletion

pub mod enroll;
pub mod health;
pub mod records;
pub mod search;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /).
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Biomatch Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/enroll",
            "/api/v1/search",
            "/api/v1/records/{id}",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

/// Decode a base64 image payload.
///
/// Accepts both bare base64 and `data:<mime>;base64,<payload>` URLs, which
/// is what browsers produce from canvas captures.
pub(crate) fn decode_image_payload(field: &str, payload: &str) -> Result<Vec<u8>, ServerError> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    BASE64
        .decode(encoded.trim())
        .map_err(|err| ServerError::BadRequest(format!("{field} is not valid base64: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_base64_decodes() {
        let decoded = decode_image_payload("image", &BASE64.encode(b"pixels")).unwrap();
        assert_eq!(decoded, b"pixels");
    }

    #[test]
    fn data_urls_are_stripped() {
        let payload = format!("data:image/png;base64,{}", BASE64.encode(b"pixels"));
        let decoded = decode_image_payload("image", &payload).unwrap();
        assert_eq!(decoded, b"pixels");
    }

    #[test]
    fn invalid_base64_is_a_bad_request() {
        let err = decode_image_payload("face_image", "not base64!!").unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
        assert!(err.to_string().contains("face_image"));
    }
}
