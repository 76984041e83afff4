//! Taxonomy-to-HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use toolgate_store::StoreError;
use toolgate_transcode::TranscodeError;
use toolgate_types::GatewayError;

/// Wrapper turning [`GatewayError`] into the `{"error": …}` JSON payload
/// every route uses.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        Self(error)
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self(GatewayError::from(error))
    }
}

impl From<TranscodeError> for ApiError {
    fn from(error: TranscodeError) -> Self {
        Self(GatewayError::bad_input(error.to_string()))
    }
}

/// Maps a store miss onto a resource-specific not-found message.
pub fn map_not_found(error: StoreError, message: &str) -> ApiError {
    match error {
        StoreError::NotFound => ApiError(GatewayError::not_found(message)),
        other => ApiError::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_carry_the_taxonomy_status() {
        let response = ApiError(GatewayError::not_found("x")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError(GatewayError::upstream_error(503, "x")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = ApiError(GatewayError::conflict("x")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_misses_get_resource_specific_messages() {
        let error = map_not_found(StoreError::NotFound, "HTTP interface not found");
        assert_eq!(error.0, GatewayError::not_found("HTTP interface not found"));
    }
}
