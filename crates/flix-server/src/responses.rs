//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flix_core::{ErrorResponse, FlixError};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful response.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Creates an error response.
    pub fn error(error: ErrorResponse) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Application error type for Axum.
#[derive(Debug)]
pub struct AppError(pub FlixError);

impl From<FlixError> for AppError {
    fn from(err: FlixError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let error_response = ErrorResponse::from_error(&self.0);
        let body = Json(ApiResponse::<()>::error(error_response));

        (status, body).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Helper to create a success response.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Helper to create a created (201) response.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Maps a missing lookup result to a 404 for the given resource.
pub fn found<T>(value: Option<T>, resource_type: &'static str, id: impl ToString) -> Result<T, AppError> {
    value.ok_or_else(|| AppError(FlixError::not_found(resource_type, id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status() {
        let response = AppError(FlixError::conflict("taken")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = AppError(FlixError::MappingNotRegistered).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_found_maps_none_to_not_found() {
        assert_eq!(found(Some(3), "movie", "m1").unwrap(), 3);

        let err = found::<u8>(None, "movie", "m404").unwrap_err();
        assert!(matches!(err.0, FlixError::NotFound { resource_type: "movie", .. }));
    }

    #[test]
    fn test_success_envelope_serializes_without_error() {
        let json = serde_json::to_value(ApiResponse::success("hi")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "hi");
        assert!(json.get("error").is_none());
    }
}
