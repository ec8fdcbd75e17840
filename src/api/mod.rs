//! REST API module.
//!
//! Contains all API routes and handlers. Every handler answers with the
//! `{ success, data }` envelope or an [`AppError`].

mod applications;
mod candidates;
mod clusters;
mod jobs;
mod saved_searches;
mod users;

pub use applications::*;
pub use candidates::*;
pub use clusters::*;
pub use jobs::*;
pub use saved_searches::*;
pub use users::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::geo::is_valid_coordinate;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Trimmed, non-empty text or a validation error naming the field.
fn required(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Coordinates must come as a valid pair or not at all.
fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), AppError> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) if is_valid_coordinate(lat, lon) => Ok(()),
        (Some(_), Some(_)) => Err(AppError::Validation(
            "Latitude must be within [-90, 90] and longitude within [-180, 180]".to_string(),
        )),
        _ => Err(AppError::Validation(
            "Latitude and longitude must be given together".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(33.7), Some(-84.3)).is_ok());
        assert!(validate_coordinates(Some(33.7), None).is_err());
        assert!(validate_coordinates(Some(95.0), Some(0.0)).is_err());
    }

    #[test]
    fn test_required() {
        assert!(required("x", "Title").is_ok());
        let err = required("   ", "Title").unwrap_err();
        assert_eq!(err.message(), "Title is required");
    }
}
