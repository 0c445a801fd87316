//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use habit_coach_shared::validation::ValidationError as FieldError;
use habit_coach_shared::{DomainError, ErrorDetail, ErrorResponse};
use thiserror::Error;
use tracing::error;

use crate::storage::StoreError;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid entry kind: {0}")]
    InvalidEntryKind(String),

    #[error("Profile incomplete: {0}")]
    ProfileIncomplete(String),

    #[error("Profile required")]
    ProfileRequired,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Storage error")]
    Storage(#[from] StoreError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidEntryKind(msg) => ApiError::InvalidEntryKind(msg),
            DomainError::MissingProfileField(label) => ApiError::ProfileIncomplete(label),
            DomainError::Validation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        ApiError::InvalidField {
            message: err.user_message(),
            field: err.field,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the alphabetically first failing field so responses are stable
        let first = errors
            .field_errors()
            .into_iter()
            .min_by(|a, b| a.0.cmp(&b.0))
            .and_then(|(field, errs)| errs.first().map(|e| (field.to_string(), e.clone())));

        match first {
            Some((field, err)) => ApiError::InvalidField {
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string()),
                field,
            },
            None => ApiError::Validation(errors.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, code, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::InvalidField {
                field: name,
                message,
            } => {
                field = Some(name);
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            ApiError::InvalidEntryKind(msg) => (StatusCode::BAD_REQUEST, "INVALID_ENTRY_KIND", msg),
            ApiError::ProfileIncomplete(label) => {
                let message = format!("Complete your profile: {label} is missing");
                field = Some(label);
                (StatusCode::UNPROCESSABLE_ENTITY, "PROFILE_INCOMPLETE", message)
            }
            ApiError::ProfileRequired => (
                StatusCode::CONFLICT,
                "PROFILE_REQUIRED",
                "Set up your profile first".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Storage(err) => {
                error!("Storage error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Could not save your data".to_string(),
                )
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
                details: None,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_coach_shared::SaveProfileRequest;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error_status() {
        let error = ApiError::Validation("Invalid input".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_status() {
        let error = ApiError::NotFound("Entry not found".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let kind: ApiError = DomainError::invalid_kind("weight entries require weight_kg").into();
        assert_eq!(kind.into_response().status(), StatusCode::BAD_REQUEST);

        let missing: ApiError = DomainError::missing_field("Age").into();
        assert_eq!(missing.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(
            ApiError::ProfileRequired.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_profile_incomplete_body() {
        let response = ApiError::ProfileIncomplete("Age".to_string()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "PROFILE_INCOMPLETE");
        assert_eq!(body["error"]["field"], "Age");
    }

    #[tokio::test]
    async fn test_validator_errors_name_field() {
        let req: SaveProfileRequest =
            serde_json::from_str(r#"{"display_name":"Kenta","height_cm":12}"#).unwrap();
        let error: ApiError = req.validate().unwrap_err().into();
        let body = body_json(error.into_response()).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "height_cm");
        assert_eq!(body["error"]["message"], "Height must be between 50 and 300 cm");
    }
}
