use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::validation::ValidationFailure;

pub const NO_ITEMS_MESSAGE: &str = "No items were provided for creation";
pub const NO_FIELDS_MESSAGE: &str = "No fields to update";
pub const INSERT_VALIDATION_MESSAGE: &str = "Validation failed";
pub const UPDATE_VALIDATION_MESSAGE: &str = "Invalid item data for update";

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Body of every 4xx response that carries one.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error description
    #[schema(example = "No fields to update")]
    pub message: String,
    /// Per-record or per-field validation issues
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationFailure),

    #[error("No items were provided for creation")]
    EmptyBatch,

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("{0}")]
    MalformedPath(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_)
            | Self::EmptyBatch
            | Self::NoFieldsToUpdate
            | Self::MalformedPath(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DatabaseError(_) | Self::MalformedBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors describe what was wrong; not-found and internal errors carry no body.
    pub fn response_body(&self) -> Option<ErrorResponse> {
        let (message, details) = match self {
            Self::ValidationError(ValidationFailure::Batch(errors)) => (
                INSERT_VALIDATION_MESSAGE.to_string(),
                serde_json::to_value(errors).ok(),
            ),
            Self::ValidationError(ValidationFailure::Update(issues)) => (
                UPDATE_VALIDATION_MESSAGE.to_string(),
                serde_json::to_value(issues).ok(),
            ),
            Self::EmptyBatch | Self::NoFieldsToUpdate | Self::MalformedPath(_) => {
                (self.to_string(), None)
            }
            Self::NotFound(_) | Self::DatabaseError(_) | Self::MalformedBody(_) => return None,
        };
        Some(ErrorResponse { message, details })
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = current_request_id();

        if status.is_server_error() {
            error!(request_id = ?request_id, error = %self, "Request failed unexpectedly");
        } else if status == StatusCode::BAD_REQUEST {
            warn!(request_id = ?request_id, error = %self, "Request rejected");
        }

        match self.response_body() {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

pub type AppError = ServiceError;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Issues, RecordError};
    use axum::body::to_bytes;
    use serde_json::json;

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::EmptyBatch.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NoFieldsToUpdate.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::MalformedPath("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::DatabaseError(sea_orm::DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let parse_err = serde_json::from_str::<Value>("{").unwrap_err();
        assert_eq!(
            ServiceError::MalformedBody(parse_err).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_errors_have_empty_body() {
        let response =
            ServiceError::DatabaseError(sea_orm::DbErr::Custom("secret dsn".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn not_found_has_empty_body() {
        let response = ServiceError::NotFound("S1/A".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn no_fields_message_is_exact() {
        let response = ServiceError::NoFieldsToUpdate.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({"message": "No fields to update"}));
    }

    #[tokio::test]
    async fn batch_validation_body_lists_inputs_and_issues() {
        let mut issues = Issues::new();
        issues.field("sku", "SKU must not be empty");
        let failure = ValidationFailure::Batch(vec![RecordError {
            input: json!({"sku": "", "store": "S", "quantity": 1}),
            issues,
        }]);

        let response = ServiceError::from(failure).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["details"][0]["input"]["store"], "S");
        assert_eq!(
            body["details"][0]["issues"]["fieldErrors"]["sku"][0],
            "SKU must not be empty"
        );
    }
}
