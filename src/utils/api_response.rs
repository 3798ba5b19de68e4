use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::store::StoreError;
use crate::lifecycle::LifecycleError;

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response
    pub fn success(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            status_code: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            data: Some(data),
            errors: None,
        }
    }

    /// Create an error response
    pub fn error(
        status: StatusCode,
        message: impl Into<String>,
        errors: Option<serde_json::Value>,
    ) -> Self {
        ApiResponse {
            success: false,
            status_code: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            data: None,
            errors,
        }
    }
}

impl From<StoreError> for ApiResponse<()> {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound { .. } => ApiResponse::error(StatusCode::NOT_FOUND, err.to_string(), None),
            StoreError::Conflict(_) | StoreError::NotPending { .. } => {
                ApiResponse::error(StatusCode::CONFLICT, err.to_string(), None)
            }
            StoreError::Database(e) => {
                tracing::error!("database operation failed: {e}");
                ApiResponse::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed",
                    Some(json!({ "error": e.to_string() })),
                )
            }
        }
    }
}

impl From<LifecycleError> for ApiResponse<()> {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Validation(_) => {
                ApiResponse::error(StatusCode::BAD_REQUEST, err.to_string(), None)
            }
            LifecycleError::NotFound { .. } => {
                ApiResponse::error(StatusCode::NOT_FOUND, err.to_string(), None)
            }
            LifecycleError::InvalidTransition { from, to, .. } => ApiResponse::error(
                StatusCode::CONFLICT,
                err.to_string(),
                Some(json!({ "current_status": from, "requested_status": to })),
            ),
            LifecycleError::DataAccess(inner) => inner.into(),
        }
    }
}
