// ABOUTME: HTTP error mapping for the problems API
// ABOUTME: Turns store and validation failures into status codes with a {"detail"} body

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Problem not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Store failure; the cause is logged, never returned to the client.
    #[error("internal server error")]
    Internal(#[source] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateRowId(row_id) => ApiError::Conflict(format!(
                "A problem with spreadsheet_row_id {} already exists",
                row_id
            )),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            // Log with :? to show the driver error behind the store error
            tracing::error!("Store error while handling request: {:?}", err);
        }
        let body = Json(json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}
