use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog::CatalogError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            // "data unavailable" must stay distinguishable from "no data" (which is a 200).
            CatalogError::DatasetUnavailable { .. } => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "DATASET_UNAVAILABLE", e.to_string())
            }
            CatalogError::SchemaMismatch { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "SCHEMA_MISMATCH", e.to_string())
            }
            CatalogError::Query { .. } | CatalogError::InvalidRecord { .. } | CatalogError::Write { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "QUERY_FAILED", e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::SERVICE_UNAVAILABLE {
            warn!(code = self.code, "{}", self.message);
        } else if self.status.is_server_error() {
            error!(code = self.code, "{}", self.message);
        }

        let body = ApiErrorBody { code: self.code, message: self.message };
        (self.status, Json(body)).into_response()
    }
}
