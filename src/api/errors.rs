use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use crate::errors::ReportError;

impl ReportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReportError::Validation(_) | ReportError::Incompatible(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReportError::Config(_) | ReportError::Json(_) | ReportError::Yaml(_) => StatusCode::BAD_REQUEST,
            ReportError::Busy(_) => StatusCode::CONFLICT,
            ReportError::NotFound(_) => StatusCode::NOT_FOUND,
            ReportError::Authentication(_) | ReportError::Permission(_) => StatusCode::FORBIDDEN,
            ReportError::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            ReportError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ReportError::Network(_)
            | ReportError::Backend(_)
            | ReportError::Stream(_)
            | ReportError::ConnectionLost(_) => StatusCode::BAD_GATEWAY,
            ReportError::Io(_) | ReportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let classification = self.classify();
        let message = match &self {
            ReportError::Validation(m) | ReportError::Incompatible(m) | ReportError::Busy(m) => m.clone(),
            other => other.user_message(),
        };
        (
            status,
            Json(json!({
                "error": message,
                "type": classification.error_type,
                "retryable": classification.retryable,
            })),
        )
            .into_response()
    }
}
