use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::OmrError;
use crate::model::GradeReport;

/// JSON error response: `{ "error": "...", ... }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl std::fmt::Display) -> Self {
        Self {
            status,
            body: json!({ "error": message.to_string() }),
        }
    }

    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Every student sheet was skipped.
    pub fn no_results(report: &GradeReport) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({
                "error": "No valid student results. Check uploads or OMR detection.",
                "skipped": report.skipped,
                "debug": report.debug,
            }),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<OmrError> for ApiError {
    fn from(err: OmrError) -> Self {
        let status = match &err {
            OmrError::MissingKey | OmrError::NoStudentSheets | OmrError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            OmrError::Decode { .. } | OmrError::EmptyKey => StatusCode::UNPROCESSABLE_ENTITY,
            OmrError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
