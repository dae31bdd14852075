use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, warn};

use crosslens_common::CrossLensError;

/// Pipeline error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CrossLensError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            CrossLensError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CrossLensError::Extraction(_) | CrossLensError::Service(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CrossLensError> for ApiError {
    fn from(err: CrossLensError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }
        (
            status,
            Json(serde_json::json!({ "detail": self.0.message() })),
        )
            .into_response()
    }
}
