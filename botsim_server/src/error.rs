use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use botsim_conversation::HistoryError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl From<HistoryError> for ApiError {
    fn from(err: HistoryError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
