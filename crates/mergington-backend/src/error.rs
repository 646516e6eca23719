use axum::{
    Json,
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use mergington::data::ErrorResponse;
use mergington::errors::{ErrorKind, RosterError};

/// Errors returned by HTTP handlers. Every variant renders as a JSON
/// `{ "detail": ... }` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("Missing required query parameter: {0}")]
    MissingQuery(&'static str),
    #[error("{}", .0.body_text())]
    Path(#[from] PathRejection),
    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Roster(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            },
            Self::MissingQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Path(rejection) => rejection.status(),
            Self::Query(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
