use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Handler failures, rendered as a status code with a plain-text reason.
#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
    #[error("missing or unknown session")]
    Unauthorized,

    #[error("invalid login or password")]
    BadCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiFailure::Unauthorized | ApiFailure::BadCredentials => StatusCode::UNAUTHORIZED,
            ApiFailure::NotFound(_) => StatusCode::NOT_FOUND,
            ApiFailure::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
