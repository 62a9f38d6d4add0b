use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::ErrorResponse;
use thiserror::Error;

/// Failure outcomes surfaced by the API.
///
/// `NotFound` deliberately covers both "does not exist" and "not owned by the
/// caller" so that account ids cannot be probed by other users.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("cannot transfer to the same account")]
    SameAccount,
    #[error("insufficient funds in this account")]
    InsufficientFunds,
    #[error("not found")]
    NotFound,
    #[error("username already exists")]
    AlreadyExists,
    #[error("incorrect username or password")]
    Unauthorized,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidAmount | Self::SameAccount | Self::InsufficientFunds => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!("internal error: {e:?}");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(ErrorResponse { error: message });

        match self {
            // Basic-auth challenge, so browsers and curl can prompt
            Self::Unauthorized => {
                (status, [(header::WWW_AUTHENTICATE, "Basic")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
