//! Error taxonomy for the auth core and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("token claim mismatch: {0}")]
    ClaimMismatch(&'static str),
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("identity creation failed: {0}")]
    Creation(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("store error")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// HTTP status for the coarse failure category.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::ExpiredToken
            | Self::ClaimMismatch(_)
            | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Creation(_) | Self::Configuration(_) | Self::Hashing(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Never carries internal detail.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "Bad Request.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::InvalidToken
            | Self::ExpiredToken
            | Self::ClaimMismatch(_)
            | Self::Unauthenticated => "Invalid token.",
            Self::Forbidden => "Forbidden.",
            Self::NotFound => "Not found.",
            Self::Creation(_) | Self::Configuration(_) | Self::Hashing(_) | Self::Store(_) => {
                "Internal Server Error."
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed: {self:?}");
        }
        (status, self.public_message()).into_response()
    }
}
