//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can hit is one of its variants, and each variant carries a
//! machine-readable kind (see [`AppError::kind`]) alongside a human-readable message.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers can return it
//! directly and Actix Web turns it into a JSON body of the form
//! `{"error": "<kind>", "message": "<text>"}`. Internal failures are logged and
//! answered with a generic message so no storage or library details leak.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use log::error;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::guard::AuthError;
use crate::auth::token::TokenError;

const INTERNAL_MESSAGE: &str = "internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, malformed, forged or expired bearer token (HTTP 401).
    #[error("{0}")]
    Unauthenticated(String),
    /// Login with an unknown username or a wrong password (HTTP 401).
    /// Both cases share this variant so the response never reveals which one happened.
    #[error("incorrect username or password")]
    InvalidCredentials,
    /// The resource does not exist or belongs to someone else (HTTP 404).
    #[error("{0}")]
    NotFound(String),
    /// Input failed validation (HTTP 422).
    #[error("{0}")]
    Validation(String),
    /// Username does not satisfy the length/charset rules (HTTP 422).
    #[error("{0}")]
    InvalidUsername(String),
    /// Password does not satisfy the length rules (HTTP 422).
    #[error("{0}")]
    WeakPassword(String),
    /// The username is already taken (HTTP 400).
    #[error("username already registered")]
    DuplicateUsername,
    /// Unexpected server-side failure (HTTP 500).
    #[error("{0}")]
    Internal(String),
    /// Error originating from the database layer (HTTP 500).
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl AppError {
    /// Machine-readable error kind placed in the `error` field of the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidUsername(_) => "invalid_username",
            AppError::WeakPassword(_) => "weak_password",
            AppError::DuplicateUsername => "duplicate_username",
            AppError::Internal(_) | AppError::Database(_) => "internal_error",
        }
    }

    pub fn task_not_found() -> Self {
        AppError::NotFound("Task not found".into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidUsername(_) | AppError::WeakPassword(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::DuplicateUsername => StatusCode::BAD_REQUEST,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("request failed: {}", self);
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let mut response = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        response.json(json!({
            "error": self.kind(),
            "message": message
        }))
    }
}

/// `RowNotFound` becomes `NotFound`; everything else is a database failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            other => AppError::Database(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Hashing failures are fatal for the request; there is no weaker fallback scheme.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Invalid(_) => {
                AppError::Unauthenticated("Could not validate credentials".into())
            }
            TokenError::Signing(e) => AppError::Internal(format!("failed to sign token: {}", e)),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::Unauthenticated => {
                AppError::Unauthenticated("Could not validate credentials".into())
            }
            AuthError::NotFound => AppError::NotFound("Resource not found".into()),
        }
    }
}
