use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::SignedCookieJar;
use serde_json::json;
use thiserror::Error;

use crate::flash;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("File type not allowed")]
    FileTypeNotAllowed,

    #[error("File too large (max 10 MB)")]
    PayloadTooLarge,

    #[error("Please fill in the {0} field")]
    MissingField(&'static str),

    #[error("Invalid value for {0}")]
    InvalidField(&'static str),

    #[error("File not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    Multipart(MultipartError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::Multipart(err)
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoFileSelected
            | AppError::FileTypeNotAllowed
            | AppError::MissingField(_)
            | AppError::InvalidField(_)
            | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Io(_) | AppError::Join(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the user can fix this by resubmitting.
    pub fn is_user_facing(&self) -> bool {
        !self.status().is_server_error()
    }

    /// Turns a user-facing error into an error flash plus a redirect to
    /// `back`. Server errors skip the flash and answer 500.
    pub fn recover(self, jar: SignedCookieJar, back: &str) -> Response {
        if !self.is_user_facing() {
            return self.into_response();
        }

        tracing::warn!(error = %self, back, "Rejected submission");
        (flash::error(jar, self.to_string()), Redirect::to(back)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("Internal Server Error: {}", self);
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
