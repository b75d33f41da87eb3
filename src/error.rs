// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Application error type that converts to HTML error pages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Auth provider error (HTTP {status}): {message}")]
    AuthProvider { status: u16, message: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Classify a non-success upstream response from the loyalty API.
    ///
    /// The body's `error` or `message` field is preferred over raw text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);

        match status {
            400 => AppError::BadRequest(message),
            401 => AppError::Unauthorized,
            403 => AppError::Forbidden(message),
            404 => AppError::NotFound(message),
            409 => AppError::Conflict(message),
            _ => AppError::Backend { status, message },
        }
    }

    /// HTTP status this error renders with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Backend { status, .. } | AppError::AuthProvider { status, .. }
                if *status < 500 =>
            {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Backend { .. } | AppError::AuthProvider { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show in a banner or error page.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            AppError::Forbidden(_) => "You don't have permission to do that.".to_string(),
            AppError::NotFound(msg) => non_empty_or(msg, "Not found"),
            AppError::BadRequest(msg) => non_empty_or(msg, "Invalid request"),
            AppError::Conflict(msg) => non_empty_or(msg, "That action was already processed."),
            AppError::Backend { status, message } | AppError::AuthProvider { status, message } => {
                match status {
                    401 => "Your session has expired. Please sign in again.".to_string(),
                    403 => "You don't have permission to do that.".to_string(),
                    409 => non_empty_or(message, "That action was already processed."),
                    400..=499 => non_empty_or(message, "Invalid request"),
                    _ => GENERIC_RETRY.to_string(),
                }
            }
            AppError::Internal(_) => GENERIC_RETRY.to_string(),
        }
    }

    /// Whether the error means the session is no longer usable.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized
                | AppError::Backend { status: 401, .. }
                | AppError::AuthProvider { status: 401, .. }
        )
    }
}

const GENERIC_RETRY: &str = "Something went wrong. Please try again.";

fn non_empty_or(msg: &str, fallback: &str) -> String {
    if msg.trim().is_empty() {
        fallback.to_string()
    } else {
        msg.to_string()
    }
}

/// Pull a human-readable message out of an upstream error body.
pub(crate) fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message", "msg", "error_description", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
        if value.is_object() {
            return String::new();
        }
    }
    body.trim().to_string()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
            }
            AppError::Backend { status, message } if *status >= 500 => {
                tracing::error!(status, error = %message, "Backend error");
            }
            AppError::AuthProvider { status, message } if *status >= 500 => {
                tracing::error!(status, error = %message, "Auth provider error");
            }
            _ => {
                tracing::debug!(error = %self, "Request failed");
            }
        }

        let body = crate::views::pages::error_page(status, &self.user_message());
        (status, body).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
