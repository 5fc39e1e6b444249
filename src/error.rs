// src/error.rs

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// Accumulated validation failures, keyed by field name.
///
/// Every rule for a request runs before the result is inspected, so the
/// client receives all problems at once instead of one per round trip.
/// The first message recorded for a field wins.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Violations(BTreeMap<String, String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation for `field` unless one was already recorded.
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Records a violation for `field` when `ok` does not hold.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn message(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Ok when no violation was recorded, otherwise the 422 error carrying
    /// the full field map.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (undecodable or unknown-field JSON, bad path params)
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden: authenticated but lacking the required capability
    Forbidden(String),

    // 404 Not Found (record absent, or id < 1)
    NotFound(String),

    // 409 Conflict (e.g., duplicate username)
    Conflict(String),

    // 422 Unprocessable Entity with a field -> message body
    Validation(Violations),

    // 503 Service Unavailable: a storage call exceeded its deadline
    Timeout,
}

impl AppError {
    /// The stock 404 used for absent rows and out-of-range identifiers.
    pub fn not_found() -> Self {
        AppError::NotFound("the requested resource could not be found".to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
/// Internal detail is logged, never echoed back to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal Server Error"}),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({"error": msg})),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, json!({"error": msg})),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({"error": msg})),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({"error": msg})),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({"error": msg})),
            AppError::Validation(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": violations}),
            ),
            AppError::Timeout => {
                tracing::error!("storage operation exceeded its deadline");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({"error": "the server could not complete your request in time"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError`.
/// Allows using `?` operator on database queries. A missing row maps to
/// `NotFound` so handlers can answer 404 one-for-one; everything else is
/// an opaque internal error.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::not_found(),
            _ => AppError::InternalServerError(err.to_string()),
        }
    }
}

/// An elapsed `tokio::time::timeout` around a query future becomes the
/// dedicated timeout error, distinct from NotFound and internal failures.
impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout
    }
}

/// Flattens `validator` derive output into the same field -> message shape
/// the hand-rolled checks produce, so every 422 body looks alike.
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations = Violations::new();
        for (field, kind) in errors.errors() {
            if let validator::ValidationErrorsKind::Field(field_errors) = kind {
                if let Some(first) = field_errors.first() {
                    let message = first
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| first.code.to_string());
                    violations.add(&field.to_string(), &message);
                }
            }
        }
        AppError::Validation(violations)
    }
}
