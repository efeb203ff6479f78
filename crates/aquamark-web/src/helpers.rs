//! Helper types and traits for cleaner route handlers.
//!
//! Provides extension traits for converting `Result` types into
//! HTTP-appropriate error responses, reducing boilerplate in routes.

use axum::http::StatusCode;

use crate::logo_store::LogoError;

/// Standard result type for route handlers.
pub type RouteResult<T> = Result<T, (StatusCode, String)>;

/// Extension trait for converting `Result<T, E>` to `RouteResult<T>`.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Converts the error to 500 Internal Server Error.
    fn or_internal_error(self) -> RouteResult<T>;

    /// Converts the error to 400 Bad Request.
    fn or_bad_request(self) -> RouteResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn or_internal_error(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }

    fn or_bad_request(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
    }
}

/// Map an engine error to its HTTP response.
///
/// Missing inputs are the caller's fault (400); documents or logos that
/// cannot be processed are unprocessable (422); anything else is a server
/// error (500).
pub fn engine_error_response(error: &aquamark_core::Error) -> (StatusCode, String) {
    use aquamark_core::Error;

    let status = match error {
        Error::MissingInput(_) => StatusCode::BAD_REQUEST,
        Error::DocumentLoad(_) | Error::DocumentEncrypted | Error::ImageFormat(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, error.to_string())
}

/// Map a logo store error to its HTTP response.
///
/// A missing logo is a 404; an unreachable or failing store is a 502.
pub fn logo_error_response(error: &LogoError) -> (StatusCode, String) {
    let status = match error {
        LogoError::NotFound(_) => StatusCode::NOT_FOUND,
        LogoError::Upstream(_) => StatusCode::BAD_GATEWAY,
    };

    (status, error.to_string())
}
