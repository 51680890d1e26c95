//! Error types and helpers for mapping errors to HTTP responses.
//!
//! The [`ApiError`] type carries both an HTTP status code and a message. Its JSON
//! body has the shape clients of the catalog already expect:
//!
//! ```json
//! { "statusCode": 400, "error": "Bad Request", "message": "..." }
//! ```
//!
//! Use [`ResultExt`] to attach status codes to `anyhow::Error` chains, or the
//! [`client_bail!`] and [`status_bail!`] macros for early returns.

use serde::{Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use warp::http::StatusCode;
use warp::reject::Reject;

#[derive(Clone, Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl Serialize for ApiError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            status_code: u16,
            error: &'a str,
            message: &'a str,
        }

        Body {
            status_code: self.status.as_u16(),
            error: self.status.canonical_reason().unwrap_or("Unknown Error"),
            message: &self.message,
        }
        .serialize(serializer)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Reject for ApiError {}

impl ApiError {
    pub fn new(status: StatusCode, message: impl ToString) -> Self {
        ApiError {
            status,
            message: message.to_string(),
        }
    }
}

/// Extension trait for attaching HTTP status codes to error results.
pub trait ResultExt<T> {
    /// Wraps the error with an [`ApiError`] carrying the given status code.
    fn with_status(self, status: StatusCode) -> Result<T, anyhow::Error>;

    /// Convenience method for `with_status(StatusCode::BAD_REQUEST)`.
    fn mark_client_error(self) -> Result<T, anyhow::Error>;
}

impl<T> ResultExt<T> for Result<T, anyhow::Error> {
    fn with_status(self, status: StatusCode) -> Result<T, anyhow::Error> {
        self.map_err(|err| {
            let message = format!("{:#}", err);
            err.context(ApiError { status, message })
        })
    }

    fn mark_client_error(self) -> Result<T, anyhow::Error> {
        self.with_status(StatusCode::BAD_REQUEST)
    }
}

/// Early return with a 400 Bad Request error.
#[macro_export]
macro_rules! client_bail {
    ($err:expr $(,)?) => {
        return $crate::web::error::ResultExt::mark_client_error(Err(::anyhow::anyhow!($err)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return $crate::web::error::ResultExt::mark_client_error(Err(::anyhow::anyhow!($fmt, $($arg)*)))
    };
}

/// Early return with a custom HTTP status code.
#[macro_export]
macro_rules! status_bail {
    ($status:expr, $msg:literal $(,)?) => {
        return $crate::web::error::ResultExt::with_status(Err(::anyhow::anyhow!($msg)), $status)
    };
    ($status:expr, $fmt:literal, $($arg:tt)*) => {
        return $crate::web::error::ResultExt::with_status(Err(::anyhow::anyhow!($fmt, $($arg)*)), $status)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failing_lookup(id: &str) -> anyhow::Result<()> {
        client_bail!("Unknown product '{}'", id);
    }

    #[test]
    fn serializes_status_and_reason() {
        let error = ApiError::new(StatusCode::NOT_FOUND, "No such product");

        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"statusCode": 404, "error": "Not Found", "message": "No such product"})
        );
    }

    #[test]
    fn client_bail_marks_bad_request() {
        let err = failing_lookup("42").unwrap_err();
        let api_error = err.downcast_ref::<ApiError>().unwrap();

        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.message, "Unknown product '42'");
    }

    #[test]
    fn with_status_keeps_the_cause_chain() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("disk full"));
        let err = anyhow::Context::context(result, "Cannot store upload")
            .with_status(StatusCode::SERVICE_UNAVAILABLE)
            .unwrap_err();

        let api_error = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_error.message, "Cannot store upload: disk full");
    }
}
