//! Error type shared across the Civiroll crates.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub type CvResult<T> = std::result::Result<T, Error>;

/// Platform-wide error type.
///
/// `NotFound` and `DbError` are deliberately distinct: resolution code must
/// be able to tell "the directory has no such record" apart from "the
/// directory could not be reached". Access checks fail closed on both, but
/// they are logged and surfaced differently.
#[derive(Debug)]
pub enum Error {
	/// No authenticated identity on the request
	Unauthenticated,
	/// Authenticated, but the decision is deny
	PermissionDenied,
	/// The referenced record does not exist
	NotFound,
	/// The directory backend failed or is unreachable
	DbError,
	ValidationError(String),
	Internal(String),
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::Unauthenticated => write!(f, "unauthenticated"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::NotFound => write!(f, "not found"),
			Error::DbError => write!(f, "directory backend error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		// Never leak backend error details to the client
		let (status, code) = match self {
			Error::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
			Error::PermissionDenied => (StatusCode::FORBIDDEN, "accessDenied"),
			Error::NotFound => (StatusCode::NOT_FOUND, "notFound"),
			Error::ValidationError(_) => (StatusCode::BAD_REQUEST, "validationError"),
			_ => (StatusCode::INTERNAL_SERVER_ERROR, "internalError"),
		};
		(status, Json(json!({ "error": code }))).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_not_found_and_db_error_are_distinct() {
		// Resolution code matches on these two arms; keep them separate
		assert!(!matches!(Error::NotFound, Error::DbError));
		assert_ne!(Error::NotFound.to_string(), Error::DbError.to_string());
	}
}

// vim: ts=4
