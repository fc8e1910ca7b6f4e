//! Session token handling and authentication middleware
//!
//! The identity provider itself is external; this module only mints and
//! validates the service's own HS256 bearer tokens and exposes the two
//! middlewares that turn a token into a `CurrentUser` request extension.

use axum::{
	body::Body,
	extract::State,
	http::{Request, response::Response},
	middleware::Next,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::extract::Auth;
use crate::prelude::*;

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_SECS: i64 = 8 * 3600; /* 8 hours */

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SessionClaims {
	/// User id (the directory's own key)
	pub sub: Box<str>,
	/// External auth identity, carried for audit logging
	pub aid: Option<Box<str>>,
	pub exp: i64,
}

/// Authenticated identity attached to a request
#[derive(Clone, Debug)]
pub struct CurrentUser {
	pub user_id: Box<str>,
	pub auth_id: Option<Box<str>>,
}

pub fn generate_session_token(
	secret: &str,
	user_id: &str,
	auth_id: Option<&str>,
	ttl_secs: i64,
) -> CvResult<Box<str>> {
	let claims = SessionClaims {
		sub: Box::from(user_id),
		aid: auth_id.map(Box::from),
		exp: Timestamp::now().add_seconds(ttl_secs).0,
	};

	let token = encode(
		&jsonwebtoken::Header::new(Algorithm::HS256),
		&claims,
		&EncodingKey::from_secret(secret.as_bytes()),
	)
	.map_err(|_| Error::Internal("session token encoding failed".into()))?;

	Ok(token.into())
}

pub fn validate_session_token(secret: &str, token: &str) -> CvResult<CurrentUser> {
	let token_data = decode::<SessionClaims>(
		token,
		&DecodingKey::from_secret(secret.as_bytes()),
		&Validation::new(Algorithm::HS256),
	)
	.map_err(|_| Error::Unauthenticated)?;

	Ok(CurrentUser { user_id: token_data.claims.sub, auth_id: token_data.claims.aid })
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
	req.headers()
		.get("Authorization")
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
}

/// Reject the request unless it carries a valid session token
pub async fn require_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> CvResult<Response<Body>> {
	let token = bearer_token(&req).ok_or(Error::Unauthenticated)?;
	let user = validate_session_token(&app.opts.session_secret, token)?;

	req.extensions_mut().insert(Auth(user));

	Ok(next.run(req).await)
}

/// Attach the identity when a valid token is present, pass through otherwise
pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> CvResult<Response<Body>> {
	if let Some(token) = bearer_token(&req) {
		if let Ok(user) = validate_session_token(&app.opts.session_secret, token) {
			req.extensions_mut().insert(Auth(user));
		}
	}

	Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_session_token_round_trip() {
		let token =
			generate_session_token("secret", "u42", Some("auth-u42"), 3600).unwrap();
		let user = validate_session_token("secret", &token).unwrap();

		assert_eq!(user.user_id.as_ref(), "u42");
		assert_eq!(user.auth_id.as_deref(), Some("auth-u42"));
	}

	#[test]
	fn test_wrong_secret_is_rejected() {
		let token = generate_session_token("secret", "u42", None, 3600).unwrap();
		assert!(matches!(
			validate_session_token("other-secret", &token),
			Err(Error::Unauthenticated)
		));
	}

	#[test]
	fn test_expired_token_is_rejected() {
		let token = generate_session_token("secret", "u42", None, -3600).unwrap();
		assert!(matches!(validate_session_token("secret", &token), Err(Error::Unauthenticated)));
	}

	#[test]
	fn test_garbage_token_is_rejected() {
		assert!(validate_session_token("secret", "not-a-token").is_err());
	}
}

// vim: ts=4
