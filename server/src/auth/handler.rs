use axum::{
	Json,
	extract::{Query, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use civiroll_core::{decision, extract::Auth, session};
use civiroll_types::rbac::UserPermissions;

use crate::prelude::*;

/// # Login
#[skip_serializing_none]
#[derive(Serialize)]
pub struct Login {
	#[serde(rename = "userId")]
	user_id: String,
	token: String,
	role: Option<String>,
	#[serde(rename = "roleLevel")]
	role_level: Option<i32>,
	permissions: Vec<String>,
}

/// # POST /api/login
///
/// Exchanges an identity-provider subject for a session token. Credential
/// verification happened upstream; this endpoint only maps the external
/// identity onto a directory user and mints the bearer token.
#[derive(Deserialize)]
pub struct LoginReq {
	#[serde(rename = "authId")]
	auth_id: String,
}

pub async fn post_login(
	State(app): State<App>,
	Json(req): Json<LoginReq>,
) -> CvResult<(StatusCode, Json<Login>)> {
	let user = app.directory.read_user_by_auth_id(&req.auth_id).await.map_err(|err| match err {
		Error::NotFound => Error::Unauthenticated,
		err => err,
	})?;

	if user.status.as_ref() != "A" {
		warn!(subject = %user.user_id, "Login rejected: inactive account");
		return Err(Error::Unauthenticated);
	}

	let token = session::generate_session_token(
		&app.opts.session_secret,
		&user.user_id,
		Some(&user.auth_id),
		app.opts.session_ttl_secs,
	)?;

	// A user without an assigned role can still log in; every access
	// decision downstream treats them as permissionless.
	let tuple = app.resolver.user_permissions(&user.user_id).await.ok();
	info!(subject = %user.user_id, "Login");

	let (role, role_level, permissions) = match tuple {
		Some(t) => (Some(t.role_name.to_string()), Some(t.role_level), sorted_permissions(&t)),
		None => (None, None, vec![]),
	};

	Ok((
		StatusCode::OK,
		Json(Login {
			user_id: user.user_id.to_string(),
			token: token.to_string(),
			role,
			role_level,
			permissions,
		}),
	))
}

/// # Whoami
#[skip_serializing_none]
#[derive(Serialize)]
pub struct Whoami {
	#[serde(rename = "userId")]
	user_id: String,
	#[serde(rename = "authId")]
	auth_id: Option<String>,
	role: Option<String>,
	#[serde(rename = "roleLevel")]
	role_level: Option<i32>,
	#[serde(rename = "isSuperAdmin")]
	is_super_admin: bool,
	permissions: Vec<String>,
}

/// # GET /api/me
pub async fn get_whoami(
	State(app): State<App>,
	Auth(user): Auth,
) -> CvResult<(StatusCode, Json<Whoami>)> {
	let tuple = match app.resolver.user_permissions(&user.user_id).await {
		Ok(tuple) => Some(tuple),
		Err(Error::NotFound) => None,
		Err(err) => return Err(err),
	};

	let whoami = match tuple {
		Some(t) => Whoami {
			user_id: user.user_id.to_string(),
			auth_id: user.auth_id.as_deref().map(str::to_string),
			role: Some(t.role_name.to_string()),
			role_level: Some(t.role_level),
			is_super_admin: t.is_super_admin(),
			permissions: sorted_permissions(&t),
		},
		None => Whoami {
			user_id: user.user_id.to_string(),
			auth_id: user.auth_id.as_deref().map(str::to_string),
			role: None,
			role_level: None,
			is_super_admin: false,
			permissions: vec![],
		},
	};

	Ok((StatusCode::OK, Json(whoami)))
}

/// # Access probe
///
/// Lets the console ask ahead of navigation whether a page would be
/// allowed, without triggering the guard's redirect/denial responses.
#[derive(Deserialize)]
pub struct AccessQuery {
	path: String,
}

#[skip_serializing_none]
#[derive(Serialize)]
pub struct Access {
	path: String,
	allowed: bool,
	role: Option<String>,
	/// Set when the answer came from a backend outage rather than a decision
	retryable: bool,
}

/// # GET /api/access?path=/admin/exports
pub async fn get_access(
	State(app): State<App>,
	Auth(user): Auth,
	Query(query): Query<AccessQuery>,
) -> CvResult<(StatusCode, Json<Access>)> {
	let (allowed, role, retryable) = match app.resolver.user_permissions(&user.user_id).await {
		Ok(tuple) => (
			decision::can_access_page(Some(&tuple), &app.pages, &query.path),
			Some(tuple.role_name.to_string()),
			false,
		),
		Err(Error::DbError) => (false, None, true),
		Err(_) => (false, None, false),
	};

	Ok((StatusCode::OK, Json(Access { path: query.path, allowed, role, retryable })))
}

fn sorted_permissions(tuple: &UserPermissions) -> Vec<String> {
	let mut perms: Vec<String> = tuple.permissions.iter().map(|p| p.to_string()).collect();
	perms.sort_unstable();
	perms
}

// vim: ts=4
