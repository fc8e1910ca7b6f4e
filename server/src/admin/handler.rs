use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::Deserialize;

use civiroll_types::directory_adapter::CreateUserData;
use civiroll_types::rbac::{Permission, Role, UserRecord};

use crate::prelude::*;

/// # GET /api/admin/roles
pub async fn list_roles(State(app): State<App>) -> CvResult<(StatusCode, Json<Vec<Role>>)> {
	let roles = app.directory.list_roles().await?;
	Ok((StatusCode::OK, Json(roles)))
}

/// # GET /api/admin/permissions
pub async fn list_permissions(
	State(app): State<App>,
) -> CvResult<(StatusCode, Json<Vec<Permission>>)> {
	let permissions = app.directory.list_permissions().await?;
	Ok((StatusCode::OK, Json(permissions)))
}

/// # GET /api/admin/users/{user_id}
pub async fn get_user(
	State(app): State<App>,
	Path(user_id): Path<String>,
) -> CvResult<(StatusCode, Json<UserRecord>)> {
	let user = app.directory.read_user(&user_id).await?;
	Ok((StatusCode::OK, Json(user)))
}

/// # POST /api/admin/users
#[derive(Deserialize)]
pub struct CreateUserReq {
	#[serde(rename = "userId")]
	user_id: String,
	#[serde(rename = "authId")]
	auth_id: String,
	#[serde(rename = "roleId")]
	role_id: Option<i64>,
	#[serde(rename = "clearanceLevel", default)]
	clearance_level: i32,
}

pub async fn post_user(
	State(app): State<App>,
	Json(req): Json<CreateUserReq>,
) -> CvResult<(StatusCode, Json<UserRecord>)> {
	if req.user_id.is_empty() || req.auth_id.is_empty() {
		return Err(Error::ValidationError("userId and authId are required".into()));
	}
	if let Some(role_id) = req.role_id {
		check_assignable_role(&app, role_id).await?;
	}

	let user = app
		.directory
		.create_user(CreateUserData {
			user_id: &req.user_id,
			auth_id: &req.auth_id,
			role_id: req.role_id,
			clearance_level: req.clearance_level,
		})
		.await?;
	info!(subject = %user.user_id, role_id = ?user.role_id, "User created");

	Ok((StatusCode::CREATED, Json(user)))
}

/// # PUT /api/admin/users/{user_id}/role
///
/// Reassigns (or detaches, with `roleId: null`) a user's role. The user's
/// cached permission tuple is dropped so the next resolution sees the new
/// role immediately instead of after the cache TTL.
#[derive(Deserialize)]
pub struct UpdateRoleReq {
	#[serde(rename = "roleId")]
	role_id: Option<i64>,
}

pub async fn put_user_role(
	State(app): State<App>,
	Path(user_id): Path<String>,
	Json(req): Json<UpdateRoleReq>,
) -> CvResult<(StatusCode, Json<UserRecord>)> {
	if let Some(role_id) = req.role_id {
		check_assignable_role(&app, role_id).await?;
	}

	app.directory.update_user_role(&user_id, req.role_id).await?;
	app.resolver.clear_permissions_cache(Some(&user_id));
	info!(subject = %user_id, role_id = ?req.role_id, "Role reassigned");

	let user = app.directory.read_user(&user_id).await?;
	Ok((StatusCode::OK, Json(user)))
}

/// # DELETE /api/admin/cache
///
/// Flushes every cached permission tuple, forcing fresh resolution. Meant
/// for use after bulk catalog edits done outside the API.
pub async fn delete_cache(State(app): State<App>) -> CvResult<StatusCode> {
	app.resolver.clear_permissions_cache(None);
	info!("Permission cache flushed");
	Ok(StatusCode::NO_CONTENT)
}

async fn check_assignable_role(app: &App, role_id: i64) -> CvResult<()> {
	let role = app.directory.read_role(role_id).await.map_err(|err| match err {
		Error::NotFound => Error::ValidationError("unknown role".into()),
		err => err,
	})?;
	if !role.is_active {
		return Err(Error::ValidationError("role is inactive".into()));
	}
	Ok(())
}

// vim: ts=4
