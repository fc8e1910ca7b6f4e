use axum::{
	Router, middleware,
	routing::{delete, get, post, put},
};

use civiroll_core::{guard, session};

use crate::App;
use crate::admin;
use crate::auth;

/// Any of these opens the role/permission catalog endpoints
const CATALOG_VIEW: &[&str] = &["admin_users.view", "admin_permissions.view"];
/// Permission behind every user mutation
const USER_EDIT: &[&str] = &["admin_users.edit"];

pub fn init(app: App) -> Router {
	let public_router = Router::new().route("/api/login", post(auth::handler::post_login));

	let session_router = Router::new()
		.route("/api/me", get(auth::handler::get_whoami))
		.route("/api/access", get(auth::handler::get_access));

	let catalog_router = Router::new()
		.route("/api/admin/roles", get(admin::handler::list_roles))
		.route("/api/admin/permissions", get(admin::handler::list_permissions))
		.route_layer(middleware::from_fn_with_state(
			app.clone(),
			guard::require_permissions(CATALOG_VIEW),
		));

	// User management backs the /admin/users console page; the page gate
	// applies first, the edit permission additionally guards mutations.
	let users_router = Router::new()
		.route("/api/admin/users", post(admin::handler::post_user))
		.route("/api/admin/users/{user_id}/role", put(admin::handler::put_user_role))
		.route_layer(middleware::from_fn_with_state(
			app.clone(),
			guard::require_permissions(USER_EDIT),
		))
		.route("/api/admin/users/{user_id}", get(admin::handler::get_user))
		.route_layer(middleware::from_fn_with_state(
			app.clone(),
			guard::require_page_access("/admin/users"),
		));

	let maintenance_router = Router::new()
		.route("/api/admin/cache", delete(admin::handler::delete_cache))
		.route_layer(middleware::from_fn_with_state(app.clone(), guard::require_min_level(9)));

	Router::new()
		.merge(session_router)
		.merge(catalog_router)
		.merge(users_router)
		.merge(maintenance_router)
		.layer(middleware::from_fn_with_state(app.clone(), session::require_auth))
		.merge(public_router)
		.with_state(app)
}

// vim: ts=4
