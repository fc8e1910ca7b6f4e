//! Adapter that stores the user/role/permission directory.
//!
//! The RBAC core treats the directory as a keyed lookup over relational
//! rows. Every `DirectoryAdapter` implementation must return
//! `Error::NotFound` for missing records and `Error::DbError` for backend
//! failures - the resolver depends on that distinction to avoid conflating
//! an unknown user with an outage.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::CvResult;
use crate::rbac::{Permission, Role, UserRecord};

/// Data needed to create a new user
#[derive(Debug)]
pub struct CreateUserData<'a> {
	pub user_id: &'a str,
	pub auth_id: &'a str,
	pub role_id: Option<i64>,
	pub clearance_level: i32,
}

/// A Civiroll directory adapter
///
/// Responsible for storing and querying the user/role/permission tables
/// that back permission resolution. The Role↔Permission join is internal to
/// the adapter; callers only ever see resolved permission rows per role.
#[async_trait]
pub trait DirectoryAdapter: Debug + Send + Sync {
	// Users
	/// Reads a user by the directory's own key
	async fn read_user(&self, user_id: &str) -> CvResult<UserRecord>;

	/// Reads a user by the external auth identity
	async fn read_user_by_auth_id(&self, auth_id: &str) -> CvResult<UserRecord>;

	/// Creates a user
	async fn create_user(&self, data: CreateUserData<'_>) -> CvResult<UserRecord>;

	/// Reassigns a user's role. Callers must invalidate any cached
	/// permission tuple for the user afterwards.
	async fn update_user_role(&self, user_id: &str, role_id: Option<i64>) -> CvResult<()>;

	// Roles
	async fn read_role(&self, role_id: i64) -> CvResult<Role>;
	async fn read_role_by_code(&self, code: &str) -> CvResult<Role>;
	async fn list_roles(&self) -> CvResult<Vec<Role>>;

	// Permissions
	async fn list_permissions(&self) -> CvResult<Vec<Permission>>;

	/// Resolves the Role→RolePermission→Permission join for one role
	async fn read_role_permissions(&self, role_id: i64) -> CvResult<Vec<Permission>>;
}

// vim: ts=4
