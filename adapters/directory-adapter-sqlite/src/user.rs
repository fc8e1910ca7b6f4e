//! User directory operations

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;

use crate::utils::*;
use civiroll::directory_adapter::CreateUserData;
use civiroll::prelude::*;
use civiroll::rbac::UserRecord;

fn row_to_user(row: &SqliteRow) -> Result<UserRecord, sqlx::Error> {
	Ok(UserRecord {
		user_id: row.try_get("user_id")?,
		auth_id: row.try_get("auth_id")?,
		role_id: row.try_get("role_id")?,
		clearance_level: row.try_get("clearance_level")?,
		status: row.try_get("status")?,
	})
}

/// Read a user by the directory's own key
pub(crate) async fn read_user(db: &SqlitePool, user_id: &str) -> CvResult<UserRecord> {
	let res = sqlx::query(
		"SELECT user_id, auth_id, role_id, clearance_level, status
		FROM users WHERE user_id = ?1",
	)
	.bind(user_id)
	.fetch_one(db)
	.await;

	map_res(res, row_to_user)
}

/// Read a user by the external auth identity
pub(crate) async fn read_user_by_auth_id(db: &SqlitePool, auth_id: &str) -> CvResult<UserRecord> {
	let res = sqlx::query(
		"SELECT user_id, auth_id, role_id, clearance_level, status
		FROM users WHERE auth_id = ?1",
	)
	.bind(auth_id)
	.fetch_one(db)
	.await;

	map_res(res, row_to_user)
}

/// Create a user
pub(crate) async fn create_user(db: &SqlitePool, data: CreateUserData<'_>) -> CvResult<UserRecord> {
	sqlx::query(
		"INSERT INTO users (user_id, auth_id, role_id, clearance_level, status)
		VALUES (?1, ?2, ?3, ?4, 'A')",
	)
	.bind(data.user_id)
	.bind(data.auth_id)
	.bind(data.role_id)
	.bind(data.clearance_level)
	.execute(db)
	.await
	.map_err(|err| {
		// user_id and auth_id are both unique keys
		if err.as_database_error().is_some_and(|db_err| db_err.is_unique_violation()) {
			Error::ValidationError("user already exists".into())
		} else {
			inspect(&err);
			Error::DbError
		}
	})?;

	read_user(db, data.user_id).await
}

/// Reassign a user's role (or detach it with None).
///
/// Callers own the follow-up cache invalidation; the adapter only mutates
/// the row.
pub(crate) async fn update_user_role(
	db: &SqlitePool,
	user_id: &str,
	role_id: Option<i64>,
) -> CvResult<()> {
	let res = sqlx::query("UPDATE users SET role_id = ?1 WHERE user_id = ?2")
		.bind(role_id)
		.bind(user_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	info!(user = user_id, role = ?role_id, "User role reassigned");
	Ok(())
}

// vim: ts=4
