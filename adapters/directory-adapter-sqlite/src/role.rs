//! Role directory operations

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;

use crate::utils::*;
use civiroll::prelude::*;
use civiroll::rbac::Role;

pub(crate) fn row_to_role(row: &SqliteRow) -> Result<Role, sqlx::Error> {
	Ok(Role {
		role_id: row.try_get("role_id")?,
		name: row.try_get("name")?,
		code: row.try_get("code")?,
		level: row.try_get("level")?,
		is_system_role: row.try_get("is_system_role")?,
		is_active: row.try_get("is_active")?,
	})
}

const ROLE_COLUMNS: &str = "role_id, name, code, level, is_system_role, is_active";

pub(crate) async fn read_role(db: &SqlitePool, role_id: i64) -> CvResult<Role> {
	let res = sqlx::query(&format!("SELECT {} FROM roles WHERE role_id = ?1", ROLE_COLUMNS))
		.bind(role_id)
		.fetch_one(db)
		.await;

	map_res(res, row_to_role)
}

pub(crate) async fn read_role_by_code(db: &SqlitePool, code: &str) -> CvResult<Role> {
	let res = sqlx::query(&format!("SELECT {} FROM roles WHERE code = ?1", ROLE_COLUMNS))
		.bind(code)
		.fetch_one(db)
		.await;

	map_res(res, row_to_role)
}

/// List all roles ordered by descending level
pub(crate) async fn list_roles(db: &SqlitePool) -> CvResult<Vec<Role>> {
	let res = sqlx::query(&format!("SELECT {} FROM roles ORDER BY level DESC", ROLE_COLUMNS))
		.fetch_all(db)
		.await;

	collect_rows(res, row_to_role)
}

// vim: ts=4
