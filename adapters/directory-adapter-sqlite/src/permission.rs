//! Permission directory operations

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;

use crate::utils::*;
use civiroll::prelude::*;
use civiroll::rbac::Permission;

pub(crate) fn row_to_permission(row: &SqliteRow) -> Result<Permission, sqlx::Error> {
	Ok(Permission {
		perm_id: row.try_get("perm_id")?,
		module: row.try_get("module")?,
		action: row.try_get("action")?,
		is_sensitive: row.try_get("is_sensitive")?,
		requires_mfa: row.try_get("requires_mfa")?,
	})
}

/// List the whole permission catalog
pub(crate) async fn list_permissions(db: &SqlitePool) -> CvResult<Vec<Permission>> {
	let res = sqlx::query(
		"SELECT perm_id, module, action, is_sensitive, requires_mfa
		FROM permissions ORDER BY module, action",
	)
	.fetch_all(db)
	.await;

	collect_rows(res, row_to_permission)
}

/// Resolve the Role→RolePermission→Permission join for one role
pub(crate) async fn read_role_permissions(
	db: &SqlitePool,
	role_id: i64,
) -> CvResult<Vec<Permission>> {
	let res = sqlx::query(
		"SELECT p.perm_id, p.module, p.action, p.is_sensitive, p.requires_mfa
		FROM role_permissions rp
		JOIN permissions p ON p.perm_id = rp.perm_id
		WHERE rp.role_id = ?1
		ORDER BY p.module, p.action",
	)
	.bind(role_id)
	.fetch_all(db)
	.await;

	collect_rows(res, row_to_permission)
}

// vim: ts=4
