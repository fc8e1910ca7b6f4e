//! System role and permission catalog seeding
//!
//! On first startup (empty roles table) the adapter seeds the permission
//! catalog of the voter-registration console and the built-in role
//! hierarchy. Role levels are what the decision engine gates on; the
//! superadmin role (level 10) carries no explicit grants because level 10
//! short-circuits every permission check.

use sqlx::SqlitePool;

use crate::utils::inspect;
use civiroll::prelude::*;

/// (module, action, is_sensitive, requires_mfa)
const PERMISSION_CATALOG: &[(&str, &str, bool, bool)] = &[
	("voters", "view", false, false),
	("voters", "enroll", false, false),
	("voters", "edit", false, false),
	("devices", "view", false, false),
	("devices", "assign", false, false),
	("centers", "view", false, false),
	("centers", "edit", false, false),
	("export", "view", false, false),
	("export", "generate", false, false),
	("reports", "view", false, false),
	("admin_users", "view", true, false),
	("admin_users", "edit", true, false),
	("admin_permissions", "view", true, false),
	("admin_permissions", "edit", true, true),
];

/// (name, code, level, is_system_role)
const ROLE_CATALOG: &[(&str, &str, i32, bool)] = &[
	("Observer", "observer", 1, false),
	("Registration Clerk", "clerk", 2, false),
	("Field Operator", "operator", 3, false),
	("Supervisor", "supervisor", 5, false),
	("Administrator", "administrator", 9, false),
	("Super Administrator", "superadmin", 10, true),
];

/// Permission grants per role code, as `"module.action"` keys
fn role_grants(code: &str) -> &'static [&'static str] {
	match code {
		"observer" => &["voters.view"],
		"clerk" => &["voters.view", "voters.enroll"],
		"operator" => &[
			"voters.view",
			"voters.enroll",
			"voters.edit",
			"devices.view",
			"centers.view",
			"export.view",
		],
		"supervisor" => &[
			"voters.view",
			"voters.enroll",
			"voters.edit",
			"devices.view",
			"devices.assign",
			"centers.view",
			"centers.edit",
			"export.view",
			"export.generate",
			"reports.view",
		],
		"administrator" => &[
			"voters.view",
			"voters.enroll",
			"voters.edit",
			"devices.view",
			"devices.assign",
			"centers.view",
			"centers.edit",
			"export.view",
			"export.generate",
			"reports.view",
			"admin_users.view",
			"admin_users.edit",
			"admin_permissions.view",
		],
		// Level 10 short-circuits every check; no explicit grants
		"superadmin" => &[],
		_ => &[],
	}
}

/// Seed the role/permission catalog when the roles table is empty
pub(crate) async fn seed_catalog(db: &SqlitePool) -> CvResult<()> {
	let roles: i64 = sqlx::query_scalar("SELECT count(*) FROM roles")
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	if roles > 0 {
		return Ok(());
	}

	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	for (module, action, is_sensitive, requires_mfa) in PERMISSION_CATALOG {
		sqlx::query(
			"INSERT INTO permissions (module, action, is_sensitive, requires_mfa)
			VALUES (?1, ?2, ?3, ?4)",
		)
		.bind(*module)
		.bind(*action)
		.bind(*is_sensitive)
		.bind(*requires_mfa)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	}

	for (name, code, level, is_system_role) in ROLE_CATALOG {
		sqlx::query(
			"INSERT INTO roles (name, code, level, is_system_role, is_active)
			VALUES (?1, ?2, ?3, ?4, 1)",
		)
		.bind(*name)
		.bind(*code)
		.bind(*level)
		.bind(*is_system_role)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

		for grant in role_grants(code) {
			let (module, action) = grant.split_once('.').ok_or(Error::Internal(format!(
				"malformed grant in role catalog: {}",
				grant
			)))?;

			sqlx::query(
				"INSERT INTO role_permissions (role_id, perm_id)
				SELECT r.role_id, p.perm_id
				FROM roles r, permissions p
				WHERE r.code = ?1 AND p.module = ?2 AND p.action = ?3",
			)
			.bind(*code)
			.bind(module)
			.bind(action)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;
		}
	}

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;

	info!(
		roles = ROLE_CATALOG.len(),
		permissions = PERMISSION_CATALOG.len(),
		"Seeded system role catalog"
	);
	Ok(())
}

// vim: ts=4
