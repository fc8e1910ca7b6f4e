//! Database schema initialization and migrations

use sqlx::{Sqlite, SqlitePool, Transaction};

/// Get the current database version from vars table
async fn get_db_version(tx: &mut Transaction<'_, Sqlite>) -> i64 {
	sqlx::query_scalar::<_, String>("SELECT value FROM vars WHERE key = 'db_version'")
		.fetch_optional(&mut **tx)
		.await
		.ok()
		.flatten()
		.and_then(|v| v.parse().ok())
		.unwrap_or(0)
}

/// Set the database version in vars table
async fn set_db_version(tx: &mut Transaction<'_, Sqlite>, version: i64) {
	let _ = sqlx::query("INSERT OR REPLACE INTO vars (key, value) VALUES ('db_version', ?)")
		.bind(version.to_string())
		.execute(&mut **tx)
		.await;
}

// Current schema version - update this when adding new migrations
const CURRENT_DB_VERSION: i64 = 1;

/// Initialize the database schema and run migrations
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Create vars table first (needed for version tracking)
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS vars (
		key text NOT NULL,
		value text NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		updated_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	let version = get_db_version(&mut tx).await;

	// Schema creation - safe to run every time (uses IF NOT EXISTS)

	// Roles: level totally orders the hierarchy, level >= 10 is super admin
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS roles (
			role_id integer PRIMARY KEY AUTOINCREMENT,
			name text NOT NULL,
			code text NOT NULL UNIQUE,
			level integer NOT NULL,
			is_system_role integer NOT NULL DEFAULT 0,
			is_active integer NOT NULL DEFAULT 1,
			created_at INTEGER DEFAULT (unixepoch())
		)",
	)
	.execute(&mut *tx)
	.await?;

	// Permissions: identity is the (module, action) pair
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS permissions (
			perm_id integer PRIMARY KEY AUTOINCREMENT,
			module text NOT NULL,
			action text NOT NULL,
			is_sensitive integer NOT NULL DEFAULT 0,
			requires_mfa integer NOT NULL DEFAULT 0,
			created_at INTEGER DEFAULT (unixepoch()),
			UNIQUE(module, action)
		)",
	)
	.execute(&mut *tx)
	.await?;

	// Role ↔ Permission join
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS role_permissions (
			role_id integer NOT NULL REFERENCES roles(role_id) ON DELETE CASCADE,
			perm_id integer NOT NULL REFERENCES permissions(perm_id) ON DELETE CASCADE,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(role_id, perm_id)
		)",
	)
	.execute(&mut *tx)
	.await?;

	// Users: auth_id is the external identity; exactly one role at a time
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
			user_id text PRIMARY KEY,
			auth_id text NOT NULL UNIQUE,
			role_id integer REFERENCES roles(role_id),
			clearance_level integer NOT NULL DEFAULT 0,
			status char(1) NOT NULL DEFAULT 'A',
			created_at INTEGER DEFAULT (unixepoch())
		)",
	)
	.execute(&mut *tx)
	.await?;

	if version < CURRENT_DB_VERSION {
		set_db_version(&mut tx, CURRENT_DB_VERSION).await;
	}

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
