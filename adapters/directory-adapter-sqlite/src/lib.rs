//! SQLite-backed directory adapter for Civiroll.
//!
//! Stores the users, roles, permissions, and role_permissions tables that
//! back permission resolution, and seeds the system role catalog on first
//! startup.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use civiroll::directory_adapter::{CreateUserData, DirectoryAdapter};
use civiroll::prelude::*;
use civiroll::rbac::{Permission, Role, UserRecord};

mod permission;
mod role;
mod schema;
mod seed;
mod user;
mod utils;

#[derive(Debug)]
pub struct DirectoryAdapterSqlite {
	db: SqlitePool,
}

impl DirectoryAdapterSqlite {
	/// Open (or create) the directory database, run migrations, and seed
	/// the system role catalog when the roles table is empty.
	pub async fn new<P: AsRef<Path>>(path: P) -> CvResult<Self> {
		let opts = SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
			.foreign_keys(true);

		let db = SqlitePoolOptions::new()
			.max_connections(4)
			.connect_with(opts)
			.await
			.map_err(|err| {
				error!("Failed to open directory database: {}", err);
				Error::DbError
			})?;

		schema::init_db(&db).await.map_err(|err| {
			error!("Failed to initialize directory schema: {}", err);
			Error::DbError
		})?;

		seed::seed_catalog(&db).await?;

		info!("Directory adapter (sqlite) ready");
		Ok(Self { db })
	}
}

#[async_trait]
impl DirectoryAdapter for DirectoryAdapterSqlite {
	async fn read_user(&self, user_id: &str) -> CvResult<UserRecord> {
		user::read_user(&self.db, user_id).await
	}

	async fn read_user_by_auth_id(&self, auth_id: &str) -> CvResult<UserRecord> {
		user::read_user_by_auth_id(&self.db, auth_id).await
	}

	async fn create_user(&self, data: CreateUserData<'_>) -> CvResult<UserRecord> {
		user::create_user(&self.db, data).await
	}

	async fn update_user_role(&self, user_id: &str, role_id: Option<i64>) -> CvResult<()> {
		user::update_user_role(&self.db, user_id, role_id).await
	}

	async fn read_role(&self, role_id: i64) -> CvResult<Role> {
		role::read_role(&self.db, role_id).await
	}

	async fn read_role_by_code(&self, code: &str) -> CvResult<Role> {
		role::read_role_by_code(&self.db, code).await
	}

	async fn list_roles(&self) -> CvResult<Vec<Role>> {
		role::list_roles(&self.db).await
	}

	async fn list_permissions(&self) -> CvResult<Vec<Permission>> {
		permission::list_permissions(&self.db).await
	}

	async fn read_role_permissions(&self, role_id: i64) -> CvResult<Vec<Permission>> {
		permission::read_role_permissions(&self.db, role_id).await
	}
}

// vim: ts=4
