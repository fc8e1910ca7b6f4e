//! Permission resolver
//!
//! Resolves a user identity into the authoritative {role, level,
//! permission-set} tuple via the directory adapter, writing successful
//! resolutions through to the permission cache.

use std::sync::Arc;

use crate::cache::PermissionCache;
use crate::prelude::*;
use civiroll_types::directory_adapter::DirectoryAdapter;
use civiroll_types::rbac::UserPermissions;

/// Resolves user → role → permission-set, with cache write-through.
///
/// Outcomes are tagged rather than collapsed: `Err(Error::NotFound)` means
/// the user is unknown, roleless, or the role is inactive ("resolved to no
/// permissions"), while `Err(Error::DbError)` means the directory backend
/// failed. Callers must treat both as deny but may surface them
/// differently (an outage is retryable; an unknown user is not).
pub struct PermissionResolver {
	directory: Arc<dyn DirectoryAdapter>,
	cache: Arc<PermissionCache>,
}

impl PermissionResolver {
	pub fn new(directory: Arc<dyn DirectoryAdapter>, cache: Arc<PermissionCache>) -> Self {
		Self { directory, cache }
	}

	/// Resolve the permission tuple for a user, from cache or fresh.
	///
	/// Fresh resolution is a two-step join: User→Role, then
	/// Role→Permission through the join table inside the adapter.
	pub async fn user_permissions(&self, user_id: &str) -> CvResult<UserPermissions> {
		if let Some(tuple) = self.cache.get(user_id) {
			debug!(user = user_id, "Permission tuple cache hit");
			return Ok(tuple);
		}

		let user = self.directory.read_user(user_id).await?;

		// No attached role resolves to "no permissions", not to a crash
		let Some(role_id) = user.role_id else {
			debug!(user = user_id, "User has no role attached");
			return Err(Error::NotFound);
		};

		let role = self.directory.read_role(role_id).await?;
		if !role.is_active {
			warn!(user = user_id, role = %role.code, "Role is inactive, resolving to no permissions");
			return Err(Error::NotFound);
		}

		let permissions = self.directory.read_role_permissions(role_id).await?;

		let tuple = UserPermissions {
			user_id: user.user_id,
			role_id: role.role_id,
			role_name: role.name,
			role_level: role.level,
			permissions: permissions.iter().map(|p| p.key()).collect(),
		};

		debug!(
			user = user_id,
			role = %tuple.role_name,
			level = tuple.role_level,
			permissions = tuple.permissions.len(),
			"Resolved permission tuple"
		);

		self.cache.set(tuple.clone());
		Ok(tuple)
	}

	/// Drop one user's cached tuple, or the whole cache.
	///
	/// Must be called whenever a role assignment or a role's permission
	/// set changes; the TTL alone would leave stale grants readable for up
	/// to five minutes.
	pub fn clear_permissions_cache(&self, user_id: Option<&str>) {
		match user_id {
			Some(user_id) => self.cache.invalidate(user_id),
			None => self.cache.invalidate_all(),
		}
	}

	pub fn cache(&self) -> &PermissionCache {
		&self.cache
	}
}

impl std::fmt::Debug for PermissionResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PermissionResolver").field("cached", &self.cache.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use std::collections::HashMap;
	use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

	use civiroll_types::directory_adapter::CreateUserData;
	use civiroll_types::rbac::{Permission, Role, UserRecord};

	/// In-memory directory with a switchable outage flag
	#[derive(Debug, Default)]
	struct MemoryDirectory {
		users: HashMap<Box<str>, UserRecord>,
		roles: HashMap<i64, Role>,
		role_permissions: HashMap<i64, Vec<Permission>>,
		outage: AtomicBool,
		reads: AtomicU32,
	}

	impl MemoryDirectory {
		fn check_outage(&self) -> CvResult<()> {
			if self.outage.load(Ordering::Relaxed) { Err(Error::DbError) } else { Ok(()) }
		}
	}

	#[async_trait]
	impl DirectoryAdapter for MemoryDirectory {
		async fn read_user(&self, user_id: &str) -> CvResult<UserRecord> {
			self.check_outage()?;
			self.reads.fetch_add(1, Ordering::Relaxed);
			self.users.get(user_id).cloned().ok_or(Error::NotFound)
		}

		async fn read_user_by_auth_id(&self, auth_id: &str) -> CvResult<UserRecord> {
			self.check_outage()?;
			self.users
				.values()
				.find(|u| u.auth_id.as_ref() == auth_id)
				.cloned()
				.ok_or(Error::NotFound)
		}

		async fn create_user(&self, _data: CreateUserData<'_>) -> CvResult<UserRecord> {
			Err(Error::Internal("read-only test directory".into()))
		}

		async fn update_user_role(&self, _user_id: &str, _role_id: Option<i64>) -> CvResult<()> {
			Err(Error::Internal("read-only test directory".into()))
		}

		async fn read_role(&self, role_id: i64) -> CvResult<Role> {
			self.check_outage()?;
			self.roles.get(&role_id).cloned().ok_or(Error::NotFound)
		}

		async fn read_role_by_code(&self, code: &str) -> CvResult<Role> {
			self.check_outage()?;
			self.roles.values().find(|r| r.code.as_ref() == code).cloned().ok_or(Error::NotFound)
		}

		async fn list_roles(&self) -> CvResult<Vec<Role>> {
			self.check_outage()?;
			Ok(self.roles.values().cloned().collect())
		}

		async fn list_permissions(&self) -> CvResult<Vec<Permission>> {
			self.check_outage()?;
			Ok(self.role_permissions.values().flatten().cloned().collect())
		}

		async fn read_role_permissions(&self, role_id: i64) -> CvResult<Vec<Permission>> {
			self.check_outage()?;
			Ok(self.role_permissions.get(&role_id).cloned().unwrap_or_default())
		}
	}

	fn permission(perm_id: i64, module: &str, action: &str) -> Permission {
		Permission {
			perm_id,
			module: module.into(),
			action: action.into(),
			is_sensitive: false,
			requires_mfa: false,
		}
	}

	fn directory() -> MemoryDirectory {
		let mut dir = MemoryDirectory::default();
		dir.roles.insert(
			3,
			Role {
				role_id: 3,
				name: "Operator".into(),
				code: "operator".into(),
				level: 3,
				is_system_role: false,
				is_active: true,
			},
		);
		dir.roles.insert(
			4,
			Role {
				role_id: 4,
				name: "Retired".into(),
				code: "retired".into(),
				level: 3,
				is_system_role: false,
				is_active: false,
			},
		);
		dir.role_permissions
			.insert(3, vec![permission(1, "voters", "view"), permission(2, "export", "view")]);
		dir.users.insert(
			"u42".into(),
			UserRecord {
				user_id: "u42".into(),
				auth_id: "auth-u42".into(),
				role_id: Some(3),
				clearance_level: 2,
				status: "A".into(),
			},
		);
		dir.users.insert(
			"roleless".into(),
			UserRecord {
				user_id: "roleless".into(),
				auth_id: "auth-roleless".into(),
				role_id: None,
				clearance_level: 0,
				status: "A".into(),
			},
		);
		dir.users.insert(
			"retiree".into(),
			UserRecord {
				user_id: "retiree".into(),
				auth_id: "auth-retiree".into(),
				role_id: Some(4),
				clearance_level: 0,
				status: "A".into(),
			},
		);
		dir
	}

	fn resolver(dir: MemoryDirectory) -> PermissionResolver {
		PermissionResolver::new(Arc::new(dir), Arc::new(PermissionCache::default()))
	}

	#[tokio::test]
	async fn test_resolution_joins_role_and_permissions() {
		let resolver = resolver(directory());

		let tuple = resolver.user_permissions("u42").await.unwrap();
		assert_eq!(tuple.role_name.as_ref(), "Operator");
		assert_eq!(tuple.role_level, 3);
		assert!(tuple.permissions.contains("voters.view"));
		assert!(tuple.permissions.contains("export.view"));
		assert_eq!(tuple.permissions.len(), 2);
	}

	#[tokio::test]
	async fn test_second_resolution_is_served_from_cache() {
		let dir = Arc::new(directory());
		let resolver =
			PermissionResolver::new(dir.clone(), Arc::new(PermissionCache::default()));

		resolver.user_permissions("u42").await.unwrap();
		resolver.user_permissions("u42").await.unwrap();

		// Only the first call hit the directory
		assert_eq!(dir.reads.load(Ordering::Relaxed), 1);
	}

	#[tokio::test]
	async fn test_unknown_user_is_not_found() {
		let resolver = resolver(directory());
		assert!(matches!(resolver.user_permissions("nobody").await, Err(Error::NotFound)));
	}

	#[tokio::test]
	async fn test_roleless_user_resolves_to_no_permissions() {
		let resolver = resolver(directory());
		assert!(matches!(resolver.user_permissions("roleless").await, Err(Error::NotFound)));
	}

	#[tokio::test]
	async fn test_inactive_role_resolves_to_no_permissions() {
		let resolver = resolver(directory());
		assert!(matches!(resolver.user_permissions("retiree").await, Err(Error::NotFound)));
	}

	#[tokio::test]
	async fn test_backend_outage_is_not_conflated_with_not_found() {
		let dir = directory();
		dir.outage.store(true, Ordering::Relaxed);
		let resolver = resolver(dir);

		assert!(matches!(resolver.user_permissions("u42").await, Err(Error::DbError)));
	}

	#[tokio::test]
	async fn test_failed_resolution_is_not_cached() {
		let dir = directory();
		dir.outage.store(true, Ordering::Relaxed);
		let resolver = resolver(dir);

		let _ = resolver.user_permissions("u42").await;
		assert!(resolver.cache().is_empty());
	}

	#[tokio::test]
	async fn test_clear_permissions_cache_single_and_all() {
		let resolver = resolver(directory());

		resolver.user_permissions("u42").await.unwrap();
		assert_eq!(resolver.cache().len(), 1);

		resolver.clear_permissions_cache(Some("u42"));
		assert!(resolver.cache().is_empty());

		resolver.user_permissions("u42").await.unwrap();
		resolver.clear_permissions_cache(None);
		assert!(resolver.cache().is_empty());
	}
}

// vim: ts=4
