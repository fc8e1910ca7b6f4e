//! RBAC domain types shared between the core, the adapters, and the server.
//!
//! A user has exactly one role; a role carries an integer level and a set of
//! grantable permissions. Permissions are identified by the pair
//! `(module, action)`, serialized as `"module.action"`.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashSet;

/// Role level at or above which every permission check short-circuits to allow
pub const SUPER_ADMIN_LEVEL: i32 = 10;

/// Build the canonical `"module.action"` permission key.
///
/// Lowercase, single `.` separator, no whitespace.
pub fn permission_key(module: &str, action: &str) -> Box<str> {
	format!("{}.{}", module.trim().to_lowercase(), action.trim().to_lowercase()).into()
}

/// A role row from the directory
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
	pub role_id: i64,
	pub name: Box<str>,
	/// Stable machine identifier (e.g., "supervisor")
	pub code: Box<str>,
	/// Higher level means more privileged; levels totally order the roles
	pub level: i32,
	pub is_system_role: bool,
	pub is_active: bool,
}

/// A grantable capability row from the directory
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
	pub perm_id: i64,
	pub module: Box<str>,
	pub action: Box<str>,
	pub is_sensitive: bool,
	pub requires_mfa: bool,
}

impl Permission {
	/// Canonical `"module.action"` identity of this permission
	pub fn key(&self) -> Box<str> {
		permission_key(&self.module, &self.action)
	}
}

/// A user row from the directory.
///
/// `auth_id` is the external identity (the hosted auth provider's subject);
/// `user_id` is the directory's own key. `clearance_level` is a separate
/// vetting attribute and is not consulted by the decision engine.
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
	pub user_id: Box<str>,
	pub auth_id: Box<str>,
	/// A user without a role resolves to "no permissions", not to an error
	pub role_id: Option<i64>,
	pub clearance_level: i32,
	/// 'A' active, 'S' suspended
	pub status: Box<str>,
}

/// Resolved and cacheable permission tuple for one user.
///
/// Derived from the User→Role→RolePermission→Permission join; its lifetime
/// is bounded by the permission cache TTL unless explicitly invalidated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissions {
	pub user_id: Box<str>,
	pub role_id: i64,
	pub role_name: Box<str>,
	pub role_level: i32,
	pub permissions: HashSet<Box<str>>,
}

impl UserPermissions {
	/// Level ≥ 10 bypasses individual permission membership checks
	pub fn is_super_admin(&self) -> bool {
		self.role_level >= SUPER_ADMIN_LEVEL
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_permission_key_canonical_form() {
		assert_eq!(permission_key("Voters", "View").as_ref(), "voters.view");
		assert_eq!(permission_key(" export ", "GENERATE").as_ref(), "export.generate");
	}

	#[test]
	fn test_permission_key_matches_row_key() {
		let perm = Permission {
			perm_id: 1,
			module: "admin_permissions".into(),
			action: "view".into(),
			is_sensitive: true,
			requires_mfa: false,
		};
		assert_eq!(perm.key().as_ref(), "admin_permissions.view");
	}

	#[test]
	fn test_super_admin_threshold() {
		let mut tuple = UserPermissions {
			user_id: "u1".into(),
			role_id: 1,
			role_name: "Administrator".into(),
			role_level: 9,
			permissions: HashSet::new(),
		};
		assert!(!tuple.is_super_admin());
		tuple.role_level = 10;
		assert!(tuple.is_super_admin());
		tuple.role_level = 99;
		assert!(tuple.is_super_admin());
	}
}

// vim: ts=4
