//! Static page access requirements
//!
//! Maps a console page path to the minimum role level and/or permission
//! list required to open it. This is configuration, not persisted state:
//! the policy is built as data and handed to the decision engine, so tests
//! and deployments can swap it wholesale.

use std::collections::HashMap;

/// Access requirement for one page
#[derive(Debug, Clone)]
pub struct PageRequirement {
	pub min_level: i32,
	/// Satisfying ANY of these is an alternative to meeting `min_level`
	pub required_permissions: Vec<Box<str>>,
}

/// Path → requirement table.
///
/// Paths absent from the table fall back to "any authenticated role with
/// level ≥ 1 may access". That permissive default mirrors the console's
/// historical behavior and is pinned by tests; tighten it here if product
/// ever decides unlisted pages should deny.
#[derive(Debug, Default)]
pub struct PageAccessPolicy {
	pages: HashMap<Box<str>, PageRequirement>,
}

impl PageAccessPolicy {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a requirement for a page path
	pub fn require(mut self, path: &str, min_level: i32, permissions: &[&str]) -> Self {
		self.pages.insert(
			path.into(),
			PageRequirement {
				min_level,
				required_permissions: permissions.iter().map(|p| (*p).into()).collect(),
			},
		);
		self
	}

	pub fn get(&self, path: &str) -> Option<&PageRequirement> {
		self.pages.get(path)
	}

	pub fn len(&self) -> usize {
		self.pages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pages.is_empty()
	}

	/// Requirement table for the voter-registration admin console
	pub fn admin_defaults() -> Self {
		Self::new()
			.require("/admin", 1, &[])
			.require("/admin/voters", 2, &["voters.view"])
			.require("/admin/devices", 3, &["devices.view"])
			.require("/admin/centers", 3, &["centers.view"])
			.require("/admin/exports", 3, &["export.view"])
			.require("/admin/reports", 4, &["reports.view"])
			.require("/admin/users", 7, &["admin_users.view"])
			.require("/admin/permissions", 9, &["admin_permissions.view"])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_admin_defaults_cover_console_pages() {
		let policy = PageAccessPolicy::admin_defaults();
		assert!(!policy.is_empty());

		let perm_page = policy.get("/admin/permissions").unwrap();
		assert_eq!(perm_page.min_level, 9);
		assert_eq!(perm_page.required_permissions.len(), 1);
		assert_eq!(perm_page.required_permissions[0].as_ref(), "admin_permissions.view");

		let exports = policy.get("/admin/exports").unwrap();
		assert_eq!(exports.min_level, 3);
	}

	#[test]
	fn test_unlisted_path_has_no_requirement() {
		let policy = PageAccessPolicy::admin_defaults();
		assert!(policy.get("/some/unlisted/path").is_none());
	}
}

// vim: ts=4
