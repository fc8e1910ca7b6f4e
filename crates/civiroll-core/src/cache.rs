//! Permission tuple cache
//!
//! Provides in-memory, time-bounded caching of resolved permission tuples
//! so that repeated access checks within a short window do not hit the
//! directory backend.

use lru::LruCache;
use std::num::NonZeroUsize;

use crate::prelude::*;
use civiroll_types::rbac::UserPermissions;

/// Limits memory for cached tuples (one entry per active user)
const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Fixed TTL for cached permission tuples.
///
/// A role change committed before this elapses is invisible to cached
/// readers unless the entry is explicitly invalidated - role mutations in
/// this codebase go through `PermissionResolver::clear_permissions_cache`.
pub const PERMISSIONS_TTL_SECS: i64 = 5 * 60; // 5 minutes

/// Entry in the permission cache
#[derive(Debug, Clone)]
struct CacheEntry {
	tuple: UserPermissions,
	/// Absolute expiry (stored_at + TTL)
	expires_at: Timestamp,
}

impl CacheEntry {
	fn is_expired(&self) -> bool {
		Timestamp::now() >= self.expires_at
	}
}

/// TTL-bounded cache of resolved permission tuples, keyed by user id.
///
/// This is an explicit, injectable object rather than module-level state;
/// whatever composes the resolver owns it, which keeps tests isolated.
/// Writers are idempotent (resolution is deterministic given the same
/// backend state), so a plain RwLock around the map is sufficient.
pub struct PermissionCache {
	entries: parking_lot::RwLock<LruCache<Box<str>, CacheEntry>>,
	ttl_secs: i64,
}

impl PermissionCache {
	/// Create a cache with the given capacity and TTL
	pub fn new(max_entries: usize, ttl_secs: i64) -> Self {
		let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);

		Self { entries: parking_lot::RwLock::new(LruCache::new(capacity)), ttl_secs }
	}

	/// Get the cached tuple for a user, honoring the TTL.
	///
	/// Returns `None` on a miss or when the entry has expired; expired
	/// entries are dropped eagerly so they cannot pin the LRU slot.
	pub fn get(&self, user_id: &str) -> Option<UserPermissions> {
		let mut entries = self.entries.write();

		if let Some(entry) = entries.get(user_id) {
			if entry.is_expired() {
				entries.pop(user_id);
				None
			} else {
				Some(entry.tuple.clone())
			}
		} else {
			None
		}
	}

	/// Store a resolved tuple with expiry `now + TTL`
	pub fn set(&self, tuple: UserPermissions) {
		let entry =
			CacheEntry { expires_at: Timestamp::now().add_seconds(self.ttl_secs), tuple };

		debug!(user = %entry.tuple.user_id, role = %entry.tuple.role_name, "Caching permission tuple");

		let mut entries = self.entries.write();
		entries.put(entry.tuple.user_id.clone(), entry);
	}

	/// Remove a single user's entry; takes effect for the very next `get`
	pub fn invalidate(&self, user_id: &str) {
		let mut entries = self.entries.write();
		entries.pop(user_id);
	}

	/// Clear the whole cache; takes effect for the very next `get`
	pub fn invalidate_all(&self) {
		self.entries.write().clear();
	}

	/// Get the current number of entries in the cache
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Check if the cache is empty
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl Default for PermissionCache {
	fn default() -> Self {
		Self::new(DEFAULT_CACHE_CAPACITY, PERMISSIONS_TTL_SECS)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	fn tuple(user_id: &str) -> UserPermissions {
		UserPermissions {
			user_id: user_id.into(),
			role_id: 3,
			role_name: "Operator".into(),
			role_level: 3,
			permissions: HashSet::from(["voters.view".into()]),
		}
	}

	#[test]
	fn test_cache_round_trip() {
		let cache = PermissionCache::default();
		assert!(cache.is_empty());
		assert!(cache.get("u1").is_none());

		cache.set(tuple("u1"));
		let got = cache.get("u1");
		assert!(got.is_some());
		assert_eq!(got.unwrap().role_name.as_ref(), "Operator");
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn test_expired_entry_is_a_miss() {
		// Zero TTL: expires_at == now, and `now >= expires_at` is expired
		let cache = PermissionCache::new(10, 0);
		cache.set(tuple("u1"));
		assert!(cache.get("u1").is_none());
		// The expired entry is dropped, not just skipped
		assert!(cache.is_empty());
	}

	#[test]
	fn test_invalidate_single_entry() {
		let cache = PermissionCache::default();
		cache.set(tuple("u1"));
		cache.set(tuple("u2"));

		cache.invalidate("u1");
		assert!(cache.get("u1").is_none());
		assert!(cache.get("u2").is_some());
	}

	#[test]
	fn test_invalidate_all() {
		let cache = PermissionCache::default();
		cache.set(tuple("u1"));
		cache.set(tuple("u2"));

		cache.invalidate_all();
		assert!(cache.is_empty());
		assert!(cache.get("u2").is_none());
	}

	#[test]
	fn test_set_overwrites_existing_entry() {
		let cache = PermissionCache::default();
		cache.set(tuple("u1"));

		let mut updated = tuple("u1");
		updated.role_name = "Supervisor".into();
		updated.role_level = 5;
		cache.set(updated);

		let got = cache.get("u1").unwrap();
		assert_eq!(got.role_level, 5);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn test_lru_eviction_respects_capacity() {
		let cache = PermissionCache::new(2, PERMISSIONS_TTL_SECS);
		cache.set(tuple("u1"));
		cache.set(tuple("u2"));
		cache.set(tuple("u3"));

		assert_eq!(cache.len(), 2);
		assert!(cache.get("u1").is_none());
		assert!(cache.get("u3").is_some());
	}
}

// vim: ts=4
