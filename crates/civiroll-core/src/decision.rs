//! Access decision engine
//!
//! Pure, total functions from a resolved permission tuple to ALLOW/DENY.
//! No I/O happens here: callers resolve the tuple first (or fail to, in
//! which case `None` denies everything) and these functions only evaluate
//! set membership and level thresholds.

use civiroll_types::rbac::{SUPER_ADMIN_LEVEL, UserPermissions};

use crate::pages::PageAccessPolicy;

/// Check a single `"module.action"` permission.
///
/// Super admins (level ≥ 10) are allowed regardless of the permission set.
pub fn has_permission(tuple: Option<&UserPermissions>, permission: &str) -> bool {
	match tuple {
		None => false,
		Some(t) => t.role_level >= SUPER_ADMIN_LEVEL || t.permissions.contains(permission),
	}
}

/// Check that at least one of the given permissions is granted (logical OR).
///
/// An empty list denies: there is nothing that could be satisfied.
pub fn has_any_permission<S: AsRef<str>>(
	tuple: Option<&UserPermissions>,
	permissions: &[S],
) -> bool {
	match tuple {
		None => false,
		Some(t) => {
			t.role_level >= SUPER_ADMIN_LEVEL
				|| permissions.iter().any(|p| t.permissions.contains(p.as_ref()))
		}
	}
}

/// Check that every one of the given permissions is granted (logical AND).
///
/// An empty list allows vacuously: every element of the empty set
/// satisfies the predicate. Callers rely on this to mean "no explicit
/// permission gate".
pub fn has_all_permissions<S: AsRef<str>>(
	tuple: Option<&UserPermissions>,
	permissions: &[S],
) -> bool {
	match tuple {
		None => false,
		Some(t) => {
			t.role_level >= SUPER_ADMIN_LEVEL
				|| permissions.iter().all(|p| t.permissions.contains(p.as_ref()))
		}
	}
}

/// Decide access to a console page.
///
/// Listed pages allow when `role_level >= min_level` OR when any of the
/// page's permission list is granted - the two gates are alternatives,
/// not conjuncts. Unlisted pages fall back to "any role with level ≥ 1".
pub fn can_access_page(
	tuple: Option<&UserPermissions>,
	policy: &PageAccessPolicy,
	path: &str,
) -> bool {
	let Some(t) = tuple else {
		return false;
	};

	match policy.get(path) {
		Some(req) => {
			t.role_level >= req.min_level
				|| has_any_permission(tuple, &req.required_permissions)
		}
		None => t.role_level >= 1,
	}
}


// vim: ts=4
