//! RBAC core for the Civiroll platform.
//!
//! Resolution of a user identity into a {role, level, permission-set}
//! tuple, a TTL-bounded cache of those tuples, the pure access-decision
//! functions, and the guard boundary that enforces decisions at the HTTP
//! layer. Everything here is backend-agnostic: persistence goes through
//! the `DirectoryAdapter` trait from `civiroll-types`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cache;
pub mod decision;
pub mod extract;
pub mod guard;
pub mod pages;
pub mod prelude;
pub mod resolver;
pub mod session;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState};
pub use cache::{PERMISSIONS_TTL_SECS, PermissionCache};
pub use extract::{Auth, OptionalAuth};
pub use guard::{Guard, GuardState};
pub use pages::{PageAccessPolicy, PageRequirement};
pub use resolver::PermissionResolver;

// vim: ts=4
