//! App state type

use std::sync::Arc;

use crate::cache::PermissionCache;
use crate::pages::PageAccessPolicy;
use crate::resolver::PermissionResolver;
use crate::session::DEFAULT_SESSION_TTL_SECS;

use civiroll_types::directory_adapter::DirectoryAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// HS256 secret for session tokens
	pub session_secret: Box<str>,
	pub session_ttl_secs: i64,
	/// Login entry point the guard redirects unauthenticated requests to
	pub login_path: Box<str>,
	/// Default landing page offered on denial
	pub landing_path: Box<str>,
}

impl AppBuilderOpts {
	pub fn new(session_secret: &str) -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			session_secret: session_secret.into(),
			session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
			login_path: "/login".into(),
			landing_path: "/admin".into(),
		}
	}
}

pub struct AppState {
	pub directory: Arc<dyn DirectoryAdapter>,
	pub cache: Arc<PermissionCache>,
	pub resolver: Arc<PermissionResolver>,
	pub pages: Arc<PageAccessPolicy>,
	pub opts: AppBuilderOpts,
}

pub type App = Arc<AppState>;

impl AppState {
	/// Compose the RBAC core around a directory adapter.
	///
	/// The cache is owned here and shared with the resolver; nothing else
	/// holds module-level state.
	pub fn build(
		directory: Arc<dyn DirectoryAdapter>,
		pages: PageAccessPolicy,
		opts: AppBuilderOpts,
	) -> App {
		let cache = Arc::new(PermissionCache::default());
		let resolver = Arc::new(PermissionResolver::new(directory.clone(), cache.clone()));

		Arc::new(AppState { directory, cache, resolver, pages: Arc::new(pages), opts })
	}
}

// vim: ts=4
