//! Guard boundary for protected pages
//!
//! Two layers live here. `Guard` is the state machine
//! (`Checking → {Allowed, Denied, Redirect}`) used by long-lived callers
//! that re-check on identity or path changes; each checking episode gets a
//! generation number so a superseded resolution can never commit a stale
//! decision. The middleware factories below it are the per-request HTTP
//! rendition used by the route table.
//!
//! Failure semantics: every resolver failure lands in `Denied` (fail
//! closed). Backend outages are marked retryable but are never allowed.

use axum::{
	Json,
	extract::{Request, State},
	http::StatusCode,
	middleware::Next,
	response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::decision;
use crate::extract::{Auth, OptionalAuth};
use crate::pages::PageAccessPolicy;
use crate::prelude::*;
use crate::resolver::PermissionResolver;
use civiroll_types::rbac::UserPermissions;

/// Guard decision states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
	/// A decision is pending; protected content must not render
	Checking,
	Allowed,
	/// Denied carries the resolved role name (when resolution succeeded)
	/// and whether a retry could change the outcome (backend outage)
	Denied { role_name: Option<Box<str>>, retryable: bool },
	/// No authenticated identity; redirect to login carrying the original path
	Redirect { to: Box<str> },
}

/// Explicit requirements supplied by a caller on top of the page policy
#[derive(Debug, Clone, Default)]
pub struct GuardRequirements {
	/// ANY of these satisfies the gate
	pub required_permissions: Option<Vec<Box<str>>>,
	pub min_level: Option<i32>,
}

/// Handle for one checking episode; a newer `begin` supersedes it
#[derive(Debug, Clone, Copy)]
pub struct GuardEpisode(u64);

fn login_redirect(login_path: &str, next_path: &str) -> Box<str> {
	// The original path goes into a query value; encode it so '?' or '&'
	// in the path cannot split the query string
	let next: String = url::form_urlencoded::byte_serialize(next_path.as_bytes()).collect();
	format!("{}?next={}", login_path, next).into()
}

/// Re-checkable guard over one identity/path pair.
///
/// `begin` enters `Checking` (or `Redirect` straight away when there is no
/// identity) and returns the episode handle; `check` resolves permissions
/// and commits exactly one decision for that episode. Calling `begin`
/// again invalidates any in-flight `check`.
pub struct Guard {
	resolver: Arc<PermissionResolver>,
	policy: Arc<PageAccessPolicy>,
	login_path: Box<str>,
	generation: AtomicU64,
	state: parking_lot::RwLock<GuardState>,
}

impl Guard {
	pub fn new(resolver: Arc<PermissionResolver>, policy: Arc<PageAccessPolicy>) -> Self {
		Self {
			resolver,
			policy,
			login_path: "/login".into(),
			generation: AtomicU64::new(0),
			state: parking_lot::RwLock::new(GuardState::Checking),
		}
	}

	pub fn with_login_path(mut self, login_path: &str) -> Self {
		self.login_path = login_path.into();
		self
	}

	pub fn state(&self) -> GuardState {
		self.state.read().clone()
	}

	/// Enter a new checking episode for an identity/path pair.
	///
	/// Without an identity the guard lands in `Redirect` immediately, before
	/// any permission resolution, and no episode is handed out.
	pub fn begin(&self, identity: Option<&str>, path: &str) -> Option<GuardEpisode> {
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

		match identity {
			None => {
				*self.state.write() =
					GuardState::Redirect { to: login_redirect(&self.login_path, path) };
				None
			}
			Some(_) => {
				*self.state.write() = GuardState::Checking;
				Some(GuardEpisode(generation))
			}
		}
	}

	/// Resolve permissions and commit the decision for this episode.
	///
	/// Returns the guard's current state, which belongs to a newer episode
	/// when this one has been superseded in the meantime.
	pub async fn check(
		&self,
		episode: GuardEpisode,
		user_id: &str,
		path: &str,
		reqs: &GuardRequirements,
	) -> GuardState {
		let decision = match self.resolver.user_permissions(user_id).await {
			Ok(tuple) => self.decide(&tuple, path, reqs),
			Err(Error::DbError) => {
				warn!(user = user_id, path = path, "Guard check failed: directory outage");
				GuardState::Denied { role_name: None, retryable: true }
			}
			Err(_) => GuardState::Denied { role_name: None, retryable: false },
		};

		self.commit(episode, decision);
		self.state()
	}

	fn decide(&self, tuple: &UserPermissions, path: &str, reqs: &GuardRequirements) -> GuardState {
		let t = Some(tuple);

		let page_ok = decision::can_access_page(t, &self.policy, path);
		let level_ok = reqs.min_level.is_none_or(|level| tuple.role_level >= level);
		let perms_ok = reqs
			.required_permissions
			.as_deref()
			.is_none_or(|perms| decision::has_any_permission(t, perms));

		if page_ok && level_ok && perms_ok {
			GuardState::Allowed
		} else {
			debug!(
				user = %tuple.user_id,
				role = %tuple.role_name,
				path = path,
				page_ok,
				level_ok,
				perms_ok,
				"Guard denied"
			);
			GuardState::Denied { role_name: Some(tuple.role_name.clone()), retryable: false }
		}
	}

	/// Commit a decision unless the episode has been superseded
	fn commit(&self, episode: GuardEpisode, state: GuardState) -> bool {
		let mut current = self.state.write();
		if self.generation.load(Ordering::SeqCst) == episode.0 {
			*current = state;
			true
		} else {
			false
		}
	}
}

// HTTP middleware //
//*****************//

pub type GuardCheckOutput = Pin<Box<dyn Future<Output = Result<Response, Error>> + Send>>;

/// Middleware factory gating a route behind the page access policy.
///
/// Unauthenticated requests are redirected to the login entry point with
/// the original path attached; everything else fails closed into the 403
/// denial payload.
pub fn require_page_access(
	page_path: &'static str,
) -> impl Fn(State<App>, OptionalAuth, Request, Next) -> GuardCheckOutput + Clone {
	move |state, auth, req, next| Box::pin(check_page_access(state, auth, req, next, page_path))
}

/// Middleware factory requiring ANY of the given permissions
pub fn require_permissions(
	permissions: &'static [&'static str],
) -> impl Fn(State<App>, Auth, Request, Next) -> GuardCheckOutput + Clone {
	move |state, auth, req, next| {
		Box::pin(check_required_permissions(state, auth, req, next, permissions))
	}
}

/// Middleware factory requiring a minimum role level
pub fn require_min_level(
	min_level: i32,
) -> impl Fn(State<App>, Auth, Request, Next) -> GuardCheckOutput + Clone {
	move |state, auth, req, next| Box::pin(check_min_level(state, auth, req, next, min_level))
}

async fn check_page_access(
	State(app): State<App>,
	OptionalAuth(user): OptionalAuth,
	req: Request,
	next: Next,
	page_path: &'static str,
) -> Result<Response, Error> {
	let Some(user) = user else {
		return Ok(Redirect::to(&login_redirect(&app.opts.login_path, page_path)).into_response());
	};

	match app.resolver.user_permissions(&user.user_id).await {
		Ok(tuple) if decision::can_access_page(Some(&tuple), &app.pages, page_path) => {
			Ok(next.run(req).await)
		}
		Ok(tuple) => {
			warn!(
				subject = %user.user_id,
				role = %tuple.role_name,
				page = page_path,
				"Page access denied"
			);
			Ok(denied_response(&app, Some(&tuple.role_name), false))
		}
		Err(Error::DbError) => {
			warn!(subject = %user.user_id, page = page_path, "Page access denied: directory outage");
			Ok(denied_response(&app, None, true))
		}
		Err(_) => Ok(denied_response(&app, None, false)),
	}
}

async fn check_required_permissions(
	State(app): State<App>,
	Auth(user): Auth,
	req: Request,
	next: Next,
	permissions: &'static [&'static str],
) -> Result<Response, Error> {
	match app.resolver.user_permissions(&user.user_id).await {
		Ok(tuple) if decision::has_any_permission(Some(&tuple), permissions) => {
			Ok(next.run(req).await)
		}
		Ok(tuple) => {
			warn!(
				subject = %user.user_id,
				role = %tuple.role_name,
				required = ?permissions,
				"Permission denied"
			);
			Ok(denied_response(&app, Some(&tuple.role_name), false))
		}
		Err(Error::DbError) => Ok(denied_response(&app, None, true)),
		Err(_) => Ok(denied_response(&app, None, false)),
	}
}

async fn check_min_level(
	State(app): State<App>,
	Auth(user): Auth,
	req: Request,
	next: Next,
	min_level: i32,
) -> Result<Response, Error> {
	match app.resolver.user_permissions(&user.user_id).await {
		Ok(tuple) if tuple.role_level >= min_level => Ok(next.run(req).await),
		Ok(tuple) => {
			warn!(
				subject = %user.user_id,
				role = %tuple.role_name,
				level = tuple.role_level,
				required = min_level,
				"Role level too low"
			);
			Ok(denied_response(&app, Some(&tuple.role_name), false))
		}
		Err(Error::DbError) => Ok(denied_response(&app, None, true)),
		Err(_) => Ok(denied_response(&app, None, false)),
	}
}

/// Fixed denial payload: names the resolved role, offers navigation back
/// or to the default landing page, and never carries backend error text.
fn denied_response(app: &App, role_name: Option<&str>, retryable: bool) -> Response {
	(
		StatusCode::FORBIDDEN,
		Json(json!({
			"error": "accessDenied",
			"role": role_name,
			"retryable": retryable,
			"back": true,
			"home": app.opts.landing_path,
		})),
	)
		.into_response()
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use std::sync::atomic::AtomicBool;

	use crate::cache::PermissionCache;
	use civiroll_types::directory_adapter::{CreateUserData, DirectoryAdapter};
	use civiroll_types::rbac::{Permission, Role, UserRecord};

	/// Single-user stub directory with a switchable outage flag
	#[derive(Debug, Default)]
	struct StubDirectory {
		outage: AtomicBool,
	}

	#[async_trait]
	impl DirectoryAdapter for StubDirectory {
		async fn read_user(&self, user_id: &str) -> CvResult<UserRecord> {
			if self.outage.load(Ordering::Relaxed) {
				return Err(Error::DbError);
			}
			match user_id {
				"u42" => Ok(UserRecord {
					user_id: "u42".into(),
					auth_id: "auth-u42".into(),
					role_id: Some(5),
					clearance_level: 2,
					status: "A".into(),
				}),
				_ => Err(Error::NotFound),
			}
		}

		async fn read_user_by_auth_id(&self, _auth_id: &str) -> CvResult<UserRecord> {
			Err(Error::NotFound)
		}

		async fn create_user(&self, _data: CreateUserData<'_>) -> CvResult<UserRecord> {
			Err(Error::Internal("stub".into()))
		}

		async fn update_user_role(&self, _user_id: &str, _role_id: Option<i64>) -> CvResult<()> {
			Err(Error::Internal("stub".into()))
		}

		async fn read_role(&self, role_id: i64) -> CvResult<Role> {
			if self.outage.load(Ordering::Relaxed) {
				return Err(Error::DbError);
			}
			if role_id != 5 {
				return Err(Error::NotFound);
			}
			Ok(Role {
				role_id: 5,
				name: "Supervisor".into(),
				code: "supervisor".into(),
				level: 5,
				is_system_role: false,
				is_active: true,
			})
		}

		async fn read_role_by_code(&self, _code: &str) -> CvResult<Role> {
			Err(Error::NotFound)
		}

		async fn list_roles(&self) -> CvResult<Vec<Role>> {
			Ok(vec![])
		}

		async fn list_permissions(&self) -> CvResult<Vec<Permission>> {
			Ok(vec![])
		}

		async fn read_role_permissions(&self, _role_id: i64) -> CvResult<Vec<Permission>> {
			Ok(vec![Permission {
				perm_id: 1,
				module: "export".into(),
				action: "view".into(),
				is_sensitive: false,
				requires_mfa: false,
			}])
		}
	}

	fn guard(outage: bool) -> Guard {
		let dir = StubDirectory::default();
		dir.outage.store(outage, Ordering::Relaxed);
		let resolver = Arc::new(PermissionResolver::new(
			Arc::new(dir),
			Arc::new(PermissionCache::default()),
		));
		Guard::new(resolver, Arc::new(PageAccessPolicy::admin_defaults()))
	}

	#[test]
	fn test_unauthenticated_redirects_before_resolution() {
		let guard = guard(false);

		let episode = guard.begin(None, "/admin/exports");
		assert!(episode.is_none());
		assert_eq!(
			guard.state(),
			GuardState::Redirect { to: "/login?next=%2Fadmin%2Fexports".into() }
		);
	}

	#[test]
	fn test_redirect_encodes_query_metacharacters() {
		let guard = guard(false);

		guard.begin(None, "/admin/voters?page=2&sort=name");
		assert_eq!(
			guard.state(),
			GuardState::Redirect {
				to: "/login?next=%2Fadmin%2Fvoters%3Fpage%3D2%26sort%3Dname".into()
			}
		);
	}

	#[tokio::test]
	async fn test_allowed_flow() {
		let guard = guard(false);

		let episode = guard.begin(Some("u42"), "/admin/exports").unwrap();
		assert_eq!(guard.state(), GuardState::Checking);

		let state = guard.check(episode, "u42", "/admin/exports", &GuardRequirements::default())
			.await;
		assert_eq!(state, GuardState::Allowed);
	}

	#[tokio::test]
	async fn test_denied_names_resolved_role() {
		let guard = guard(false);

		let episode = guard.begin(Some("u42"), "/admin/permissions").unwrap();
		let state = guard
			.check(episode, "u42", "/admin/permissions", &GuardRequirements::default())
			.await;

		assert_eq!(
			state,
			GuardState::Denied { role_name: Some("Supervisor".into()), retryable: false }
		);
	}

	#[tokio::test]
	async fn test_explicit_requirements_are_additional_gates() {
		let guard = guard(false);

		// Page gate passes but the explicit min level does not
		let episode = guard.begin(Some("u42"), "/admin/exports").unwrap();
		let reqs = GuardRequirements { min_level: Some(9), ..Default::default() };
		let state = guard.check(episode, "u42", "/admin/exports", &reqs).await;
		assert!(matches!(state, GuardState::Denied { .. }));

		// Satisfied explicit permission list keeps the allow
		let episode = guard.begin(Some("u42"), "/admin/exports").unwrap();
		let reqs = GuardRequirements {
			required_permissions: Some(vec!["export.view".into()]),
			..Default::default()
		};
		let state = guard.check(episode, "u42", "/admin/exports", &reqs).await;
		assert_eq!(state, GuardState::Allowed);
	}

	#[tokio::test]
	async fn test_resolver_failure_lands_in_denied_never_allowed() {
		let guard = guard(true);

		let episode = guard.begin(Some("u42"), "/admin/exports").unwrap();
		let state =
			guard.check(episode, "u42", "/admin/exports", &GuardRequirements::default()).await;

		assert_eq!(state, GuardState::Denied { role_name: None, retryable: true });
	}

	#[tokio::test]
	async fn test_unknown_user_is_denied_without_retry() {
		let guard = guard(false);

		let episode = guard.begin(Some("ghost"), "/admin").unwrap();
		let state = guard.check(episode, "ghost", "/admin", &GuardRequirements::default()).await;

		assert_eq!(state, GuardState::Denied { role_name: None, retryable: false });
	}

	#[tokio::test]
	async fn test_superseded_episode_cannot_commit() {
		let guard = guard(false);

		let stale = guard.begin(Some("u42"), "/admin/exports").unwrap();
		// Navigation happened while the first check was in flight
		let _fresh = guard.begin(Some("u42"), "/admin/permissions").unwrap();

		let state =
			guard.check(stale, "u42", "/admin/exports", &GuardRequirements::default()).await;

		// The stale allow was discarded; the fresh episode is still checking
		assert_eq!(state, GuardState::Checking);
		assert_eq!(guard.state(), GuardState::Checking);
	}

	#[tokio::test]
	async fn test_reentry_after_decision() {
		let guard = guard(false);

		let episode = guard.begin(Some("u42"), "/admin/exports").unwrap();
		guard.check(episode, "u42", "/admin/exports", &GuardRequirements::default()).await;
		assert_eq!(guard.state(), GuardState::Allowed);

		// Identity change re-enters Checking
		guard.begin(Some("someone-else"), "/admin/exports");
		assert_eq!(guard.state(), GuardState::Checking);
	}
}

// vim: ts=4
