//! Session lifecycle orchestration on top of the identity backend.

pub mod common;
pub mod refresh;
pub mod session;
pub mod sign_in;

pub use common::*;
pub use refresh::*;

// self
#[cfg(feature = "reqwest")]
use crate::identity::{IdentityEndpoints, ReqwestIdentityService};
use crate::{
	_prelude::*,
	auth::{ExpiryDecoder, JwtExpiryDecoder},
	identity::IdentityService,
	store::SessionStore,
};

#[cfg(feature = "reqwest")]
/// Controller specialized for the crate's default reqwest identity client.
pub type ReqwestSessionController = SessionController<ReqwestIdentityService>;

/// Owns every session record and the decision of when to refresh it.
///
/// The controller is the only writer of [`SessionToken`](crate::auth::SessionToken) records:
/// sign-in creates them, evaluation rotates or fails them, and sign-out removes them. The
/// refresh coordinator is held behind an `Arc` so several controllers (or several request
/// handlers cloning one controller) share a single de-duplication map per process.
#[derive(Clone)]
pub struct SessionController<S>
where
	S: ?Sized + IdentityService,
{
	/// Identity backend used for login and registration.
	pub identity: Arc<S>,
	/// Store that persists session records for the surrounding session framework.
	pub store: Arc<dyn SessionStore>,
	/// Shared refresh de-duplication and result cache.
	pub coordinator: Arc<RefreshCoordinator<S>>,
	/// Reads access-token expiry claims.
	pub decoder: Arc<dyn ExpiryDecoder>,
	/// Timing policy for refresh decisions.
	pub policy: SessionPolicy,
}
impl<S> SessionController<S>
where
	S: ?Sized + IdentityService,
{
	/// Creates a controller with its own coordinator and the default policy.
	pub fn new(identity: Arc<S>, store: Arc<dyn SessionStore>) -> Self {
		let coordinator = Arc::new(RefreshCoordinator::new(identity.clone()));

		Self {
			identity,
			store,
			coordinator,
			decoder: Arc::new(JwtExpiryDecoder),
			policy: SessionPolicy::default(),
		}
	}

	/// Replaces the policy and rebuilds the coordinator with its TTL and timeout.
	///
	/// Call before [`SessionController::with_coordinator`] when sharing a coordinator.
	pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
		let coordinator = RefreshCoordinator::new(self.identity.clone())
			.with_cache_ttl(policy.refresh_cache_ttl)
			.with_timeout(policy.refresh_timeout);

		self.coordinator = Arc::new(coordinator);
		self.policy = policy;

		self
	}

	/// Shares an existing coordinator, typically the single per-process instance.
	pub fn with_coordinator(mut self, coordinator: Arc<RefreshCoordinator<S>>) -> Self {
		self.coordinator = coordinator;

		self
	}

	/// Overrides the access-token expiry decoder.
	pub fn with_decoder(mut self, decoder: impl 'static + ExpiryDecoder) -> Self {
		self.decoder = Arc::new(decoder);

		self
	}
}
#[cfg(feature = "reqwest")]
impl SessionController<ReqwestIdentityService> {
	/// Creates a controller that talks to the identity backend rooted at `base`.
	pub fn from_base_url(base: &Url, store: Arc<dyn SessionStore>) -> Result<Self> {
		let endpoints = IdentityEndpoints::from_base(base)?;

		Ok(Self::new(Arc::new(ReqwestIdentityService::new(endpoints)?), store))
	}
}
impl<S> Debug for SessionController<S>
where
	S: ?Sized + IdentityService,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionController")
			.field("coordinator", &self.coordinator)
			.field("policy", &self.policy)
			.finish()
	}
}
