//! Refresh-token de-duplication with a short-lived result cache.
//!
//! [`RefreshCoordinator::get_refreshed_tokens`] guarantees at most one backend refresh call
//! in flight per refresh-token value. The first caller starts the call and parks a shared
//! handle in the coordinator's map; every overlapping caller clones that handle and receives
//! the identical outcome. A successful result is served from the map for `cache_ttl` after
//! completion and is then swept by a deferred task. A failed result is removed immediately so
//! the next attempt starts clean. Entries are keyed by [`TokenSecret::fingerprint`], never by
//! the raw token.
//!
//! Inside a tokio runtime a started call is also driven by a spawned task, so it settles even
//! when every caller gives up early. Outside a runtime the call is driven by its awaiters only
//! and runs without the timeout bound.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::sync::{
	Weak,
	atomic::{AtomicU64, Ordering},
};
// crates.io
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	identity::IdentityService,
	obs::{self, RefreshDecision},
};

/// Default lifetime of a completed refresh result.
pub const DEFAULT_CACHE_TTL: StdDuration = StdDuration::from_millis(3_000);
/// Default bound on a single backend refresh call.
pub const DEFAULT_REFRESH_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Outcome of a failed refresh, shared verbatim with every awaiting caller.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// The backend refused the refresh token (expired, revoked, or unknown).
	#[error("Identity service rejected the refresh token: {message}.")]
	Rejected {
		/// Backend-supplied reason.
		message: String,
	},
	/// The backend could not be reached or answered garbage.
	#[error("Identity service is unavailable: {message}.")]
	Unavailable {
		/// Rendered transport or decoding failure.
		message: String,
	},
	/// The backend did not answer within the configured bound.
	#[error("Refresh call did not complete within {timeout:?}.")]
	TimedOut {
		/// Bound that elapsed.
		timeout: StdDuration,
	},
}

type RefreshOutcome = std::result::Result<TokenPair, RefreshError>;
type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;
type EntryMap = Arc<Mutex<HashMap<String, RefreshEntry>>>;

enum RefreshEntry {
	Pending { handle: PendingRefresh, generation: u64 },
	Completed { result: TokenPair, timestamp: Instant },
}

/// De-duplicates concurrent refreshes and caches recent results.
///
/// Construct one per process and share it behind an `Arc` with every session controller.
/// The deferred sweep, the timeout, and the background drive need a tokio runtime with time
/// enabled. Without a runtime, stale entries are overwritten on the next access or purged by
/// [`RefreshCoordinator::sweep_expired`].
pub struct RefreshCoordinator<S>
where
	S: ?Sized + IdentityService,
{
	identity: Arc<S>,
	entries: EntryMap,
	generation: AtomicU64,
	cache_ttl: StdDuration,
	timeout: StdDuration,
	metrics: Arc<RefreshMetrics>,
}
impl<S> RefreshCoordinator<S>
where
	S: ?Sized + IdentityService,
{
	/// Creates a coordinator with the default TTL and timeout.
	pub fn new(identity: Arc<S>) -> Self {
		Self {
			identity,
			entries: Default::default(),
			generation: AtomicU64::new(0),
			cache_ttl: DEFAULT_CACHE_TTL,
			timeout: DEFAULT_REFRESH_TIMEOUT,
			metrics: Default::default(),
		}
	}

	/// Overrides how long a completed result is reused.
	pub fn with_cache_ttl(mut self, ttl: StdDuration) -> Self {
		self.cache_ttl = ttl;

		self
	}

	/// Overrides the bound on a single backend call.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Counters describing how calls were served.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Lifetime of a completed result.
	pub fn cache_ttl(&self) -> StdDuration {
		self.cache_ttl
	}

	/// Number of tracked keys (pending or completed).
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns true when nothing is pending or cached.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Drops every completed entry older than the TTL. Pending entries are kept.
	pub fn sweep_expired(&self) -> usize {
		let ttl = self.cache_ttl;
		let now = Instant::now();
		let mut entries = self.entries.lock();
		let before = entries.len();

		entries.retain(|_, entry| match entry {
			RefreshEntry::Completed { timestamp, .. } => now.duration_since(*timestamp) < ttl,
			RefreshEntry::Pending { .. } => true,
		});

		before - entries.len()
	}

	/// Forgets every entry. In-flight calls still resolve for their current awaiters.
	pub fn clear(&self) {
		self.entries.lock().clear();
	}

	/// Returns a new token pair for `refresh_token`.
	///
	/// Serves a completed result younger than the TTL, joins an in-flight call for the same
	/// token, or starts a new backend call. Failures are not cached and are not retried.
	pub async fn get_refreshed_tokens(&self, refresh_token: &TokenSecret) -> RefreshOutcome {
		self.metrics.record_attempt();

		let key = refresh_token.fingerprint();
		let (handle, started) = {
			let mut entries = self.entries.lock();

			match entries.get(&key) {
				Some(RefreshEntry::Completed { result, timestamp })
					if timestamp.elapsed() < self.cache_ttl =>
				{
					self.metrics.record_cache_hit();
					obs::record_refresh_decision(RefreshDecision::Cached, &key);

					return Ok(result.clone());
				},
				Some(RefreshEntry::Pending { handle, .. }) => {
					self.metrics.record_join();
					obs::record_refresh_decision(RefreshDecision::Joined, &key);

					(handle.clone(), false)
				},
				_ => {
					let generation = self.generation.fetch_add(1, Ordering::Relaxed);
					let handle = self.start(key.clone(), refresh_token.clone(), generation);

					obs::record_refresh_decision(RefreshDecision::Started, &key);
					entries
						.insert(key, RefreshEntry::Pending { handle: handle.clone(), generation });

					(handle, true)
				},
			}
		};

		if started {
			drive(handle.clone());
		}

		handle.await
	}

	fn start(&self, key: String, refresh_token: TokenSecret, generation: u64) -> PendingRefresh {
		let identity = self.identity.clone();
		let entries = self.entries.clone();
		let metrics = self.metrics.clone();
		let ttl = self.cache_ttl;
		let timeout = self.timeout;

		async move {
			metrics.record_backend_call();

			let call = identity.refresh_token(&refresh_token);
			let answered = if tokio::runtime::Handle::try_current().is_ok() {
				tokio::time::timeout(timeout, call).await
			} else {
				Ok(call.await)
			};
			let outcome = match answered {
				Ok(Ok(envelope)) =>
					envelope.into_data().map_err(|message| RefreshError::Rejected { message }),
				Ok(Err(err)) => Err(RefreshError::Unavailable { message: err.to_string() }),
				Err(_) => Err(RefreshError::TimedOut { timeout }),
			};

			match &outcome {
				Ok(_) => metrics.record_success(),
				Err(_) => metrics.record_failure(),
			}

			settle(&entries, &key, generation, &outcome, ttl);

			outcome
		}
		.boxed()
		.shared()
	}
}
impl<S> Debug for RefreshCoordinator<S>
where
	S: ?Sized + IdentityService,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("entries", &self.entries.lock().len())
			.field("cache_ttl", &self.cache_ttl)
			.field("timeout", &self.timeout)
			.field("metrics", &self.metrics)
			.finish()
	}
}

/// Polls a started call to completion on the current runtime, independent of its awaiters.
fn drive(handle: PendingRefresh) {
	if let Ok(runtime) = tokio::runtime::Handle::try_current() {
		runtime.spawn(handle.map(|_| ()));
	}
}

/// Replaces the pending entry with the outcome, unless the entry was cleared or replaced.
fn settle(
	entries: &EntryMap,
	key: &str,
	generation: u64,
	outcome: &RefreshOutcome,
	ttl: StdDuration,
) {
	let mut map = entries.lock();
	let owned = matches!(
		map.get(key),
		Some(RefreshEntry::Pending { generation: current, .. }) if *current == generation
	);

	if !owned {
		return;
	}

	match outcome {
		Ok(pair) => {
			map.insert(
				key.to_owned(),
				RefreshEntry::Completed { result: pair.clone(), timestamp: Instant::now() },
			);
			drop(map);
			obs::record_refresh_decision(RefreshDecision::Settled, key);
			schedule_sweep(Arc::downgrade(entries), key.to_owned(), ttl);
		},
		Err(_) => {
			map.remove(key);
			drop(map);
			obs::record_refresh_decision(RefreshDecision::Failed, key);
		},
	}
}

/// Evicts `key` once `ttl` has passed, if it still holds a result at least that old.
fn schedule_sweep(
	entries: Weak<Mutex<HashMap<String, RefreshEntry>>>,
	key: String,
	ttl: StdDuration,
) {
	let Ok(runtime) = tokio::runtime::Handle::try_current() else {
		return;
	};

	runtime.spawn(async move {
		tokio::time::sleep(ttl).await;

		let Some(entries) = entries.upgrade() else {
			return;
		};
		let mut map = entries.lock();
		let stale = matches!(
			map.get(&key),
			Some(RefreshEntry::Completed { timestamp, .. }) if timestamp.elapsed() >= ttl
		);

		if stale {
			map.remove(&key);
		}
	});
}
