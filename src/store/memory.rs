//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{SessionId, SessionToken, TokenSecret},
	store::{CompareAndSwapOutcome, SessionStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<SessionId, SessionToken>>>;

/// Storage backend that keeps session records in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of stored sessions.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no session is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn save_now(map: StoreMap, id: SessionId, record: SessionToken) -> Result<(), StoreError> {
		map.write().insert(id, record);

		Ok(())
	}

	fn fetch_now(map: StoreMap, id: &SessionId) -> Option<SessionToken> {
		map.read().get(id).cloned()
	}

	fn cas_now(
		map: StoreMap,
		id: &SessionId,
		expected_refresh: &TokenSecret,
		replacement: SessionToken,
	) -> CompareAndSwapOutcome {
		let mut guard = map.write();
		let outcome = match guard.get(id) {
			Some(existing) if existing.refresh_token() == expected_refresh =>
				CompareAndSwapOutcome::Updated,
			Some(_) => CompareAndSwapOutcome::RefreshMismatch,
			None => CompareAndSwapOutcome::Missing,
		};

		if matches!(outcome, CompareAndSwapOutcome::Updated) {
			guard.insert(id.to_owned(), replacement);
		}

		outcome
	}

	fn remove_now(map: StoreMap, id: &SessionId) -> Option<SessionToken> {
		map.write().remove(id)
	}
}
impl SessionStore for MemoryStore {
	fn save<'a>(&'a self, id: &'a SessionId, record: SessionToken) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move { Self::save_now(map, id, record) })
	}

	fn fetch<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::fetch_now(map, id)) })
	}

	fn compare_and_swap_refresh<'a>(
		&'a self,
		id: &'a SessionId,
		expected_refresh: &'a TokenSecret,
		replacement: SessionToken,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::cas_now(map, id, expected_refresh, replacement)) })
	}

	fn remove<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::remove_now(map, id)) })
	}
}
