//! Storage contract between the session controller and the surrounding session framework.
//!
//! The controller is the only writer; the store just keeps whatever record it is handed,
//! keyed by [`SessionId`].

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{SessionId, SessionToken, TokenSecret},
};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by session stores.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the record for `id`.
	fn save<'a>(&'a self, id: &'a SessionId, record: SessionToken) -> StoreFuture<'a, ()>;

	/// Fetches the record for `id`, if present.
	fn fetch<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionToken>>;

	/// Atomically replaces the record for `id` if it still carries `expected_refresh`.
	fn compare_and_swap_refresh<'a>(
		&'a self,
		id: &'a SessionId,
		expected_refresh: &'a TokenSecret,
		replacement: SessionToken,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;

	/// Removes the record for `id`, returning it when one existed.
	fn remove<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionToken>>;
}

/// Result of a refresh-token compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The stored refresh token matched and the record was replaced.
	Updated,
	/// A record exists but holds a different refresh token (a newer sign-in or rotation).
	RefreshMismatch,
	/// No record exists for the session (signed out).
	Missing,
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
