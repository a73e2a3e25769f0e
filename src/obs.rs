//! Optional observability helpers for session flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `academy_session.flow` with the `flow` and `stage`
//!   fields, plus a debug event for every refresh decision.
//! - Enable `metrics` to increment `academy_session_flow_total` (labeled by `flow` + `outcome`)
//!   and `academy_session_refresh_total` (labeled by `decision`).
//!
//! Refresh tokens never reach a span or counter; events carry a short prefix of
//! [`TokenSecret::fingerprint`](crate::auth::TokenSecret::fingerprint) instead.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Session flow kinds observed by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Email + password sign-in.
	CredentialsSignIn,
	/// Federated provider sign-in with auto-registration.
	FederatedSignIn,
	/// Session read that may refresh the access token.
	Session,
	/// Record removal.
	SignOut,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::CredentialsSignIn => "credentials_sign_in",
			FlowKind::FederatedSignIn => "federated_sign_in",
			FlowKind::Session => "session",
			FlowKind::SignOut => "sign_out",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a controller operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How the refresh coordinator served a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshDecision {
	/// Answered from a completed result younger than the cache TTL.
	Cached,
	/// Attached to an in-flight backend call.
	Joined,
	/// Started a new backend call.
	Started,
	/// A backend call succeeded and its result was cached.
	Settled,
	/// A backend call failed and its entry was dropped.
	Failed,
}
impl RefreshDecision {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshDecision::Cached => "cached",
			RefreshDecision::Joined => "joined",
			RefreshDecision::Started => "started",
			RefreshDecision::Settled => "settled",
			RefreshDecision::Failed => "failed",
		}
	}
}
impl Display for RefreshDecision {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a refresh decision as a debug event and a counter (when enabled).
///
/// `key` is a token fingerprint; only its first eight characters are emitted.
pub fn record_refresh_decision(decision: RefreshDecision, key: &str) {
	let label = key.get(..8).unwrap_or(key);

	#[cfg(feature = "tracing")]
	::tracing::debug!(decision = decision.as_str(), key = label, "refresh coordinator decision");

	#[cfg(not(feature = "tracing"))]
	let _ = label;

	record_refresh_counter(decision);
}
