//! Timing policy shared by sign-in and session evaluation.

// self
use crate::{
	_prelude::*,
	auth::{ExpiryDecoder, SessionToken, TokenSecret},
	flows::refresh::{DEFAULT_CACHE_TTL, DEFAULT_REFRESH_TIMEOUT},
};

/// Refresh timing knobs.
///
/// The defaults are the fixed production policy; setters exist for embedding and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionPolicy {
	/// How long before expiry a token is refreshed.
	pub refresh_buffer: Duration,
	/// Lifetime assumed when an access token carries no readable expiry.
	pub default_access_lifetime: Duration,
	/// How long a completed refresh result is reused.
	pub refresh_cache_ttl: StdDuration,
	/// Bound on a single backend refresh call.
	pub refresh_timeout: StdDuration,
}
impl SessionPolicy {
	const DEFAULT_ACCESS_LIFETIME: Duration = Duration::minutes(15);
	const DEFAULT_REFRESH_BUFFER: Duration = Duration::seconds(60);

	/// Overrides the refresh buffer (negative values clamp to zero).
	pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
		self.refresh_buffer = clamp(buffer);

		self
	}

	/// Overrides the fallback access-token lifetime (negative values clamp to zero).
	pub fn with_default_access_lifetime(mut self, lifetime: Duration) -> Self {
		self.default_access_lifetime = clamp(lifetime);

		self
	}

	/// Overrides the refresh result cache TTL.
	pub fn with_refresh_cache_ttl(mut self, ttl: StdDuration) -> Self {
		self.refresh_cache_ttl = ttl;

		self
	}

	/// Overrides the backend refresh timeout.
	pub fn with_refresh_timeout(mut self, timeout: StdDuration) -> Self {
		self.refresh_timeout = timeout;

		self
	}

	/// Decides whether `record` must be refreshed at `now`.
	///
	/// Errored records never refresh again; only a new sign-in recovers them.
	pub fn should_refresh(&self, record: &SessionToken, now: OffsetDateTime) -> bool {
		!record.is_errored() && record.needs_refresh_at(now, self.refresh_buffer)
	}

	/// Absolute expiry for a newly received access token.
	pub fn access_expiry(
		&self,
		decoder: &dyn ExpiryDecoder,
		access_token: &TokenSecret,
		now: OffsetDateTime,
	) -> OffsetDateTime {
		decoder
			.expires_at(access_token.expose())
			.unwrap_or_else(|| now + self.default_access_lifetime)
	}
}
impl Default for SessionPolicy {
	fn default() -> Self {
		Self {
			refresh_buffer: Self::DEFAULT_REFRESH_BUFFER,
			default_access_lifetime: Self::DEFAULT_ACCESS_LIFETIME,
			refresh_cache_ttl: DEFAULT_CACHE_TTL,
			refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
		}
	}
}

fn clamp(duration: Duration) -> Duration {
	if duration.is_negative() { Duration::ZERO } else { duration }
}
