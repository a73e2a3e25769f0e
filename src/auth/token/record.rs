//! Session token records, lifecycle states, and builders.

// self
use crate::{
	_prelude::*,
	auth::{RoleSet, SessionView, TokenPair, TokenSecret, UserId},
};

/// Lifecycle state of a session as observed from outside the controller.
///
/// An in-flight refresh is indistinguishable from [`SessionState::NearExpiry`]: the refresh
/// coordinator hides its pending state, so no `Refreshing` variant is exposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
	/// Token is valid and outside the refresh buffer.
	Fresh,
	/// Token is inside the refresh buffer; the next evaluation refreshes it.
	NearExpiry,
	/// A refresh failed. Terminal until a new sign-in.
	Errored,
	/// No record exists (never signed in, or signed out).
	SignedOut,
}

/// Terminal failure markers attached to a session record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionErrorKind {
	/// The refresh call failed; the access token has been dropped.
	RefreshAccessTokenError,
}
impl SessionErrorKind {
	/// Returns the stable label consumers match on.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionErrorKind::RefreshAccessTokenError => "RefreshAccessTokenError",
		}
	}
}
impl Display for SessionErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Normalized user attributes shared by every sign-in path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
	/// Backend account identifier.
	pub id: UserId,
	/// Account email address.
	pub email: String,
	/// Display name, if the backend knows one.
	#[serde(default)]
	pub name: Option<String>,
	/// Normalized role set.
	#[serde(default)]
	pub role: RoleSet,
	/// Profile picture URL or path.
	#[serde(default)]
	pub profile_picture: Option<String>,
}

/// Errors produced by [`SessionTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionTokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no refresh token value was provided.
	#[error("Refresh token is required.")]
	MissingRefreshToken,
}

/// Per-session token record owned by the session controller.
///
/// Only sign-in and the refresh path change a record; everything else reads the
/// [`SessionView`] returned by [`SessionToken::project`]. The refresh token and the raw
/// expiry never leave the crate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
	pub(crate) identity: SessionIdentity,
	/// `None` once a refresh has failed.
	pub(crate) access_token: Option<TokenSecret>,
	pub(crate) refresh_token: TokenSecret,
	#[serde(with = "time::serde::timestamp::milliseconds::option", default)]
	pub(crate) access_token_expires: Option<OffsetDateTime>,
	#[serde(with = "time::serde::timestamp::milliseconds")]
	pub(crate) issued_at: OffsetDateTime,
	#[serde(default)]
	pub(crate) error: Option<SessionErrorKind>,
}
impl SessionToken {
	/// Returns a builder for constructing a freshly signed-in record.
	pub fn builder(identity: SessionIdentity) -> SessionTokenBuilder {
		SessionTokenBuilder::new(identity)
	}

	/// Normalized identity attached to the session.
	pub fn identity(&self) -> &SessionIdentity {
		&self.identity
	}

	/// Terminal failure marker, if any.
	pub fn error(&self) -> Option<SessionErrorKind> {
		self.error
	}

	/// Returns true once a refresh has failed for this record.
	pub fn is_errored(&self) -> bool {
		self.error.is_some()
	}

	/// Instant the current token pair was stored.
	pub fn issued_at(&self) -> OffsetDateTime {
		self.issued_at
	}

	/// Computes the lifecycle state at a given instant.
	pub fn state_at(&self, instant: OffsetDateTime, buffer: Duration) -> SessionState {
		if self.is_errored() {
			return SessionState::Errored;
		}
		if self.needs_refresh_at(instant, buffer) {
			return SessionState::NearExpiry;
		}

		SessionState::Fresh
	}

	/// Convenience helper that checks the state using the current UTC instant.
	pub fn state(&self, buffer: Duration) -> SessionState {
		self.state_at(OffsetDateTime::now_utc(), buffer)
	}

	/// Projects the consumer-facing view: identity, access token (`None` once errored), and
	/// the error marker.
	pub fn project(&self) -> SessionView {
		SessionView {
			user: self.identity.clone(),
			access_token: if self.is_errored() { None } else { self.access_token.clone() },
			error: self.error,
		}
	}

	/// `now > expires - buffer`; records without a known expiry never refresh.
	pub(crate) fn needs_refresh_at(&self, instant: OffsetDateTime, buffer: Duration) -> bool {
		self.access_token_expires.is_some_and(|expires| instant > expires - buffer)
	}

	/// Refresh token the record was last issued with; stores compare on it before swapping.
	pub fn refresh_token(&self) -> &TokenSecret {
		&self.refresh_token
	}

	#[cfg(test)]
	pub(crate) fn access_token_expires(&self) -> Option<OffsetDateTime> {
		self.access_token_expires
	}

	/// Installs a refreshed pair and clears any prior error.
	pub(crate) fn rotate(&mut self, pair: TokenPair, expires: OffsetDateTime, now: OffsetDateTime) {
		self.access_token = Some(pair.access_token);
		self.refresh_token = pair.refresh_token;
		self.access_token_expires = Some(expires);
		self.issued_at = now;
		self.error = None;
	}

	/// Marks the record as terminally failed and drops the access token.
	pub(crate) fn fail_refresh(&mut self) {
		self.access_token = None;
		self.error = Some(SessionErrorKind::RefreshAccessTokenError);
	}
}
impl Debug for SessionToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionToken")
			.field("identity", &self.identity)
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &"<redacted>")
			.field("access_token_expires", &self.access_token_expires)
			.field("issued_at", &self.issued_at)
			.field("error", &self.error)
			.finish()
	}
}

/// Builder for [`SessionToken`].
#[derive(Clone, Debug)]
pub struct SessionTokenBuilder {
	identity: SessionIdentity,
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl SessionTokenBuilder {
	fn new(identity: SessionIdentity) -> Self {
		Self {
			identity,
			access_token: None,
			refresh_token: None,
			issued_at: None,
			expires_at: None,
			expires_in: None,
		}
	}

	/// Provides both tokens at once.
	pub fn tokens(mut self, pair: TokenPair) -> Self {
		self.access_token = Some(pair.access_token);
		self.refresh_token = Some(pair.refresh_token);

		self
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the issued-at instant (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets the absolute access-token expiry.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the access-token expiry relative to the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`SessionToken`].
	///
	/// A record without expiry is valid; it is simply never refreshed.
	pub fn build(self) -> Result<SessionToken, SessionTokenBuilderError> {
		let access_token = self.access_token.ok_or(SessionTokenBuilderError::MissingAccessToken)?;
		let refresh_token =
			self.refresh_token.ok_or(SessionTokenBuilderError::MissingRefreshToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let access_token_expires = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => Some(instant),
			(None, Some(delta)) => Some(issued_at + delta),
			(None, None) => None,
		};

		Ok(SessionToken {
			identity: self.identity,
			access_token: Some(access_token),
			refresh_token,
			access_token_expires,
			issued_at,
			error: None,
		})
	}
}
