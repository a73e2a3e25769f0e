//! Consumer-facing session projection.

// self
use crate::{
	_prelude::*,
	auth::{SessionErrorKind, SessionIdentity, TokenSecret},
};

/// What the rest of the application sees of a session.
///
/// Carries no refresh token and no raw expiry. A view with `error` set must be treated as
/// signed out even though `user` is still populated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
	/// Normalized identity of the signed-in user.
	pub user: SessionIdentity,
	/// Current access token; `None` once a refresh has failed.
	pub access_token: Option<TokenSecret>,
	/// Terminal failure marker.
	pub error: Option<SessionErrorKind>,
}
impl SessionView {
	/// Returns true only for a usable session: token present and no error marker.
	pub fn is_authenticated(&self) -> bool {
		self.error.is_none() && self.access_token.is_some()
	}
}
