//! Access/refresh token pair issued by the identity backend.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access and refresh tokens returned together by login, registration, and refresh calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
	/// Short-lived credential authorizing API calls.
	pub access_token: TokenSecret,
	/// Long-lived credential used to obtain the next pair.
	pub refresh_token: TokenSecret,
}
impl TokenPair {
	/// Creates a pair from raw token strings.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
		}
	}
}
