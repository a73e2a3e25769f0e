//! Identity backend contract: login, registration, and refresh-token exchange.
//!
//! The backend wraps every answer in an [`Envelope`] (`{ success, message, data }`). A
//! transport-level failure surfaces as `Err`, while a reachable backend that refuses the
//! request answers `Ok` with `success == false`; callers decide how each maps onto the
//! crate's error taxonomy.

#[cfg(feature = "reqwest")] pub mod http;
#[cfg(test)] pub(crate) mod mock;

#[cfg(feature = "reqwest")] pub use http::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, SessionIdentity, TokenPair, TokenSecret},
	error::TransientError,
};

/// Boxed future returned by [`IdentityService`] operations.
pub type IdentityFuture<'a, T> = Pin<Box<dyn Future<Output = Result<Envelope<T>>> + 'a + Send>>;

/// Remote identity backend consumed by the session controller and refresh coordinator.
///
/// Implementations must be `Send + Sync + 'static` so one instance can be shared behind an
/// `Arc` by every in-flight refresh.
pub trait IdentityService
where
	Self: 'static + Send + Sync,
{
	/// Resolves an account by password or by federated provider identity.
	fn login<'a>(&'a self, request: &'a LoginRequest) -> IdentityFuture<'a, AccountGrant>;

	/// Creates an account from a federated profile.
	fn register<'a>(&'a self, request: &'a RegisterRequest) -> IdentityFuture<'a, AccountGrant>;

	/// Exchanges a refresh token for a new token pair.
	fn refresh_token<'a>(&'a self, refresh_token: &'a TokenSecret) -> IdentityFuture<'a, TokenPair>;
}

/// Response wrapper used by every identity endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
	/// Whether the backend accepted the request.
	pub success: bool,
	/// Human-readable status message.
	#[serde(default)]
	pub message: String,
	/// Payload; present on success.
	#[serde(default = "Option::default")]
	pub data: Option<T>,
}
impl<T> Envelope<T> {
	/// Builds a successful envelope.
	pub fn ok(data: T) -> Self {
		Self { success: true, message: String::new(), data: Some(data) }
	}

	/// Builds a rejection carrying `message`.
	pub fn rejected(message: impl Into<String>) -> Self {
		Self { success: false, message: message.into(), data: None }
	}

	/// Returns the payload, or the rejection reason when the backend refused the request or
	/// claimed success without data.
	pub fn into_data(self) -> std::result::Result<T, String> {
		match (self.success, self.data) {
			(true, Some(data)) => Ok(data),
			(true, None) => Err("Identity service reported success without a payload".into()),
			(false, _) if self.message.is_empty() =>
				Err("Identity service rejected the request".into()),
			(false, _) => Err(self.message),
		}
	}
}

/// Identity plus token pair returned by login and registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountGrant {
	/// Normalized user attributes.
	#[serde(flatten)]
	pub identity: SessionIdentity,
	/// Freshly issued tokens.
	#[serde(flatten)]
	pub tokens: TokenPair,
}

/// Email + password pair entered on the sign-in form.
#[derive(Clone, Debug)]
pub struct Credentials {
	/// Account email.
	pub email: String,
	/// Account password.
	pub password: TokenSecret,
}
impl Credentials {
	/// Creates credentials from raw strings.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: TokenSecret::new(password) }
	}
}

/// Profile handed over by a federated provider after a successful provider sign-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedProfile {
	/// Provider that authenticated the user.
	pub provider: ProviderId,
	/// Provider-scoped subject identifier.
	pub provider_account_id: String,
	/// Email reported by the provider.
	pub email: Option<String>,
	/// Display name reported by the provider.
	pub name: Option<String>,
	/// Avatar URL reported by the provider.
	pub picture: Option<String>,
}

/// Body of the login call.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum LoginRequest {
	/// Password sign-in.
	Password {
		/// Account email.
		email: String,
		/// Account password.
		password: TokenSecret,
	},
	/// Resolution of an existing account by federated identity.
	#[serde(rename_all = "camelCase")]
	Federated {
		/// Provider that authenticated the user.
		provider: ProviderId,
		/// Provider-scoped subject identifier.
		provider_account_id: String,
		/// Email reported by the provider.
		#[serde(skip_serializing_if = "Option::is_none")]
		email: Option<String>,
	},
}
impl From<Credentials> for LoginRequest {
	fn from(credentials: Credentials) -> Self {
		Self::Password { email: credentials.email, password: credentials.password }
	}
}
impl From<&FederatedProfile> for LoginRequest {
	fn from(profile: &FederatedProfile) -> Self {
		Self::Federated {
			provider: profile.provider.clone(),
			provider_account_id: profile.provider_account_id.clone(),
			email: profile.email.clone(),
		}
	}
}

/// Body of the registration call used by federated auto-registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
	/// Email reported by the provider.
	pub email: Option<String>,
	/// Display name reported by the provider.
	pub name: Option<String>,
	/// Avatar URL reported by the provider.
	pub profile_picture: Option<String>,
	/// Provider that authenticated the user.
	pub provider: ProviderId,
	/// Provider-scoped subject identifier.
	pub provider_account_id: String,
}
impl From<&FederatedProfile> for RegisterRequest {
	fn from(profile: &FederatedProfile) -> Self {
		Self {
			email: profile.email.clone(),
			name: profile.name.clone(),
			profile_picture: profile.picture.clone(),
			provider: profile.provider.clone(),
			provider_account_id: profile.provider_account_id.clone(),
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
	pub(crate) refresh_token: &'a str,
}

/// Parses an identity response body into an [`Envelope`].
///
/// Bodies that are not envelopes are classified by status: non-success statuses become
/// [`TransientError::IdentityEndpoint`], anything else a [`TransientError::ResponseParse`]
/// naming the failing JSON path.
pub fn decode_envelope<T>(body: &[u8], status: Option<u16>) -> Result<Envelope<T>>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	match serde_path_to_error::deserialize(&mut deserializer) {
		Ok(envelope) => Ok(envelope),
		Err(_) if status.is_some_and(|code| !(200..300).contains(&code)) =>
			Err(TransientError::IdentityEndpoint {
				message: format!("HTTP status {}", status.unwrap_or_default()),
				status,
			}
			.into()),
		Err(source) => Err(TransientError::ResponseParse { source, status }.into()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn into_data_distinguishes_rejection_and_missing_payload() {
		assert_eq!(Envelope::ok(1_u8).into_data(), Ok(1));
		assert_eq!(
			Envelope::<u8>::rejected("Invalid credentials").into_data(),
			Err("Invalid credentials".into())
		);

		let hollow = Envelope::<u8> { success: true, message: "ok".into(), data: None };

		assert!(hollow.into_data().is_err());
		assert!(Envelope::<u8>::rejected("").into_data().is_err());
	}

	#[test]
	fn account_grant_reads_flat_backend_payload() {
		let body = br#"{
			"success": true,
			"message": "Login successful",
			"data": {
				"id": "64f0c2a1",
				"email": "ada@academy.test",
				"name": "Ada",
				"role": "STUDENT",
				"profilePicture": null,
				"accessToken": "at-1",
				"refreshToken": "rt-1"
			}
		}"#;
		let grant = decode_envelope::<AccountGrant>(body, Some(200))
			.expect("Envelope should decode.")
			.into_data()
			.expect("Envelope should carry a grant.");

		assert_eq!(grant.identity.id.as_ref(), "64f0c2a1");
		assert!(grant.identity.role.contains("student"));
		assert_eq!(grant.identity.profile_picture, None);
		assert_eq!(grant.tokens, TokenPair::new("at-1", "rt-1"));
	}

	#[test]
	fn non_envelope_bodies_are_classified_by_status() {
		let err = decode_envelope::<TokenPair>(b"<html>Bad Gateway</html>", Some(502))
			.expect_err("HTML bodies are not envelopes.");

		assert!(matches!(
			err,
			Error::Transient(TransientError::IdentityEndpoint { status: Some(502), .. })
		));

		let err = decode_envelope::<TokenPair>(br#"{"success":"yes"}"#, Some(200))
			.expect_err("Mistyped envelopes must fail.");

		match err {
			Error::Transient(TransientError::ResponseParse { source, .. }) =>
				assert_eq!(source.path().to_string(), "success"),
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn login_requests_serialize_per_sign_in_path() {
		let password = serde_json::to_value(LoginRequest::from(Credentials::new(
			"ada@academy.test",
			"hunter2",
		)))
		.expect("Password login should serialize.");

		assert_eq!(
			password,
			serde_json::json!({ "email": "ada@academy.test", "password": "hunter2" })
		);

		let profile = FederatedProfile {
			provider: ProviderId::new("google").expect("Provider fixture should be valid."),
			provider_account_id: "1029384756".into(),
			email: None,
			name: Some("Ada".into()),
			picture: None,
		};
		let federated = serde_json::to_value(LoginRequest::from(&profile))
			.expect("Federated login should serialize.");

		assert_eq!(
			federated,
			serde_json::json!({ "provider": "google", "providerAccountId": "1029384756" })
		);
	}
}
