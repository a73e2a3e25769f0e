//! JSON-over-HTTP identity client backed by reqwest.
//!
//! Every call is a `POST` with a JSON body to one of three endpoints derived from the
//! backend base URL. Responses are decoded with [`decode_envelope`] regardless of status,
//! because the backend reports rejected credentials as `401` with an envelope body.

// crates.io
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	error::{ConfigError, TransportError},
	identity::{
		AccountGrant, Envelope, IdentityFuture, IdentityService, LoginRequest, RefreshRequest,
		RegisterRequest, decode_envelope,
	},
};

const LOGIN_PATH: &str = "auth/login";
const REGISTER_PATH: &str = "auth/register";
const REFRESH_PATH: &str = "auth/refresh-token";

/// Absolute URLs of the identity endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityEndpoints {
	/// Login endpoint.
	pub login: Url,
	/// Registration endpoint.
	pub register: Url,
	/// Refresh-token endpoint.
	pub refresh: Url,
}
impl IdentityEndpoints {
	/// Derives the endpoints from the backend API base URL.
	///
	/// A missing trailing slash is added so `https://api.example/v1` keeps its `v1` segment.
	pub fn from_base(base: &Url) -> Result<Self> {
		let mut base = base.clone();

		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());

			base.set_path(&path);
		}

		let join = |path: &'static str| {
			base.join(path).map_err(|source| ConfigError::InvalidEndpoint { path, source })
		};

		Ok(Self {
			login: join(LOGIN_PATH)?,
			register: join(REGISTER_PATH)?,
			refresh: join(REFRESH_PATH)?,
		})
	}

	/// Overrides the refresh endpoint.
	pub fn with_refresh(mut self, url: Url) -> Self {
		self.refresh = url;

		self
	}
}

/// [`IdentityService`] implementation that talks to the backend over HTTP.
///
/// Redirects should stay disabled on custom clients: identity endpoints answer directly.
#[derive(Clone, Debug)]
pub struct ReqwestIdentityService {
	client: ReqwestClient,
	endpoints: IdentityEndpoints,
}
impl ReqwestIdentityService {
	/// Creates a client with a default reqwest configuration.
	pub fn new(endpoints: IdentityEndpoints) -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self::with_client(client, endpoints))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, endpoints: IdentityEndpoints) -> Self {
		Self { client, endpoints }
	}

	/// Endpoints this client calls.
	pub fn endpoints(&self) -> &IdentityEndpoints {
		&self.endpoints
	}

	async fn post<B, T>(&self, url: &Url, body: &B) -> Result<Envelope<T>>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let payload = serde_json::to_vec(body).map_err(ConfigError::RequestEncode)?;
		let response = self
			.client
			.post(url.clone())
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json")
			.body(payload)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status().as_u16();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		decode_envelope(&bytes, Some(status))
	}
}
impl IdentityService for ReqwestIdentityService {
	fn login<'a>(&'a self, request: &'a LoginRequest) -> IdentityFuture<'a, AccountGrant> {
		Box::pin(self.post(&self.endpoints.login, request))
	}

	fn register<'a>(&'a self, request: &'a RegisterRequest) -> IdentityFuture<'a, AccountGrant> {
		Box::pin(self.post(&self.endpoints.register, request))
	}

	fn refresh_token<'a>(
		&'a self,
		refresh_token: &'a TokenSecret,
	) -> IdentityFuture<'a, TokenPair> {
		Box::pin(async move {
			let body = RefreshRequest { refresh_token: refresh_token.expose() };

			self.post(&self.endpoints.refresh, &body).await
		})
	}
}
