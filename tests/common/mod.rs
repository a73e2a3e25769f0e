//! Shared fixtures for the integration tests.

#![allow(dead_code)]

// std
#[cfg(feature = "reqwest")] use std::sync::Arc;
// crates.io
#[cfg(feature = "reqwest")] use httpmock::MockServer;
use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
// self
use academy_session::auth::{RoleSet, SessionId, SessionIdentity, SessionToken, TokenPair, UserId};
#[cfg(feature = "reqwest")]
use academy_session::{flows::ReqwestSessionController, store::MemoryStore, url::Url};

/// Builds a controller pointed at `server`'s `/api` root plus the store behind it.
#[cfg(feature = "reqwest")]
pub fn controller(server: &MockServer) -> (ReqwestSessionController, Arc<MemoryStore>) {
	let base = Url::parse(&server.url("/api")).expect("Mock base URL should parse.");
	let store = Arc::new(MemoryStore::default());
	let controller = ReqwestSessionController::from_base_url(&base, store.clone())
		.expect("Controller should build against the mock server.");

	(controller, store)
}

pub fn session(id: &str) -> SessionId {
	SessionId::new(id).expect("Session fixture should be valid.")
}

/// Mints an HS256 access token expiring at `expires`.
pub fn access_token(expires: OffsetDateTime) -> String {
	#[derive(Serialize)]
	struct Claims {
		sub: &'static str,
		exp: i64,
	}

	jsonwebtoken::encode(
		&Header::default(),
		&Claims { sub: "user-42", exp: expires.unix_timestamp() },
		&EncodingKey::from_secret(b"identity-backend"),
	)
	.expect("Test access token should encode.")
}

/// Backend envelope carrying a student account grant.
pub fn grant_body(access: &str, refresh: &str) -> Value {
	json!({
		"success": true,
		"message": "Login successful",
		"data": {
			"id": "user-42",
			"email": "ada@academy.test",
			"name": "Ada Lovelace",
			"role": "STUDENT",
			"profilePicture": "https://cdn.academy.test/ada.png",
			"accessToken": access,
			"refreshToken": refresh
		}
	})
}

/// Backend envelope carrying a refreshed token pair.
pub fn refresh_body(access: &str, refresh: &str) -> Value {
	json!({
		"success": true,
		"message": "Token refreshed",
		"data": { "accessToken": access, "refreshToken": refresh }
	})
}

pub fn rejection_body(message: &str) -> Value {
	json!({ "success": false, "message": message })
}

pub fn identity() -> SessionIdentity {
	SessionIdentity {
		id: UserId::new("user-42").expect("User fixture should be valid."),
		email: "ada@academy.test".into(),
		name: Some("Ada Lovelace".into()),
		role: RoleSet::new(["STUDENT"]).expect("Role fixture should be valid."),
		profile_picture: None,
	}
}

/// Record whose access token expires at `expires`.
pub fn record(refresh: &str, expires: OffsetDateTime) -> SessionToken {
	SessionToken::builder(identity())
		.tokens(TokenPair::new(access_token(expires), refresh))
		.expires_at(expires)
		.build()
		.expect("Session token fixture should build.")
}
