//! Crate-level error types shared across flows, the identity client, and stores.

// self
use crate::{_prelude::*, flows::RefreshError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Login or registration was rejected, or the identity backend could not be reached.
	#[error("Authentication failed: {reason}.")]
	AuthenticationFailure {
		/// Backend- or crate-supplied reason string.
		reason: String,
	},
	/// Federated sign-in could neither resolve nor register a backend account.
	#[error("Automatic registration failed: {reason}.")]
	AutoRegisterFailure {
		/// Backend- or crate-supplied reason string.
		reason: String,
	},
	/// Refreshing the access token failed; the session must sign in again.
	#[error(transparent)]
	RefreshAccessToken(#[from] RefreshError),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An identity endpoint URL could not be derived.
	#[error("Identity endpoint `{path}` is invalid.")]
	InvalidEndpoint {
		/// Relative path that failed to join onto the base URL.
		path: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request payload could not be encoded as JSON.
	#[error("Request payload could not be encoded.")]
	RequestEncode(#[source] serde_json::Error),
	/// Session token builder validation failed.
	#[error("Unable to build session token.")]
	TokenBuild(#[from] crate::auth::SessionTokenBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Identity endpoint returned a response that is not an envelope.
	#[error("Identity endpoint returned an unexpected response: {message}.")]
	IdentityEndpoint {
		/// Crate-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Identity endpoint responded with malformed JSON that could not be parsed.
	#[error("Identity endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the identity service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the identity service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
