//! Session lifecycle and token-refresh coordination for the academy marketplace front end.
//!
//! The crate keeps a signed-in user's access token valid across overlapping requests without
//! issuing duplicate refresh calls to the identity backend. [`flows::RefreshCoordinator`]
//! collapses concurrent refreshes for the same refresh token into one backend round trip and
//! briefly caches the result, while [`flows::SessionController`] decides when a token needs
//! refreshing, merges password and federated sign-ins into one record shape, and projects a
//! token-free [`auth::SessionView`] to the rest of the application.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod identity;
pub mod obs;
pub mod store;

mod _prelude {
	pub use std::{
		collections::{HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
