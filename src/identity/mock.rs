//! Scripted [`IdentityService`] used by unit tests.

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use jsonwebtoken::{EncodingKey, Header};
// self
use crate::{
	_prelude::*,
	auth::{RoleSet, SessionIdentity, TokenPair, TokenSecret, UserId},
	error::TransportError,
	identity::{
		AccountGrant, Envelope, IdentityFuture, IdentityService, LoginRequest, RegisterRequest,
	},
};

/// One scripted answer.
pub(crate) enum Scripted<T> {
	Reply(Envelope<T>),
	Unreachable(&'static str),
}

/// Identity double that pops scripted answers in order and counts calls.
///
/// An exhausted queue answers with a rejection. Refresh answers are delayed by
/// `refresh_delay` so concurrent callers overlap.
#[derive(Default)]
pub(crate) struct ScriptedIdentity {
	logins: Mutex<VecDeque<Scripted<AccountGrant>>>,
	registrations: Mutex<VecDeque<Scripted<AccountGrant>>>,
	refreshes: Mutex<VecDeque<Scripted<TokenPair>>>,
	refresh_delay: Mutex<StdDuration>,
	login_calls: AtomicUsize,
	register_calls: AtomicUsize,
	refresh_calls: AtomicUsize,
}
impl ScriptedIdentity {
	pub(crate) fn push_login(&self, answer: Scripted<AccountGrant>) -> &Self {
		self.logins.lock().push_back(answer);

		self
	}

	pub(crate) fn push_register(&self, answer: Scripted<AccountGrant>) -> &Self {
		self.registrations.lock().push_back(answer);

		self
	}

	pub(crate) fn push_refresh(&self, answer: Scripted<TokenPair>) -> &Self {
		self.refreshes.lock().push_back(answer);

		self
	}

	pub(crate) fn set_refresh_delay(&self, delay: StdDuration) {
		*self.refresh_delay.lock() = delay;
	}

	pub(crate) fn login_calls(&self) -> usize {
		self.login_calls.load(Ordering::SeqCst)
	}

	pub(crate) fn register_calls(&self) -> usize {
		self.register_calls.load(Ordering::SeqCst)
	}

	pub(crate) fn refresh_calls(&self) -> usize {
		self.refresh_calls.load(Ordering::SeqCst)
	}

	fn answer<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Result<Envelope<T>> {
		match queue.lock().pop_front() {
			Some(Scripted::Reply(envelope)) => Ok(envelope),
			Some(Scripted::Unreachable(message)) =>
				Err(TransportError::network(std::io::Error::other(message)).into()),
			None => Ok(Envelope::rejected("No scripted answer left")),
		}
	}
}
impl IdentityService for ScriptedIdentity {
	fn login<'a>(&'a self, _request: &'a LoginRequest) -> IdentityFuture<'a, AccountGrant> {
		Box::pin(async move {
			self.login_calls.fetch_add(1, Ordering::SeqCst);

			Self::answer(&self.logins)
		})
	}

	fn register<'a>(&'a self, _request: &'a RegisterRequest) -> IdentityFuture<'a, AccountGrant> {
		Box::pin(async move {
			self.register_calls.fetch_add(1, Ordering::SeqCst);

			Self::answer(&self.registrations)
		})
	}

	fn refresh_token<'a>(
		&'a self,
		_refresh_token: &'a TokenSecret,
	) -> IdentityFuture<'a, TokenPair> {
		Box::pin(async move {
			self.refresh_calls.fetch_add(1, Ordering::SeqCst);

			let delay = *self.refresh_delay.lock();

			if !delay.is_zero() {
				tokio::time::sleep(delay).await;
			}

			Self::answer(&self.refreshes)
		})
	}
}

/// Mints an HS256 access token whose `exp` claim is `expires`.
pub(crate) fn mint_access_token(subject: &str, expires: OffsetDateTime) -> String {
	#[derive(Serialize)]
	struct Claims<'a> {
		sub: &'a str,
		exp: i64,
	}

	jsonwebtoken::encode(
		&Header::default(),
		&Claims { sub: subject, exp: expires.unix_timestamp() },
		&EncodingKey::from_secret(b"identity-backend"),
	)
	.expect("Test access token should encode.")
}

/// Backend grant for a student account.
pub(crate) fn grant(access_token: &str, refresh_token: &str) -> AccountGrant {
	AccountGrant {
		identity: SessionIdentity {
			id: UserId::new("user-42").expect("User fixture should be valid."),
			email: "ada@academy.test".into(),
			name: Some("Ada Lovelace".into()),
			role: RoleSet::new(["STUDENT"]).expect("Role fixture should be valid."),
			profile_picture: Some("https://cdn.academy.test/ada.png".into()),
		},
		tokens: TokenPair::new(access_token, refresh_token),
	}
}
