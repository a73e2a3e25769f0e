//! Sign-in merge for password and federated logins.
//!
//! Both entry points end in the same place: the backend's [`AccountGrant`] becomes a fresh
//! [`SessionToken`] (expiry decoded from the access token), replaces whatever record the
//! session held, and is projected for the caller. A new sign-in is also the only way out of
//! the errored state.

// self
use crate::{
	_prelude::*,
	auth::{SessionId, SessionToken, SessionView},
	error::ConfigError,
	flows::SessionController,
	identity::{
		AccountGrant, Credentials, FederatedProfile, IdentityService, LoginRequest, RegisterRequest,
	},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<S> SessionController<S>
where
	S: ?Sized + IdentityService,
{
	/// Signs `session` in with email + password.
	///
	/// Any rejection or transport failure becomes [`Error::AuthenticationFailure`].
	pub async fn sign_in_with_credentials(
		&self,
		session: &SessionId,
		credentials: Credentials,
	) -> Result<SessionView> {
		const KIND: FlowKind = FlowKind::CredentialsSignIn;

		let span = FlowSpan::new(KIND, "sign_in_with_credentials");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = LoginRequest::from(credentials);
				let grant = match self.identity.login(&request).await {
					Ok(envelope) => envelope
						.into_data()
						.map_err(|reason| Error::AuthenticationFailure { reason })?,
					Err(err) =>
						return Err(Error::AuthenticationFailure { reason: err.to_string() }),
				};

				self.establish(session, grant).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Signs `session` in from a federated provider profile.
	///
	/// Resolves an existing account first and registers one when resolution fails. When
	/// registration fails too, the error is [`Error::AutoRegisterFailure`] so the caller can
	/// route to a dedicated recovery page.
	pub async fn sign_in_with_oauth(
		&self,
		session: &SessionId,
		profile: FederatedProfile,
	) -> Result<SessionView> {
		const KIND: FlowKind = FlowKind::FederatedSignIn;

		let span = FlowSpan::new(KIND, "sign_in_with_oauth");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let grant = match self.resolve_federated(&profile).await {
					Some(grant) => grant,
					None => self.register_federated(&profile).await?,
				};

				self.establish(session, grant).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn resolve_federated(&self, profile: &FederatedProfile) -> Option<AccountGrant> {
		let request = LoginRequest::from(profile);

		self.identity.login(&request).await.ok()?.into_data().ok()
	}

	async fn register_federated(&self, profile: &FederatedProfile) -> Result<AccountGrant> {
		let request = RegisterRequest::from(profile);

		match self.identity.register(&request).await {
			Ok(envelope) =>
				envelope.into_data().map_err(|reason| Error::AutoRegisterFailure { reason }),
			Err(err) => Err(Error::AutoRegisterFailure { reason: err.to_string() }),
		}
	}

	/// Replaces the session's record with one built from `grant`.
	async fn establish(&self, session: &SessionId, grant: AccountGrant) -> Result<SessionView> {
		let now = OffsetDateTime::now_utc();
		let expires =
			self.policy.access_expiry(self.decoder.as_ref(), &grant.tokens.access_token, now);
		let record = SessionToken::builder(grant.identity)
			.tokens(grant.tokens)
			.issued_at(now)
			.expires_at(expires)
			.build()
			.map_err(ConfigError::from)?;
		let view = record.project();

		self.store.save(session, record).await?;

		Ok(view)
	}
}
