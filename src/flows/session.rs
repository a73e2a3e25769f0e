//! Per-request session evaluation and the consumer-facing session surface.
//!
//! Every token-bearing interaction runs the expiry decision first: a record inside the
//! refresh buffer goes through the shared [`RefreshCoordinator`](crate::flows::RefreshCoordinator),
//! so overlapping requests for one session (or for sessions that share a refresh token) cost
//! a single backend call. A failed refresh marks the record errored and drops its access token;
//! errored records are returned untouched on every later evaluation.

// self
use crate::{
	_prelude::*,
	auth::{SessionId, SessionState, SessionToken, SessionView, TokenSecret},
	flows::{RefreshError, SessionController},
	identity::IdentityService,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CompareAndSwapOutcome,
};

/// What an evaluation did to a record.
enum Evaluation {
	Unchanged,
	Rotated,
	Failed(RefreshError),
}

impl<S> SessionController<S>
where
	S: ?Sized + IdentityService,
{
	/// Runs the expiry decision on `record` using the current instant.
	pub async fn evaluate(&self, record: SessionToken) -> SessionToken {
		self.evaluate_at(record, OffsetDateTime::now_utc()).await
	}

	/// Runs the expiry decision on `record` as of `now`.
	///
	/// Returns the record unchanged when it is outside the refresh buffer or already errored,
	/// rotated after a successful refresh, or errored after a failed one.
	pub async fn evaluate_at(&self, mut record: SessionToken, now: OffsetDateTime) -> SessionToken {
		self.apply(&mut record, now).await;

		record
	}

	/// Loads, evaluates, and projects the session.
	///
	/// Returns `None` for unknown or signed-out sessions. A failed refresh is reported through
	/// [`SessionView::error`], not as an `Err`.
	pub async fn session(&self, session: &SessionId) -> Result<Option<SessionView>> {
		const KIND: FlowKind = FlowKind::Session;

		let span = FlowSpan::new(KIND, "session");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let view = self.load(session).await?.map(|(record, _)| record.project());

				Ok(view)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Returns a usable access token for an outbound API call.
	///
	/// `Ok(None)` means the session is signed out or already errored. A refresh failing during
	/// this call surfaces as [`Error::RefreshAccessToken`] after the record has been marked.
	pub async fn access_token(&self, session: &SessionId) -> Result<Option<TokenSecret>> {
		const KIND: FlowKind = FlowKind::Session;

		let span = FlowSpan::new(KIND, "access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				match self.load(session).await? {
					Some((_, Evaluation::Failed(err))) => Err(Error::RefreshAccessToken(err)),
					Some((record, _)) => Ok(record.project().access_token),
					None => Ok(None),
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Reports the lifecycle state without refreshing.
	pub async fn state(&self, session: &SessionId) -> Result<SessionState> {
		let state = self
			.store
			.fetch(session)
			.await?
			.map(|record| record.state(self.policy.refresh_buffer))
			.unwrap_or(SessionState::SignedOut);

		Ok(state)
	}

	/// Clears the session record. Signing out an unknown session is not an error.
	pub async fn sign_out(&self, session: &SessionId) -> Result<()> {
		const KIND: FlowKind = FlowKind::SignOut;

		let span = FlowSpan::new(KIND, "sign_out");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.store.remove(session).await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Fetches and evaluates the record, persisting it when the evaluation changed it.
	///
	/// The write-back only lands while the stored record still carries the refresh token the
	/// evaluation started from. A sign-out or sign-in that happened during the refresh wins,
	/// and the current record is returned instead.
	async fn load(&self, session: &SessionId) -> Result<Option<(SessionToken, Evaluation)>> {
		let Some(mut record) = self.store.fetch(session).await? else {
			return Ok(None);
		};
		let expected_refresh = record.refresh_token().clone();
		let evaluation = self.apply(&mut record, OffsetDateTime::now_utc()).await;

		if matches!(evaluation, Evaluation::Unchanged) {
			return Ok(Some((record, evaluation)));
		}

		let swap =
			self.store.compare_and_swap_refresh(session, &expected_refresh, record.clone()).await?;

		match swap {
			CompareAndSwapOutcome::Updated => Ok(Some((record, evaluation))),
			CompareAndSwapOutcome::RefreshMismatch | CompareAndSwapOutcome::Missing => {
				let current = self.store.fetch(session).await?;

				Ok(current.map(|record| (record, Evaluation::Unchanged)))
			},
		}
	}

	async fn apply(&self, record: &mut SessionToken, now: OffsetDateTime) -> Evaluation {
		if !self.policy.should_refresh(record, now) {
			return Evaluation::Unchanged;
		}

		match self.coordinator.get_refreshed_tokens(record.refresh_token()).await {
			Ok(pair) => {
				let expires =
					self.policy.access_expiry(self.decoder.as_ref(), &pair.access_token, now);

				record.rotate(pair, expires, now);

				Evaluation::Rotated
			},
			Err(err) => {
				record.fail_refresh();

				Evaluation::Failed(err)
			},
		}
	}
}
