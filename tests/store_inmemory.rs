mod common;

// crates.io
use time::{Duration, macros};
// self
use academy_session::{
	auth::{SessionState, SessionToken, TokenPair, TokenSecret},
	store::{CompareAndSwapOutcome, MemoryStore, SessionStore},
};

fn build_record(access: &str, refresh: &str) -> SessionToken {
	let issued = macros::datetime!(2025-11-10 12:00 UTC);

	SessionToken::builder(common::identity())
		.tokens(TokenPair::new(access, refresh))
		.issued_at(issued)
		.expires_in(Duration::minutes(15))
		.build()
		.expect("Session token fixture should build successfully.")
}

#[tokio::test]
async fn save_fetch_and_replace() {
	let store = MemoryStore::default();
	let id = common::session("cookie-1");

	store
		.save(&id, build_record("access-1", "refresh-1"))
		.await
		.expect("Saving record fixture into memory store should succeed.");
	store
		.save(&id, build_record("access-2", "refresh-2"))
		.await
		.expect("Replacing the record should succeed.");

	let fetched = store
		.fetch(&id)
		.await
		.expect("Fetching the record should succeed.")
		.expect("Stored record should remain present.");

	assert_eq!(fetched, build_record("access-2", "refresh-2"));
	assert_eq!(store.len(), 1);
	assert_eq!(
		fetched.state_at(macros::datetime!(2025-11-10 12:10 UTC), Duration::seconds(60)),
		SessionState::Fresh
	);
}

#[tokio::test]
async fn remove_returns_the_previous_record_once() {
	let store = MemoryStore::default();
	let id = common::session("cookie-2");
	let record = build_record("access-1", "refresh-1");

	store.save(&id, record.clone()).await.expect("Saving should succeed.");

	let removed = store.remove(&id).await.expect("Removing should succeed.");

	assert_eq!(removed, Some(record));
	assert_eq!(store.remove(&id).await.expect("Removing again should succeed."), None);
	assert_eq!(store.fetch(&id).await.expect("Fetching should succeed."), None);
	assert!(store.is_empty());
}

#[tokio::test]
async fn sessions_are_isolated_by_id() {
	let store = MemoryStore::default();
	let (a, b) = (common::session("cookie-a"), common::session("cookie-b"));

	store.save(&a, build_record("access-a", "refresh-a")).await.expect("Saving should succeed.");
	store.save(&b, build_record("access-b", "refresh-b")).await.expect("Saving should succeed.");
	store.remove(&a).await.expect("Removing should succeed.");

	let remaining = store
		.fetch(&b)
		.await
		.expect("Fetching should succeed.")
		.expect("The other session should survive.");

	assert_eq!(remaining, build_record("access-b", "refresh-b"));
}

#[tokio::test]
async fn compare_and_swap_only_replaces_the_expected_refresh_token() {
	let store = MemoryStore::default();
	let id = common::session("cookie-cas");
	let rotated = build_record("access-2", "refresh-2");
	let expected = TokenSecret::new("refresh-1");

	assert_eq!(
		store
			.compare_and_swap_refresh(&id, &expected, rotated.clone())
			.await
			.expect("Swapping against an empty store should succeed."),
		CompareAndSwapOutcome::Missing
	);
	assert!(store.is_empty(), "A missing record must not be recreated.");

	store.save(&id, build_record("access-1", "refresh-1")).await.expect("Saving should succeed.");

	assert_eq!(
		store
			.compare_and_swap_refresh(&id, &expected, rotated.clone())
			.await
			.expect("Swapping should succeed."),
		CompareAndSwapOutcome::Updated
	);
	assert_eq!(
		store
			.compare_and_swap_refresh(&id, &expected, build_record("access-x", "refresh-x"))
			.await
			.expect("Swapping should succeed."),
		CompareAndSwapOutcome::RefreshMismatch
	);
	assert_eq!(store.fetch(&id).await.expect("Fetching should succeed."), Some(rotated));
}

#[test]
fn records_persist_as_json_without_leaking_through_debug() {
	let record = build_record("access-1", "refresh-1");
	let json = serde_json::to_string(&record).expect("Record should serialize.");
	let back: SessionToken = serde_json::from_str(&json).expect("Record should deserialize.");

	assert_eq!(back, record);
	assert!(!format!("{record:?}").contains("refresh-1"));
}
