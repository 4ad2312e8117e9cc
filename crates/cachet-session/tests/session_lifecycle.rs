//! End-to-end session lifecycle tests against in-process backends.
//!
//! These tests verify:
//! - Attribute reads and writes across requests
//! - Prefix isolation over a shared backend
//! - Renewal, destruction and hand-off between contexts
//! - Degradation on corrupt records and propagation of backend failures
//! - The read-modify-write races the store deliberately does not close

mod common;

use std::sync::Arc;

use cachet_session::{
    AesDataEncrypter, Error, MemoryCache, MemoryContext, SESSION_ID_KEY, SessionContext,
    SessionStore, StoreConfig,
};
use serde_json::json;

use common::{DownCache, GatedCache, RecordingCache, store_over};

// ─────────────────────────────────────────────────────────────────────────────
// Attributes
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_distinct_attributes_both_survive() {
    let store = store_over(Arc::new(MemoryCache::new()), &StoreConfig::default());
    let mut ctx = MemoryContext::new();

    store.set(&mut ctx, "a", json!(1)).await.unwrap();
    store.set(&mut ctx, "b", json!(2)).await.unwrap();

    assert_eq!(store.get(&mut ctx, "a").await.unwrap(), Some(json!(1)));
    assert_eq!(store.get(&mut ctx, "b").await.unwrap(), Some(json!(2)));
}

#[tokio::test]
async fn test_attributes_follow_client_across_requests() {
    let store = store_over(Arc::new(MemoryCache::new()), &StoreConfig::default());
    let mut first = MemoryContext::new();
    store.set(&mut first, "profile", json!({"id": "u-1"})).await.unwrap();

    let mut second = first.next_request();
    assert_eq!(
        store.get(&mut second, "profile").await.unwrap(),
        Some(json!({"id": "u-1"}))
    );
}

#[tokio::test]
async fn test_ids_resolved_from_request_attribute_share_data() {
    let store = store_over(Arc::new(MemoryCache::new()), &StoreConfig::default());
    let mut ctx = MemoryContext::new();
    store.set(&mut ctx, "k", json!("v")).await.unwrap();
    let id = store.get_or_create_session_id(&mut ctx);

    // Same request, client session not yet committed
    let mut in_flight = MemoryContext::new();
    in_flight.set_request_attribute(SESSION_ID_KEY, Some(id.to_string()));

    assert_eq!(store.get(&mut in_flight, "k").await.unwrap(), Some(json!("v")));
    assert_eq!(
        in_flight.client_session_value(SESSION_ID_KEY),
        Some(id.to_string())
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Keys, prefixes and TTL
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_prefix_isolation_over_shared_backend() {
    let cache = Arc::new(MemoryCache::new());
    let key = Arc::new(AesDataEncrypter::new(&[3u8; 16]).unwrap());
    let a = SessionStore::with_config(
        cache.clone(),
        key.clone(),
        &StoreConfig::new().with_prefix("a:"),
    );
    let b = SessionStore::with_config(
        cache.clone(),
        key,
        &StoreConfig::new().with_prefix("b:"),
    );

    let mut ctx_a = MemoryContext::new();
    a.set(&mut ctx_a, "k", json!("from-a")).await.unwrap();

    // Same session id presented to the other store
    let mut ctx_b = ctx_a.next_request();
    assert_eq!(b.get(&mut ctx_b, "k").await.unwrap(), None);

    b.set(&mut ctx_b, "k", json!("from-b")).await.unwrap();
    assert_eq!(a.get(&mut ctx_a, "k").await.unwrap(), Some(json!("from-a")));
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_writes_use_prefixed_key() {
    let cache = Arc::new(RecordingCache::new());
    let store = store_over(cache.clone(), &StoreConfig::new().with_prefix("pac:"));
    let mut ctx = MemoryContext::new();

    store.set(&mut ctx, "k", json!(1)).await.unwrap();
    let id = store.get_or_create_session_id(&mut ctx);

    let sets = cache.sets();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].key, format!("pac:{id}"));
}

#[tokio::test]
async fn test_default_ttl_passed_to_backend() {
    let cache = Arc::new(RecordingCache::new());
    let store = store_over(cache.clone(), &StoreConfig::default());
    let mut ctx = MemoryContext::new();

    store.set(&mut ctx, "k", json!(1)).await.unwrap();

    assert_eq!(cache.sets()[0].ttl_secs, 3600);
}

#[tokio::test]
async fn test_set_timeout_applies_to_subsequent_writes() {
    let cache = Arc::new(RecordingCache::new());
    let mut store = store_over(cache.clone(), &StoreConfig::default());
    let mut ctx = MemoryContext::new();

    store.set(&mut ctx, "before", json!(1)).await.unwrap();
    store.set_timeout(10);
    assert_eq!(store.timeout(), 10);
    store.set(&mut ctx, "after", json!(2)).await.unwrap();

    let ttls: Vec<u64> = cache.sets().iter().map(|s| s.ttl_secs).collect();
    assert_eq!(ttls, vec![3600, 10]);
}

#[tokio::test(start_paused = true)]
async fn test_session_data_expires_with_ttl() {
    let store = store_over(
        Arc::new(MemoryCache::new()),
        &StoreConfig::new().with_timeout(30),
    );
    let mut ctx = MemoryContext::new();
    store.set(&mut ctx, "k", json!("v")).await.unwrap();

    tokio::time::advance(std::time::Duration::from_secs(31)).await;

    assert_eq!(store.get(&mut ctx, "k").await.unwrap(), None);
}

#[tokio::test]
async fn test_very_large_timeouts_still_store() {
    let mut store = store_over(Arc::new(MemoryCache::new()), &StoreConfig::default());
    let mut ctx = MemoryContext::new();

    store.set_timeout(u64::MAX);
    store.set(&mut ctx, "max", json!(1)).await.unwrap();
    assert_eq!(store.get(&mut ctx, "max").await.unwrap(), Some(json!(1)));

    let store = store_over(
        Arc::new(MemoryCache::new()),
        &StoreConfig::new().with_timeout(i64::MAX as u64),
    );
    store.set(&mut ctx, "i64", json!(2)).await.unwrap();
    assert_eq!(store.get(&mut ctx, "i64").await.unwrap(), Some(json!(2)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Destroy, renew, hand-off
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_destroy_on_fresh_context_is_false() {
    let store = store_over(Arc::new(MemoryCache::new()), &StoreConfig::default());
    let mut ctx = MemoryContext::new();

    assert!(!store.destroy_session(&mut ctx));
    assert!(!store.destroy_session(&mut ctx));
}

#[tokio::test]
async fn test_destroy_orphans_record_in_backend() {
    let cache = Arc::new(RecordingCache::new());
    let store = store_over(cache.clone(), &StoreConfig::default());
    let mut ctx = MemoryContext::new();
    store.set(&mut ctx, "k", json!("v")).await.unwrap();
    let id = store.get_or_create_session_id(&mut ctx);

    assert!(store.destroy_session(&mut ctx));

    // The client forgot the session; the record waits for its TTL
    assert!(cache.raw(&store.cache_key(&id)).await.is_some());
    let new_id = store.get_or_create_session_id(&mut ctx);
    assert_ne!(id, new_id);
    assert_eq!(store.get(&mut ctx, "k").await.unwrap(), None);
}

#[tokio::test]
async fn test_renew_preserves_data_and_changes_identity() {
    let cache = Arc::new(RecordingCache::new());
    let store = store_over(cache.clone(), &StoreConfig::default());
    let mut ctx = MemoryContext::new();

    store.set(&mut ctx, "k", json!("v")).await.unwrap();
    let id1 = store.get_or_create_session_id(&mut ctx);

    assert!(store.renew_session(&mut ctx).await.unwrap());

    let id2 = store.get_or_create_session_id(&mut ctx);
    assert_ne!(id1, id2);
    assert_eq!(store.get(&mut ctx, "k").await.unwrap(), Some(json!("v")));

    // Old record is copied, not moved
    assert!(cache.raw(&store.cache_key(&id1)).await.is_some());
    assert_eq!(
        ctx.client_session_value(SESSION_ID_KEY),
        Some(id2.to_string())
    );
}

#[tokio::test]
async fn test_renewed_session_is_independent_of_old_id() {
    let store = store_over(Arc::new(MemoryCache::new()), &StoreConfig::default());
    let mut ctx = MemoryContext::new();
    store.set(&mut ctx, "k", json!(1)).await.unwrap();
    let mut stale = ctx.next_request();

    store.renew_session(&mut ctx).await.unwrap();
    store.set(&mut ctx, "k", json!(2)).await.unwrap();

    assert_eq!(store.get(&mut stale, "k").await.unwrap(), Some(json!(1)));
    assert_eq!(store.get(&mut ctx, "k").await.unwrap(), Some(json!(2)));
}

#[tokio::test]
async fn test_trackable_hand_off() {
    let store = store_over(Arc::new(MemoryCache::new()), &StoreConfig::default());
    let mut ctx_a = MemoryContext::new();
    store.set(&mut ctx_a, "k", json!("v")).await.unwrap();

    let handle = store.trackable_session(&mut ctx_a).unwrap();
    let mut ctx_b = MemoryContext::new();
    let rebound = store.build_from_trackable_session(&mut ctx_b, &handle);

    assert_eq!(
        rebound.get_or_create_session_id(&mut ctx_b),
        store.get_or_create_session_id(&mut ctx_a)
    );
    assert_eq!(rebound.get(&mut ctx_b, "k").await.unwrap(), Some(json!("v")));
}

// ─────────────────────────────────────────────────────────────────────────────
// Failure handling
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_corrupt_record_reads_as_absent() {
    let cache = Arc::new(RecordingCache::new());
    let store = store_over(cache.clone(), &StoreConfig::default());
    let mut ctx = MemoryContext::new();
    let id = store.get_or_create_session_id(&mut ctx);

    cache
        .inject(&store.cache_key(&id), b"definitely not ciphertext".to_vec())
        .await;

    assert_eq!(store.get(&mut ctx, "k").await.unwrap(), None);

    // A write replaces the corrupt record with a fresh map
    store.set(&mut ctx, "k", json!("v")).await.unwrap();
    assert_eq!(store.get(&mut ctx, "k").await.unwrap(), Some(json!("v")));
}

#[tokio::test]
async fn test_backend_failure_propagates() {
    let store = store_over(Arc::new(DownCache), &StoreConfig::default());
    let mut ctx = MemoryContext::new();

    assert!(matches!(
        store.get(&mut ctx, "k").await,
        Err(Error::StoreUnavailable(_))
    ));
    assert!(matches!(
        store.set(&mut ctx, "k", json!(1)).await,
        Err(Error::StoreUnavailable(_))
    ));
    assert!(matches!(
        store.renew_session(&mut ctx).await,
        Err(Error::StoreUnavailable(_))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Races
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_sets_lose_an_update() {
    let store = store_over(Arc::new(GatedCache::new(2)), &StoreConfig::default());
    let mut tab_a = MemoryContext::new();
    store.get_or_create_session_id(&mut tab_a);
    let mut tab_b = tab_a.next_request();

    // Both calls read the empty map before either writes back
    let (ra, rb) = tokio::join!(
        store.set(&mut tab_a, "a", json!(1)),
        store.set(&mut tab_b, "b", json!(2)),
    );
    ra.unwrap();
    rb.unwrap();

    let a = store.get(&mut tab_a, "a").await.unwrap();
    let b = store.get(&mut tab_a, "b").await.unwrap();
    assert!(
        a.is_some() ^ b.is_some(),
        "exactly one attribute should survive, got a={a:?} b={b:?}"
    );
}

#[tokio::test]
async fn test_write_racing_renewal_is_lost_from_new_session() {
    let store = store_over(Arc::new(GatedCache::new(2)), &StoreConfig::default());
    let mut renewing = MemoryContext::new();
    let old_id = store.get_or_create_session_id(&mut renewing);
    let mut late_writer = renewing.next_request();

    let (renewed, written) = tokio::join!(
        store.renew_session(&mut renewing),
        store.set(&mut late_writer, "late", json!(true)),
    );
    assert!(renewed.unwrap());
    written.unwrap();

    assert_ne!(store.get_or_create_session_id(&mut renewing), old_id);
    assert_eq!(store.get(&mut renewing, "late").await.unwrap(), None);
    assert_eq!(
        store.get(&mut late_writer, "late").await.unwrap(),
        Some(json!(true))
    );
}
