//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check capacity, expiry, eviction order, invalidation and
//! snapshot properties of `CacheStore`.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, ManualClock, MemorySnapshotStore};

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 2_000;
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);
const START: u64 = 1_700_000_000_000;

fn test_store(max_size: usize) -> (CacheStore, ManualClock) {
    let clock = ManualClock::new(START);
    let store = CacheStore::new(max_size, TEST_DEFAULT_TTL).with_clock(Arc::new(clock.clone()));
    (store, clock)
}

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,32}"
}

/// Generates JSON string values of 3..=202 serialized bytes
fn valid_value_strategy() -> impl Strategy<Value = Value> {
    "[a-zA-Z0-9 ]{1,200}".prop_map(Value::String)
}

fn tag_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["product", "cart", "pricing", "tenant"]).prop_map(String::from)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value, ttl_ms: u64 },
    Get { key: String },
    Delete { key: String },
    Invalidate { tag: String },
    Advance { ms: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy(), 1u64..5_000)
            .prop_map(|(key, value, ttl_ms)| CacheOp::Set { key, value, ttl_ms }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
        tag_strategy().prop_map(|tag| CacheOp::Invalidate { tag }),
        (0u64..2_000).prop_map(|ms| CacheOp::Advance { ms }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits and misses reflect every get; the byte total never exceeds capacity.
    #[test]
    fn prop_statistics_and_capacity(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (mut store, clock) = test_store(TEST_MAX_SIZE);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut written: HashSet<String> = HashSet::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value, ttl_ms } => {
                    let tags = vec![format!("len{}", key.len() % 3)];
                    store.set(key.clone(), value, Some(Duration::from_millis(ttl_ms)), tags).unwrap();
                    written.insert(key);
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Ok(_) => expected_hits += 1,
                    Err(_) => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
                CacheOp::Invalidate { tag } => {
                    store.invalidate_by_tag(&tag);
                }
                CacheOp::Advance { ms } => clock.advance(Duration::from_millis(ms)),
            }
            prop_assert!(
                store.total_size() <= TEST_MAX_SIZE,
                "Total {} exceeds max {}",
                store.total_size(),
                TEST_MAX_SIZE
            );
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");

        // Running total must drain to exactly zero
        for key in &written {
            store.delete(key);
        }
        prop_assert!(store.is_empty());
        prop_assert_eq!(store.total_size(), 0);
    }

    // Writes that fit never evict, and every entry is readable until its TTL.
    #[test]
    fn prop_no_eviction_within_capacity(
        entries in prop::collection::hash_map(valid_key_strategy(), valid_value_strategy(), 1..10),
        ttl_ms in 1u64..10_000
    ) {
        let (mut store, clock) = test_store(TEST_MAX_SIZE);

        for (key, value) in &entries {
            let outcome = store
                .set(key.clone(), value.clone(), Some(Duration::from_millis(ttl_ms)), Vec::new())
                .unwrap();
            prop_assert!(outcome.evicted.is_empty());
        }

        clock.advance(Duration::from_millis(ttl_ms));
        for (key, value) in &entries {
            prop_assert_eq!(&store.get(key).unwrap(), value);
        }

        clock.advance(Duration::from_millis(1));
        for key in entries.keys() {
            prop_assert!(store.get(key).is_err(), "Key '{}' should have expired", key);
        }
        prop_assert!(store.is_empty(), "Expired reads must remove entries");
    }

    // Overwriting keeps one entry holding the newest value.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let (mut store, _) = test_store(TEST_MAX_SIZE);

        store.set(key.clone(), value1, None, Vec::new()).unwrap();
        store.set(key.clone(), value2.clone(), None, Vec::new()).unwrap();

        prop_assert_eq!(store.get(&key).unwrap(), value2.clone());
        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.total_size(), crate::cache::estimate_size(&value2));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // An over-capacity write evicts in ascending expiry order, and only as
    // many entries as it takes to fit.
    #[test]
    fn prop_eviction_order_by_expiry(
        ttls in prop::collection::btree_set(1u64..100_000, 3..12),
        big_ttl in 100_000u64..200_000
    ) {
        // Ten-byte entries with distinct TTLs, listed in insertion order
        let ttls: Vec<u64> = {
            let mut v: Vec<u64> = ttls.into_iter().collect();
            v.reverse();
            v
        };
        let capacity = ttls.len() * 10;
        let (mut store, _) = test_store(capacity);

        for (i, ttl) in ttls.iter().enumerate() {
            store
                .set(format!("k{}", i), json!("12345678"), Some(Duration::from_millis(*ttl)), Vec::new())
                .unwrap();
        }
        prop_assert_eq!(store.total_size(), capacity);

        // Needs three slots freed
        let outcome = store
            .set("big", json!("x".repeat(28)), Some(Duration::from_millis(big_ttl)), Vec::new())
            .unwrap();
        prop_assert!(outcome.stored);
        prop_assert_eq!(outcome.evicted.len(), 3);

        let mut by_ttl: Vec<(u64, String)> = ttls
            .iter()
            .enumerate()
            .map(|(i, ttl)| (*ttl, format!("k{}", i)))
            .collect();
        by_ttl.sort();
        let expected: Vec<String> = by_ttl.iter().take(3).map(|(_, k)| k.clone()).collect();
        prop_assert_eq!(&outcome.evicted, &expected);

        for (_, key) in by_ttl.iter().skip(3) {
            prop_assert!(store.contains(key), "Key '{}' should survive", key);
        }
        prop_assert!(store.total_size() <= capacity);
    }

    // Tag invalidation removes exactly the tagged entries.
    #[test]
    fn prop_invalidate_by_tag_is_exact(
        entries in prop::collection::hash_map(
            valid_key_strategy(),
            prop::collection::btree_set(tag_strategy(), 0..3),
            1..20
        ),
        target in tag_strategy()
    ) {
        let (mut store, _) = test_store(TEST_MAX_SIZE);

        for (key, tags) in &entries {
            store.set(key.clone(), json!(1), None, tags.iter().cloned()).unwrap();
        }

        let expected = entries.values().filter(|tags| tags.contains(&target)).count();
        prop_assert_eq!(store.invalidate_by_tag(&target), expected);

        for (key, tags) in &entries {
            prop_assert_eq!(store.contains(key), !tags.contains(&target));
        }
    }
}

// Snapshot round-trips through a fresh store sharing the same slot
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_snapshot_roundtrip_keeps_live_entries(
        entries in prop::collection::hash_map(
            valid_key_strategy(),
            (valid_value_strategy(), 1u64..10_000),
            1..8
        ),
        elapsed in 0u64..10_000
    ) {
        let clock = ManualClock::new(START);
        let snapshots = MemorySnapshotStore::new();

        let mut first = CacheStore::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL)
            .with_clock(Arc::new(clock.clone()))
            .with_snapshot_store(Box::new(snapshots.clone()));
        for (key, (value, ttl_ms)) in &entries {
            first
                .set(key.clone(), value.clone(), Some(Duration::from_millis(*ttl_ms)), Vec::new())
                .unwrap();
        }

        clock.advance(Duration::from_millis(elapsed));

        let mut second = CacheStore::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL)
            .with_clock(Arc::new(clock.clone()))
            .with_snapshot_store(Box::new(snapshots));

        let live: BTreeSet<&String> = entries
            .iter()
            .filter(|(_, (_, ttl_ms))| elapsed <= *ttl_ms)
            .map(|(key, _)| key)
            .collect();
        prop_assert_eq!(second.len(), live.len());

        let restored: HashMap<String, Value> = live
            .iter()
            .map(|key| ((*key).clone(), second.get(key).unwrap()))
            .collect();
        for (key, value) in restored {
            prop_assert_eq!(&value, &entries[&key].0);
        }
    }
}

// == Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error renders as JSON with a string "error" field.
    #[test]
    fn prop_error_response_format(error_msg in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::CacheError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::NotFound(error_msg.clone()),
            CacheError::Expired(error_msg.clone()),
            CacheError::InvalidRequest(error_msg.clone()),
            CacheError::Persistence(error_msg.clone()),
        ];

        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = tokio_test::block_on(to_bytes(response.into_body(), usize::MAX)).unwrap();
            let json: Value = serde_json::from_slice(&bytes).expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::CacheError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::Expired("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (CacheError::Persistence("disk".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.into_response().status(), expected_status);
        }
    }
}
