use proptest::prelude::*;
use serde_json::Value;
use sportcache::{compute_key, EndpointClass, RequestParams, TtlPolicy};

fn param_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z0-9-]{0,12}".prop_map(Value::from),
    ]
}

fn param_pairs() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map("[a-z_]{1,8}", param_value(), 0..8)
        .prop_map(|map| map.into_iter().collect())
}

proptest! {
    /// Property: the key ignores parameter insertion order
    #[test]
    fn prop_key_independent_of_insertion_order(
        pairs in param_pairs(),
        endpoint in "[a-z/]{1,20}",
    ) {
        let forward: RequestParams = pairs.iter().cloned().collect();
        let reversed: RequestParams = pairs.iter().rev().cloned().collect();

        prop_assert_eq!(compute_key(&endpoint, &forward), compute_key(&endpoint, &reversed));
    }

    /// Property: nested objects are canonicalized too
    #[test]
    fn prop_nested_object_order_ignored(pairs in param_pairs()) {
        let mut forward = serde_json::Map::new();
        for (k, v) in &pairs {
            forward.insert(k.clone(), v.clone());
        }
        let mut reversed = serde_json::Map::new();
        for (k, v) in pairs.iter().rev() {
            reversed.insert(k.clone(), v.clone());
        }

        let a = RequestParams::new().with("filter", Value::Object(forward));
        let b = RequestParams::new().with("filter", Value::Object(reversed));
        prop_assert_eq!(compute_key("fixtures", &a), compute_key("fixtures", &b));
    }

    /// Property: different endpoints never share a key
    #[test]
    fn prop_endpoint_is_part_of_key(
        pairs in param_pairs(),
        a in "[a-z]{1,10}",
        b in "[a-z]{1,10}",
    ) {
        prop_assume!(a != b);
        let params: RequestParams = pairs.into_iter().collect();
        prop_assert_ne!(compute_key(&a, &params), compute_key(&b, &params));
    }

    /// Property: the key always starts with `endpoint:`
    #[test]
    fn prop_key_prefixed_by_endpoint(pairs in param_pairs(), endpoint in "[a-z]{1,10}") {
        let params: RequestParams = pairs.into_iter().collect();
        let key = compute_key(&endpoint, &params);
        let prefix = format!("{endpoint}:");
        prop_assert!(key.starts_with(&prefix));
    }

    /// Property: any endpoint with a truthy `live` flag gets the live TTL
    #[test]
    fn prop_live_flag_selects_live_ttl(endpoint in "(fixtures|odds|predictions|teams)") {
        let params = RequestParams::new().with("live", true);
        prop_assert_eq!(EndpointClass::classify(&endpoint, &params), EndpointClass::Live);
        prop_assert_eq!(
            TtlPolicy::default().ttl_for_request(&endpoint, &params),
            Some(std::time::Duration::from_secs(300))
        );
    }
}
