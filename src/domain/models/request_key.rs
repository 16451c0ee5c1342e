//! Request fingerprinting.
//!
//! A cache key is derived from the endpoint name and a canonical rendering of
//! the request parameters. Parameters are kept in a sorted map and nested JSON
//! objects are re-sorted before serialization, so two parameter sets that
//! differ only in insertion order always produce the same key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Separator between the endpoint and the serialized parameters in a key.
pub const KEY_SEPARATOR: char = ':';

/// Parameters of a logical upstream request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(BTreeMap<String, Value>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Render the parameters as query-string pairs.
    ///
    /// Strings are passed through as-is, every other value uses its JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), rendered)
            })
            .collect()
    }

    /// Canonical compact JSON of the parameters, with every object level sorted.
    pub fn canonical(&self) -> String {
        let sorted: Map<String, Value> = self
            .0
            .iter()
            .map(|(name, value)| (name.clone(), canonicalize(value)))
            .collect();
        Value::Object(sorted).to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BTreeMap<String, Value>> for RequestParams {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl fmt::Display for RequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Rebuild a JSON value with object keys inserted in sorted order.
///
/// `serde_json` keeps insertion order when its `preserve_order` feature is
/// enabled anywhere in the dependency graph, so sorting is done here rather
/// than relying on the map implementation.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut names: Vec<&String> = map.keys().collect();
            names.sort();
            let sorted: Map<String, Value> = names
                .into_iter()
                .map(|name| (name.clone(), canonicalize(&map[name])))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Derive the cache key for a request: `endpoint:canonical_params`.
pub fn compute_key(endpoint: &str, params: &RequestParams) -> String {
    format!("{endpoint}{KEY_SEPARATOR}{}", params.canonical())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_format() {
        let params = RequestParams::new().with("date", "2024-01-01");
        assert_eq!(compute_key("fixtures", &params), r#"fixtures:{"date":"2024-01-01"}"#);
    }

    #[test]
    fn test_empty_params() {
        assert_eq!(compute_key("leagues", &RequestParams::new()), "leagues:{}");
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = RequestParams::new().with("league", 39).with("season", 2024).with("team", 33);
        let b: RequestParams = vec![("team", json!(33)), ("league", json!(39)), ("season", json!(2024))]
            .into_iter()
            .collect();
        assert_eq!(compute_key("fixtures", &a), compute_key("fixtures", &b));
    }

    #[test]
    fn test_nested_objects_are_sorted() {
        let a = RequestParams::new().with("filter", json!({"z": 1, "a": {"y": true, "b": false}}));
        assert_eq!(a.canonical(), r#"{"filter":{"a":{"b":false,"y":true},"z":1}}"#);
        let b = RequestParams::new().with("filter", json!({"a": {"b": false, "y": true}, "z": 1}));
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_different_values_give_different_keys() {
        let a = RequestParams::new().with("date", "2024-01-01");
        let b = RequestParams::new().with("date", "2024-01-02");
        assert_ne!(compute_key("fixtures", &a), compute_key("fixtures", &b));
    }

    #[test]
    fn test_endpoint_namespaces_key() {
        let params = RequestParams::new().with("fixture", 1);
        assert_ne!(compute_key("odds", &params), compute_key("predictions", &params));
    }

    #[test]
    fn test_string_and_number_are_distinct() {
        let a = RequestParams::new().with("league", 39);
        let b = RequestParams::new().with("league", "39");
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_query_pairs() {
        let params = RequestParams::new().with("season", 2024).with("date", "2024-01-01");
        assert_eq!(
            params.query_pairs(),
            vec![
                ("date".to_string(), "2024-01-01".to_string()),
                ("season".to_string(), "2024".to_string()),
            ]
        );
    }
}
