//! Cache entry domain model.

use chrono::{DateTime, Datelike, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::request_key::{compute_key, RequestParams};
use crate::domain::errors::CacheResult;

/// Opaque serialized payload of an upstream response.
///
/// The cache stores and returns this text verbatim; only consumers decode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CachedPayload(String);

impl CachedPayload {
    /// Wrap text that is already serialized.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Serialize a value into a payload. Fails rather than storing a partial value.
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> CacheResult<Self> {
        Ok(Self(serde_json::to_string(value)?))
    }

    /// Decode the payload into a consumer type.
    pub fn decode<T: DeserializeOwned>(&self) -> CacheResult<T> {
        Ok(serde_json::from_str(&self.0)?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A persisted cache row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub endpoint: String,
    /// Canonical JSON of the request parameters.
    pub params: String,
    pub value: CachedPayload,
    pub created_at: DateTime<Utc>,
    /// `None` means the entry never expires until invalidated.
    pub expires_at: Option<DateTime<Utc>>,
    pub access_count: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Build a fresh entry for `(endpoint, params)` created at `now`.
    pub fn new(
        endpoint: &str,
        params: &RequestParams,
        value: CachedPayload,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key: compute_key(endpoint, params),
            endpoint: endpoint.to_string(),
            params: params.canonical(),
            value,
            created_at: now,
            expires_at: expiry_for(now, ttl),
            access_count: 0,
            last_accessed_at: None,
        }
    }

    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            created_at: self.created_at,
            expires_at: self.expires_at,
            access_count: self.access_count,
            last_accessed_at: self.last_accessed_at,
        }
    }
}

/// Last year whose timestamps keep the fixed-width stored form.
const MAX_EXPIRY_YEAR: i32 = 9999;

/// Compute the expiry instant for a TTL.
///
/// A missing or zero TTL never expires. A TTL that lands past year 9999, or
/// is too large to represent at all, is treated the same way: stored
/// timestamps are compared as text and a five-digit year would sort before
/// every real one.
pub fn expiry_for(now: DateTime<Utc>, ttl: Option<Duration>) -> Option<DateTime<Utc>> {
    let ttl = ttl.filter(|d| !d.is_zero())?;
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .filter(|expires| expires.year() <= MAX_EXPIRY_YEAR)
}

/// Entry bookkeeping returned alongside a hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub access_count: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit {
        payload: CachedPayload,
        metadata: EntryMetadata,
    },
    Miss,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    pub fn payload(&self) -> Option<&CachedPayload> {
        match self {
            Self::Hit { payload, .. } => Some(payload),
            Self::Miss => None,
        }
    }

    pub fn metadata(&self) -> Option<&EntryMetadata> {
        match self {
            Self::Hit { metadata, .. } => Some(metadata),
            Self::Miss => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_encode_decode() {
        let payload = CachedPayload::encode(&json!([{"id": 1}])).unwrap();
        assert_eq!(payload.as_str(), r#"[{"id":1}]"#);
        let decoded: serde_json::Value = payload.decode().unwrap();
        assert_eq!(decoded, json!([{"id": 1}]));
    }

    #[test]
    fn test_payload_encode_rejects_non_string_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "pair");
        assert!(CachedPayload::encode(&map).is_err());
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let now = Utc::now();
        assert_eq!(expiry_for(now, None), None);
        assert_eq!(expiry_for(now, Some(Duration::ZERO)), None);
    }

    #[test]
    fn test_ttl_sets_expiry() {
        let now = Utc::now();
        let expires = expiry_for(now, Some(Duration::from_secs(1800))).unwrap();
        assert_eq!((expires - now).num_seconds(), 1800);
    }

    #[test]
    fn test_ttl_past_year_9999_never_expires() {
        let now = Utc::now();
        assert_eq!(expiry_for(now, Some(Duration::from_secs(1_000_000_000_000))), None);
        assert_eq!(expiry_for(now, Some(Duration::from_secs(u64::MAX))), None);
        assert!(expiry_for(now, Some(Duration::from_secs(100 * 365 * 86_400))).is_some());
    }

    #[test]
    fn test_new_entry_fields() {
        let params = RequestParams::new().with("fixture", 7);
        let entry = CacheEntry::new("odds", &params, CachedPayload::from_raw("{}"), None, Utc::now());
        assert_eq!(entry.key, r#"odds:{"fixture":7}"#);
        assert_eq!(entry.params, r#"{"fixture":7}"#);
        assert_eq!(entry.access_count, 0);
        assert!(entry.last_accessed_at.is_none());
    }

    #[test]
    fn test_lookup_accessors() {
        assert!(!CacheLookup::Miss.is_hit());
        assert!(CacheLookup::Miss.payload().is_none());
    }
}
