//! Header storage shared by [`Request`](super::Request) and
//! [`Response`](super::Response).
//!
//! Backed by `reqwest::header::HeaderMap` so the crate's wire-level types
//! interoperate directly with the transport, matching the teacher's header
//! utilities in `execution/http/headers.rs`. Spec.md §3 calls the header
//! map "case-preserving"; `HeaderMap` normalizes names to lowercase on
//! insertion, so this type is case-*insensitive* rather than
//! case-*preserving* — `iter()`/`canonical_sorted()` surface lowercased
//! names. This is an accepted deviation from a literal reading of the spec
//! (the teacher's own header map makes the same trade), not a guarantee
//! this type actually honors; see DESIGN.md.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

use crate::error::ClientError;

/// A case-insensitive header map (see the module-level deviation note:
/// `HeaderMap` lowercases names rather than preserving their case).
///
/// `insert` is last-write-wins (overwrites any existing values for the
/// name); `append` adds a value without removing prior ones, for headers
/// that are legitimately multi-valued.
#[derive(Debug, Clone, Default)]
pub struct Headers(HeaderMap);

impl Headers {
    pub fn new() -> Self {
        Self(HeaderMap::new())
    }

    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::encoding(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::encoding(format!("invalid header value '{value}': {e}")))?;
        self.0.insert(name, value);
        Ok(())
    }

    pub fn append(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::encoding(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::encoding(format!("invalid header value '{value}': {e}")))?;
        self.0.append(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) {
        self.0.remove(name);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_header_map(&self) -> &HeaderMap {
        &self.0
    }

    pub fn into_header_map(self) -> HeaderMap {
        self.0
    }

    /// Merge `extra` into `self`; each entry overrides an existing value of
    /// the same (case-insensitive) name, matching `merge_headers` in the
    /// teacher's header utilities.
    pub fn merge(&mut self, extra: &Headers) {
        for (name, value) in extra.0.iter() {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// A stable, sorted `name:value` representation used for cache keys and
    /// deduplication fingerprints.
    pub fn canonical_sorted(&self) -> String {
        let mut pairs: Vec<(String, String)> = self
            .0
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_lowercase(), v.to_string())))
            .collect();
        pairs.sort();
        pairs
            .into_iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str(), v)))
    }

    pub fn to_hashmap(&self) -> HashMap<String, String> {
        self.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Self {
        Self(map)
    }
}
