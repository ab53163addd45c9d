//! Resource keys, request fingerprints and `Vary` matching.

use std::sync::Arc;

use edge_core::{Headers, HttpRequest, Method};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::entry::CacheEntry;

/// Custom resource-key function; replaces the URL as the key subject.
pub type CacheKeyFn = Arc<dyn Fn(&HttpRequest) -> String + Send + Sync>;

/// Storage key for every variant of one resource.
///
/// A SHA-256 hex digest over the serializer name and the key subject (the
/// request URL unless a custom key function is configured).
pub fn resource_key(namespace: &str, subject: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update([0u8]);
    hasher.update(subject.as_bytes());
    hex::encode(hasher.finalize())
}

/// Stable content hash of a request.
///
/// Covers method, URL and every header not listed in `ignored_headers`.
/// Headers are sorted by lowercased name first, so insertion order and name
/// casing never change the result.
pub fn fingerprint(request: &HttpRequest, ignored_headers: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.method.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(request.url.as_bytes());
    hasher.update([0u8]);

    for (name, value) in request.headers.sorted_pairs() {
        if ignored_headers.iter().any(|h| h.eq_ignore_ascii_case(&name)) {
            continue;
        }
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    }

    hex::encode(hasher.finalize())
}

/// The parts of a request kept alongside a stored response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    /// Request method.
    pub method: Method,
    /// Request URL.
    pub url: String,
    /// Request headers as sent.
    pub headers: Headers,
    /// Fingerprint computed with the cache's ignored headers.
    pub fingerprint: String,
}

impl RequestSnapshot {
    /// Snapshot a request.
    pub fn capture(request: &HttpRequest, ignored_headers: &[String]) -> Self {
        Self {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            fingerprint: fingerprint(request, ignored_headers),
        }
    }
}

/// Whether a stored variant may answer `request`.
///
/// Methods must be equal. A stored `Vary` that is absent or empty matches;
/// one containing `*` matches nothing. Otherwise every header named in `Vary`
/// must carry the same (joined) value on both requests, absent on both sides
/// counting as equal.
pub fn matches_variant(request: &HttpRequest, snapshot: &RequestSnapshot, entry: &CacheEntry) -> bool {
    if request.method != snapshot.method {
        return false;
    }

    let vary = match entry.vary() {
        Some(vary) => vary,
        None => return true,
    };

    let names: Vec<&str> = vary
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|name| !name.is_empty())
        .collect();

    if names.contains(&"*") {
        return false;
    }

    names.iter().all(|name| {
        request.headers.get_joined(name) == snapshot.headers.get_joined(name)
    })
}
