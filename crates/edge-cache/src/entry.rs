//! A single cached response and its freshness arithmetic.

use chrono::{DateTime, Utc};
use edge_core::{fmt_http_date, parse_http_date, Headers, HttpResponse};

use crate::directives::{parse_seconds, CacheControl};

/// Status codes that may be stored:
/// 200 OK, 203 Non-Authoritative Information, 300 Multiple Choices,
/// 301 Moved Permanently, 302 Found, 404 Not Found, 410 Gone.
pub const CACHEABLE_STATUS_CODES: [u16; 7] = [200, 203, 300, 301, 302, 404, 410];

/// Headers a 304 is not allowed to change on the stored representation.
const NOT_MODIFIED_IGNORED_HEADERS: [&str; 2] = ["Content-Type", "Content-Length"];

/// One response payload, evaluated at the instant `captured_at`.
///
/// Age, max-age, ttl and freshness are derived on demand; nothing but the
/// payload is stored. A `Date` header is fixed in at first construction and
/// never recomputed, so an entry rebuilt later from storage keeps aging.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    status: u16,
    headers: Headers,
    body: Vec<u8>,
    captured_at: DateTime<Utc>,
    cache_control: CacheControl,
}

impl CacheEntry {
    /// Wrap a response captured at `captured_at`.
    ///
    /// Adds a `Date` header from `captured_at` when the response has none.
    pub fn new(response: HttpResponse, captured_at: DateTime<Utc>) -> Self {
        let HttpResponse {
            status,
            mut headers,
            body,
        } = response;

        if !headers.contains("Date") {
            headers.insert("Date", fmt_http_date(captured_at));
        }
        let cache_control = CacheControl::from_header(headers.get("Cache-Control"));

        Self {
            status,
            headers,
            body,
            captured_at,
            cache_control,
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Response body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The instant this entry is evaluated at.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Parsed `Cache-Control` directives.
    pub fn cache_control(&self) -> &CacheControl {
        &self.cache_control
    }

    /// The `Date` header, or `captured_at` when it cannot be parsed.
    pub fn date(&self) -> DateTime<Utc> {
        self.headers
            .get("Date")
            .and_then(parse_http_date)
            .unwrap_or(self.captured_at)
    }

    /// Age in seconds: the `Age` header if present, else `captured_at - date`.
    ///
    /// Never negative.
    pub fn age(&self) -> i64 {
        let age = match self.headers.get("Age") {
            Some(value) => parse_seconds(value.trim()),
            None => (self.captured_at - self.date()).num_seconds(),
        };
        age.max(0)
    }

    /// Freshness lifetime in seconds.
    ///
    /// `s-maxage`, then `max-age`, then `Expires - Date`. `None` when no
    /// signal is present.
    pub fn max_age(&self) -> Option<i64> {
        self.cache_control
            .shared_max_age()
            .or_else(|| self.cache_control.max_age())
            .or_else(|| self.expires().map(|expires| (expires - self.date()).num_seconds()))
    }

    /// Remaining freshness in seconds, `None` when `max_age` is undefined.
    pub fn ttl(&self) -> Option<i64> {
        self.max_age().map(|max_age| max_age.saturating_sub(self.age()))
    }

    /// Fresh means a strictly positive ttl.
    pub fn fresh(&self) -> bool {
        matches!(self.ttl(), Some(ttl) if ttl > 0)
    }

    /// Whether this response may be stored.
    ///
    /// A shared cache additionally refuses `private` responses.
    pub fn cacheable(&self, shared_cache: bool) -> bool {
        if self.cache_control.no_store() {
            return false;
        }
        if shared_cache && self.cache_control.private() {
            return false;
        }

        CACHEABLE_STATUS_CODES.contains(&self.status) && (self.fresh() || self.has_validator())
    }

    /// Status is 304 Not Modified.
    pub fn not_modified(&self) -> bool {
        self.status == 304
    }

    /// The `Last-Modified` header.
    pub fn last_modified(&self) -> Option<&str> {
        self.headers.get("Last-Modified")
    }

    /// The `ETag` header.
    pub fn etag(&self) -> Option<&str> {
        self.headers.get("ETag")
    }

    /// Carries an `ETag` or `Last-Modified` validator.
    pub fn has_validator(&self) -> bool {
        self.etag().is_some() || self.last_modified().is_some()
    }

    /// All `Vary` values joined, or `None` when absent.
    pub fn vary(&self) -> Option<String> {
        self.headers.get_joined("Vary")
    }

    /// Normalize the entry before it is persisted.
    ///
    /// Subtracts an `Age` header from `max-age`/`s-maxage` and drops it, so
    /// the stored lifetime is measured from this entry's own `Date`.
    pub fn prepare_for_storage(mut self) -> Self {
        if let Some(age) = self.headers.get("Age").map(|v| parse_seconds(v.trim())) {
            self.cache_control.normalize_max_ages(age);
            self.headers.remove("Age");
            if !self.cache_control.is_empty() {
                self.headers
                    .insert("Cache-Control", self.cache_control.to_string());
            }
        }
        self
    }

    /// Build the entry served after a 304 revalidation.
    ///
    /// Keeps this entry's status and body; headers from the 304 overwrite the
    /// stored ones, except those a 304 may not change.
    pub fn revalidated(&self, not_modified: &HttpResponse, captured_at: DateTime<Utc>) -> Self {
        let mut update = not_modified.headers.clone();
        for name in NOT_MODIFIED_IGNORED_HEADERS {
            update.remove(name);
        }

        let mut headers = self.headers.clone();
        headers.merge(&update);

        Self::new(
            HttpResponse::new(self.status, headers, self.body.clone()),
            captured_at,
        )
    }

    /// Materialize the entry as a response.
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse::new(self.status, self.headers.clone(), self.body.clone())
    }

    /// Consume the entry into a response.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::new(self.status, self.headers, self.body)
    }

    fn expires(&self) -> Option<DateTime<Utc>> {
        self.headers.get("Expires").and_then(parse_http_date)
    }
}
