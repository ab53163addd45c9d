//! HTTP response handling.

use serde::{Deserialize, Serialize};

use crate::headers::Headers;

/// An HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: Headers,
    /// The response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new response.
    pub fn new(status: u16, headers: Headers, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Create a response with a status and no headers or body.
    pub fn with_status(status: u16) -> Self {
        Self::new(status, Headers::new(), Vec::new())
    }

    /// Add a header to the response.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace the response body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Check if the response was a client error (4xx status).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16, body: &[u8]) -> HttpResponse {
        HttpResponse::new(status, Headers::new(), body.to_vec())
    }

    // === Status Check Tests ===

    #[test]
    fn test_response_is_client_error() {
        assert!(make_response(400, b"").is_client_error());
        assert!(make_response(499, b"").is_client_error());
        assert!(!make_response(500, b"").is_client_error());
        assert!(!make_response(399, b"").is_client_error());
    }

    // === Builder Tests ===

    #[test]
    fn test_builder_appends_headers_and_replaces_body() {
        let resp = HttpResponse::with_status(200)
            .header("ETag", "\"abc\"")
            .with_body("first")
            .with_body(vec![0xff, 0xfe]);
        assert_eq!(resp.headers.get("etag"), Some("\"abc\""));
        assert_eq!(resp.body, vec![0xff, 0xfe]);
    }
}
