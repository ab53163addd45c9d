//! Per-request decision trace.

use std::fmt;

use edge_core::HttpRequest;
use serde::{Deserialize, Serialize};

/// One decision taken while processing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheAction {
    /// Request bypassed the cache.
    Unacceptable,
    /// No usable stored response.
    Miss,
    /// Served from storage without contacting the origin.
    Fresh,
    /// Origin confirmed the stored response with a 304.
    Valid,
    /// Response was not cacheable and was not stored.
    Invalid,
    /// Response was written to storage.
    Store,
    /// Stored variants were removed.
    Delete,
}

impl CacheAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unacceptable => "unacceptable",
            Self::Miss => "miss",
            Self::Fresh => "fresh",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Store => "store",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for CacheAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of actions for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace(Vec<CacheAction>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action.
    pub fn push(&mut self, action: CacheAction) {
        self.0.push(action);
    }

    /// Recorded actions, oldest first.
    pub fn actions(&self) -> &[CacheAction] {
        &self.0
    }

    pub fn contains(&self, action: CacheAction) -> bool {
        self.0.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Operator log line: `HTTP Cache: [GET /path?q] miss, store`.
    pub fn log_line(&self, request: &HttpRequest) -> String {
        format!(
            "HTTP Cache: [{} {}] {}",
            request.method,
            request.request_uri(),
            self
        )
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<&str> = self.0.iter().map(CacheAction::as_str).collect();
        f.write_str(&actions.join(", "))
    }
}

impl From<Vec<CacheAction>> for Trace {
    fn from(actions: Vec<CacheAction>) -> Self {
        Self(actions)
    }
}
