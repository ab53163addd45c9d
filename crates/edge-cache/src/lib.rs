//! HTTP response cache for the edge client stack.
//!
//! This crate provides:
//! - `HttpCache` - Serves fresh responses, revalidates stale ones, stores the rest
//! - `CacheEntry` - Age, max-age, ttl, freshness and cacheability of one response
//! - `CacheControl` - `Cache-Control` directive parsing
//! - `VariantStore` - `Vary`-aware variant lists over a `ByteStore`
//! - `JsonSerializer` / `BincodeSerializer` - Storage formats
//!
//! # Example
//!
//! ```ignore
//! use edge_cache::{BincodeSerializer, HttpCache};
//! use edge_core::{FnTransport, HttpRequest, HttpResponse};
//! use edge_observability::TracingLogger;
//!
//! let transport = FnTransport(|req: &HttpRequest| fetch(req));
//! let cache = HttpCache::builder(transport)
//!     .serializer(BincodeSerializer)
//!     .logger(TracingLogger)
//!     .shared_cache(false)
//!     .build()?;
//!
//! let outcome = cache.call(HttpRequest::get("https://example.com/products"))?;
//! println!("{}", outcome.trace); // "miss, store"
//! ```

mod cache;
mod config;
mod directives;
mod entry;
mod error;
mod key;
mod serializer;
mod store;
mod trace;
mod variants;

pub use cache::*;
pub use config::*;
pub use directives::*;
pub use entry::*;
pub use error::*;
pub use key::*;
pub use serializer::*;
pub use store::*;
pub use trace::*;
pub use variants::*;
