//! Core HTTP abstractions shared by the edge caching crates.
//!
//! This crate provides the value types the cache works with:
//! - `Headers` - Ordered, case-insensitive header multimap
//! - `HttpRequest` / `Method` - The outgoing request as seen by the cache
//! - `HttpResponse` - Status, headers and body
//! - `Transport` trait - The network collaborator the cache forwards to
//! - `parse_http_date` / `fmt_http_date` - HTTP-date helpers

mod date;
mod headers;
mod request;
mod response;
mod transport;

pub use date::*;
pub use headers::*;
pub use request::*;
pub use response::*;
pub use transport::*;
