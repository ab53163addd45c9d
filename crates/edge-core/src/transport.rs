//! Transport collaborator.

use std::sync::Arc;

use crate::request::HttpRequest;
use crate::response::HttpResponse;

/// Performs the actual network round-trip for requests the cache cannot serve.
///
/// Errors are opaque to the cache: they are handed back to the caller exactly
/// as the transport produced them.
pub trait Transport: Send + Sync {
    /// Forward a request and return the origin's response.
    fn forward(&self, request: &HttpRequest) -> anyhow::Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn forward(&self, request: &HttpRequest) -> anyhow::Result<HttpResponse> {
        (**self).forward(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn forward(&self, request: &HttpRequest) -> anyhow::Result<HttpResponse> {
        (**self).forward(request)
    }
}

/// Adapter turning a closure into a [`Transport`].
pub struct FnTransport<F>(pub F);

impl<F> Transport for FnTransport<F>
where
    F: Fn(&HttpRequest) -> anyhow::Result<HttpResponse> + Send + Sync,
{
    fn forward(&self, request: &HttpRequest) -> anyhow::Result<HttpResponse> {
        (self.0)(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_transport_forwards() {
        let transport = FnTransport(|req: &HttpRequest| {
            Ok(HttpResponse::with_status(200).with_body(req.url.clone()))
        });
        let resp = transport.forward(&HttpRequest::get("http://a/b")).unwrap();
        assert_eq!(resp.body, b"http://a/b");
    }

    #[test]
    fn test_transport_error_passes_through_arc() {
        let transport: Arc<dyn Transport> =
            Arc::new(FnTransport(|_: &HttpRequest| Err(anyhow::anyhow!("connection refused"))));
        let err = transport.forward(&HttpRequest::get("http://a/")).unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }
}
