//! The request-processing state machine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use edge_core::{HttpRequest, HttpResponse, Transport};
use edge_observability::{CacheLogger, NullLogger};

use crate::config::{check_ignore_headers, CacheOptions};
use crate::directives::CacheControl;
use crate::entry::CacheEntry;
use crate::error::{CacheError, ConfigError};
use crate::key::CacheKeyFn;
use crate::serializer::{JsonSerializer, Serializer};
use crate::store::{ByteStore, MemoryStore};
use crate::trace::{CacheAction, Trace};
use crate::variants::{Clock, VariantStore};

const MEMORY_STORE_WARNING: &str = "No cache store was configured, falling back to an in-memory \
store. Entries are lost on restart and are not shared between processes.";

/// Result of one [`HttpCache::call`].
#[derive(Debug)]
pub struct CacheOutcome {
    /// Response served to the caller.
    pub response: HttpResponse,
    /// Decisions taken, in order.
    pub trace: Trace,
    /// A failed write. The response is still valid, only uncached.
    pub store_error: Option<CacheError>,
}

/// Per-call state. Never shared between calls.
struct RequestContext {
    request: HttpRequest,
    trace: Trace,
    store_error: Option<CacheError>,
}

impl RequestContext {
    fn new(request: HttpRequest) -> Self {
        Self {
            request,
            trace: Trace::new(),
            store_error: None,
        }
    }

    fn finish(self, response: HttpResponse) -> CacheOutcome {
        CacheOutcome {
            response,
            trace: self.trace,
            store_error: self.store_error,
        }
    }
}

/// HTTP response cache in front of a [`Transport`].
///
/// One instance may be shared by any number of threads. Concurrent misses
/// for the same resource each fetch and store; the last write wins.
pub struct HttpCache {
    transport: Arc<dyn Transport>,
    variants: VariantStore,
    logger: Arc<dyn CacheLogger>,
    shared_cache: bool,
    clock: Clock,
}

impl HttpCache {
    /// Start configuring a cache around `transport`.
    pub fn builder(transport: impl Transport + 'static) -> HttpCacheBuilder {
        HttpCacheBuilder::new(Arc::new(transport))
    }

    /// Whether `private` responses are refused.
    pub fn shared_cache(&self) -> bool {
        self.shared_cache
    }

    /// Direct access to stored variants.
    pub fn variants(&self) -> &VariantStore {
        &self.variants
    }

    /// Process one request.
    ///
    /// Transport errors are returned unchanged. Storage failures never fail
    /// the call; a failed write is reported in [`CacheOutcome::store_error`].
    pub fn call(&self, request: HttpRequest) -> anyhow::Result<CacheOutcome> {
        let mut ctx = RequestContext::new(request);
        let directives = CacheControl::from_header(ctx.request.headers.get("Cache-Control"));

        let response = if !ctx.request.method.is_cacheable() || directives.no_store() {
            self.bypass(&mut ctx)?
        } else {
            self.process(&mut ctx, &directives)?
        };

        self.logger.debug(&ctx.trace.log_line(&ctx.request));
        Ok(ctx.finish(response))
    }

    fn bypass(&self, ctx: &mut RequestContext) -> anyhow::Result<HttpResponse> {
        ctx.trace.push(CacheAction::Unacceptable);
        let response = self.transport.forward(&ctx.request)?;

        if ctx.request.method.is_unsafe() && !response.is_client_error() {
            self.invalidate(ctx, &response);
        }
        Ok(response)
    }

    fn process(
        &self,
        ctx: &mut RequestContext,
        directives: &CacheControl,
    ) -> anyhow::Result<HttpResponse> {
        match self.variants.read(&ctx.request) {
            None => {
                ctx.trace.push(CacheAction::Miss);
                let response = self.transport.forward(&ctx.request)?;
                let entry = CacheEntry::new(response, self.now());
                Ok(self.store(ctx, entry))
            }
            Some(entry) if entry.fresh() && !directives.no_cache() => {
                ctx.trace.push(CacheAction::Fresh);
                Ok(entry.into_response())
            }
            Some(entry) => self.validate(ctx, entry),
        }
    }

    fn validate(&self, ctx: &mut RequestContext, stored: CacheEntry) -> anyhow::Result<HttpResponse> {
        let mut conditional = ctx.request.clone();
        if let Some(last_modified) = stored.last_modified() {
            conditional.headers.insert("If-Modified-Since", last_modified);
        }
        if let Some(etag) = stored.etag() {
            conditional.headers.insert("If-None-Match", etag);
        }

        let response = self.transport.forward(&conditional)?;
        let now = self.now();

        let entry = if response.status == 304 {
            ctx.trace.push(CacheAction::Valid);
            stored.revalidated(&response, now)
        } else {
            ctx.trace.push(CacheAction::Miss);
            CacheEntry::new(response, now)
        };
        Ok(self.store(ctx, entry))
    }

    fn store(&self, ctx: &mut RequestContext, entry: CacheEntry) -> HttpResponse {
        if !entry.cacheable(self.shared_cache) {
            ctx.trace.push(CacheAction::Invalid);
            return entry.into_response();
        }

        ctx.trace.push(CacheAction::Store);
        let response = entry.to_response();
        if let Err(err) = self.variants.write(&ctx.request, entry) {
            match &err {
                CacheError::Serialization(reason) => self.logger.warn(&format!(
                    "Response could not be serialized: {}. Try using the bincode serializer.",
                    reason
                )),
                other => self
                    .logger
                    .warn(&format!("Response could not be stored: {}", other)),
            }
            ctx.store_error = Some(err);
        }
        response
    }

    fn invalidate(&self, ctx: &mut RequestContext, response: &HttpResponse) {
        let mut urls = vec![ctx.request.url.clone()];
        for name in ["Location", "Content-Location"] {
            if let Some(target) = response.headers.get(name) {
                urls.push(resolve(&ctx.request.url, target));
            }
        }

        for url in &urls {
            if let Err(err) = self.variants.delete_url(url) {
                self.logger
                    .warn(&format!("Cached variants for {} could not be deleted: {}", url, err));
            }
        }
        ctx.trace.push(CacheAction::Delete);
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl std::fmt::Debug for HttpCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCache")
            .field("variants", &self.variants)
            .field("shared_cache", &self.shared_cache)
            .finish()
    }
}

// Relative `Location` values are resolved against the request URL.
fn resolve(base: &str, target: &str) -> String {
    url::Url::parse(base)
        .and_then(|base| base.join(target))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| target.to_string())
}

/// Builder for [`HttpCache`].
pub struct HttpCacheBuilder {
    transport: Arc<dyn Transport>,
    store: Option<Arc<dyn ByteStore>>,
    serializer: Arc<dyn Serializer>,
    logger: Arc<dyn CacheLogger>,
    shared_cache: bool,
    ignore_headers: Vec<String>,
    cache_key: Option<CacheKeyFn>,
    clock: Clock,
}

impl HttpCacheBuilder {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            store: None,
            serializer: Arc::new(JsonSerializer),
            logger: Arc::new(NullLogger),
            shared_cache: true,
            ignore_headers: Vec::new(),
            cache_key: None,
            clock: Arc::new(Utc::now),
        }
    }

    /// Backend for stored variants. Defaults to a [`MemoryStore`].
    pub fn store(mut self, store: impl ByteStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Storage format. Defaults to JSON.
    pub fn serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Receiver for trace lines and warnings.
    pub fn logger(mut self, logger: impl CacheLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn shared_cache(mut self, shared_cache: bool) -> Self {
        self.shared_cache = shared_cache;
        self
    }

    /// Request headers left out of fingerprints.
    pub fn ignore_headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_headers = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the URL as the resource-key subject.
    pub fn cache_key<F>(mut self, cache_key: F) -> Self
    where
        F: Fn(&HttpRequest) -> String + Send + Sync + 'static,
    {
        self.cache_key = Some(Arc::new(cache_key));
        self
    }

    pub fn clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Apply declarative options over the current settings.
    pub fn options(mut self, options: CacheOptions) -> Self {
        self.shared_cache = options.shared_cache;
        self.ignore_headers = options.ignore_headers;
        self.serializer = options.serializer.build();
        self
    }

    /// Validate the configuration and build the cache.
    pub fn build(self) -> Result<HttpCache, ConfigError> {
        check_ignore_headers(&self.ignore_headers)?;

        let store = match self.store {
            Some(store) => {
                if let Some(missing) = store.capabilities().missing() {
                    return Err(ConfigError::InvalidStore {
                        store: store.name().to_string(),
                        missing: missing.to_string(),
                    });
                }
                store
            }
            None => {
                self.logger.warn(MEMORY_STORE_WARNING);
                Arc::new(MemoryStore::new())
            }
        };

        let variants = VariantStore::new(
            store,
            self.serializer,
            self.ignore_headers,
            self.cache_key,
            Arc::clone(&self.logger),
            Arc::clone(&self.clock),
        );

        Ok(HttpCache {
            transport: self.transport,
            variants,
            logger: self.logger,
            shared_cache: self.shared_cache,
            clock: self.clock,
        })
    }
}
