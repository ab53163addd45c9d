//! Per-resource variant lists on top of a byte store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use edge_core::HttpRequest;
use edge_observability::CacheLogger;

use crate::entry::CacheEntry;
use crate::error::{CacheError, CacheResult};
use crate::key::{matches_variant, resource_key, CacheKeyFn, RequestSnapshot};
use crate::serializer::{Serializer, StoredResponse, VariantRecord};
use crate::store::ByteStore;

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Stores every `Vary` variant of a resource under one key.
///
/// The read-modify-write in [`VariantStore::write`] is not atomic: two writers
/// racing on the same resource may drop each other's variant, the last write
/// winning.
#[derive(Clone)]
pub struct VariantStore {
    store: Arc<dyn ByteStore>,
    serializer: Arc<dyn Serializer>,
    ignore_headers: Vec<String>,
    cache_key: Option<CacheKeyFn>,
    logger: Arc<dyn CacheLogger>,
    clock: Clock,
}

impl VariantStore {
    pub fn new(
        store: Arc<dyn ByteStore>,
        serializer: Arc<dyn Serializer>,
        ignore_headers: Vec<String>,
        cache_key: Option<CacheKeyFn>,
        logger: Arc<dyn CacheLogger>,
        clock: Clock,
    ) -> Self {
        Self {
            store,
            serializer,
            ignore_headers,
            cache_key,
            logger,
            clock,
        }
    }

    /// Storage key for the resource `request` targets.
    pub fn key_for(&self, request: &HttpRequest) -> String {
        let subject = match &self.cache_key {
            Some(cache_key) => cache_key(request),
            None => request.url.clone(),
        };
        resource_key(self.serializer.name(), &subject)
    }

    /// The stored entry that may answer `request`, if any.
    ///
    /// Unreadable or corrupt stored data is logged and reported as absent.
    pub fn read(&self, request: &HttpRequest) -> Option<CacheEntry> {
        let now = (self.clock)();
        self.records(request)
            .into_iter()
            .map(|record| (record.request, record.response.to_entry(now)))
            .find(|(snapshot, entry)| matches_variant(request, snapshot, entry))
            .map(|(_, entry)| entry)
    }

    /// Store `entry` as the variant for `request`.
    ///
    /// Replaces any record that matches `request` under `Vary` or shares its
    /// fingerprint. When encoding fails, or the existing list cannot be read
    /// from the backend, nothing is written and the existing variants stay
    /// untouched.
    pub fn write(&self, request: &HttpRequest, entry: CacheEntry) -> CacheResult<()> {
        let key = self.key_for(request);
        let snapshot = RequestSnapshot::capture(request, &self.ignore_headers);
        let now = (self.clock)();

        // Corrupt data is overwritten; a failing backend aborts the write.
        let mut records = match self.load(&key) {
            Ok(records) => records,
            Err(CacheError::Deserialization(_)) => Vec::new(),
            Err(err) => return Err(err),
        };
        records.retain(|record| {
            record.request.fingerprint != snapshot.fingerprint
                && !matches_variant(request, &record.request, &record.response.to_entry(now))
        });

        let entry = entry.prepare_for_storage();
        records.push(VariantRecord {
            request: snapshot,
            response: StoredResponse::from_entry(&entry),
        });

        let bytes = self.serializer.dump(&records)?;
        self.store.write(&key, bytes)
    }

    /// Remove every stored variant of the resource `request` targets.
    pub fn delete(&self, request: &HttpRequest) -> CacheResult<()> {
        self.store.delete(&self.key_for(request))
    }

    /// Remove every stored variant for `url`.
    pub fn delete_url(&self, url: &str) -> CacheResult<()> {
        self.delete(&HttpRequest::get(url))
    }

    /// All variant records stored for the resource `request` targets.
    ///
    /// Unreadable or corrupt data is logged and reported as empty.
    pub fn records(&self, request: &HttpRequest) -> Vec<VariantRecord> {
        match self.load(&self.key_for(request)) {
            Ok(records) => records,
            Err(err) => {
                self.logger
                    .warn(&format!("Cached variants could not be read: {}", err));
                Vec::new()
            }
        }
    }

    fn load(&self, key: &str) -> CacheResult<Vec<VariantRecord>> {
        match self.store.read(key)? {
            Some(bytes) => self.serializer.load(&bytes),
            None => Ok(Vec::new()),
        }
    }
}

impl std::fmt::Debug for VariantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantStore")
            .field("store", &self.store.name())
            .field("serializer", &self.serializer.name())
            .field("ignore_headers", &self.ignore_headers)
            .field("cache_key", &self.cache_key.is_some())
            .finish()
    }
}
