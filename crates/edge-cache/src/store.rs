//! Byte-store backends.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{CacheError, CacheResult};

/// Operations a backend supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapabilities {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

impl StoreCapabilities {
    /// Every operation supported.
    pub const fn full() -> Self {
        Self {
            read: true,
            write: true,
            delete: true,
        }
    }

    /// Name of the first unsupported operation, if any.
    pub fn missing(&self) -> Option<&'static str> {
        if !self.read {
            Some("read")
        } else if !self.write {
            Some("write")
        } else if !self.delete {
            Some("delete")
        } else {
            None
        }
    }
}

impl Default for StoreCapabilities {
    fn default() -> Self {
        Self::full()
    }
}

/// Key/value backend holding serialized variant lists.
///
/// Calls may block on I/O. Implementations must tolerate concurrent callers;
/// the cache takes no lock around them.
pub trait ByteStore: Send + Sync {
    /// Read the bytes stored under `key`.
    fn read(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: Vec<u8>) -> CacheResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> CacheResult<()>;

    /// Operations this backend supports; checked when the cache is built.
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::full()
    }

    /// Human-readable backend name for diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<S: ByteStore + ?Sized> ByteStore for Arc<S> {
    fn read(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: Vec<u8>) -> CacheResult<()> {
        (**self).write(key, value)
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        (**self).delete(key)
    }

    fn capabilities(&self) -> StoreCapabilities {
        (**self).capabilities()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Process-local backend.
///
/// Entries live as long as the store; nothing is shared between processes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteStore for MemoryStore {
    fn read(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|e| CacheError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: Vec<u8>) -> CacheResult<()> {
        let mut entries = self.entries.write().map_err(|e| CacheError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        let mut entries = self.entries.write().map_err(|e| CacheError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "MemoryStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_read_write_delete() {
        let store = MemoryStore::new();
        assert!(store.read("k").unwrap().is_none());

        store.write("k", b"v1".to_vec()).unwrap();
        store.write("k", b"v2".to_vec()).unwrap();
        assert_eq!(store.read("k").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(store.len(), 1);

        store.delete("k").unwrap();
        store.delete("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_shared_across_threads() {
        let store = Arc::new(MemoryStore::new());
        std::thread::scope(|scope| {
            for i in 0..8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    store.write(&format!("k{}", i), vec![i as u8]).unwrap();
                });
            }
        });
        assert_eq!(store.len(), 8);
        assert_eq!(store.read("k3").unwrap(), Some(vec![3]));
    }

    #[test]
    fn test_capabilities_missing() {
        assert_eq!(StoreCapabilities::full().missing(), None);
        let read_only = StoreCapabilities {
            read: true,
            write: false,
            delete: false,
        };
        assert_eq!(read_only.missing(), Some("write"));
        assert_eq!(MemoryStore::new().capabilities(), StoreCapabilities::full());
        assert_eq!(MemoryStore::new().name(), "MemoryStore");
    }
}
