//! Byte formats for stored variant lists.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use edge_core::{Headers, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::entry::CacheEntry;
use crate::error::{CacheError, CacheResult};
use crate::key::RequestSnapshot;

/// Plain response shape kept in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl StoredResponse {
    /// Copy an entry's payload.
    pub fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            status: entry.status(),
            headers: entry.headers().clone(),
            body: entry.body().to_vec(),
        }
    }

    /// Rebuild the entry as seen at `now`.
    ///
    /// The stored `Date` header is kept, so age keeps growing between reads.
    pub fn to_entry(&self, now: DateTime<Utc>) -> CacheEntry {
        CacheEntry::new(
            HttpResponse::new(self.status, self.headers.clone(), self.body.clone()),
            now,
        )
    }
}

/// One stored `(request snapshot, response)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub request: RequestSnapshot,
    pub response: StoredResponse,
}

/// Converts variant lists to and from bytes.
pub trait Serializer: Send + Sync {
    /// Format name; part of every resource key.
    fn name(&self) -> &str;

    /// Encode a variant list.
    fn dump(&self, records: &[VariantRecord]) -> CacheResult<Vec<u8>>;

    /// Decode a variant list.
    fn load(&self, bytes: &[u8]) -> CacheResult<Vec<VariantRecord>>;
}

/// Textual JSON format.
///
/// Bodies are stored as strings, so a body that is not valid UTF-8 cannot be
/// encoded and `dump` fails instead of mangling it.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

#[derive(Serialize, Deserialize)]
struct JsonResponse {
    status: u16,
    headers: Headers,
    body: String,
}

#[derive(Serialize, Deserialize)]
struct JsonRecord {
    request: RequestSnapshot,
    response: JsonResponse,
}

impl Serializer for JsonSerializer {
    fn name(&self) -> &str {
        "json"
    }

    fn dump(&self, records: &[VariantRecord]) -> CacheResult<Vec<u8>> {
        let mut encoded = Vec::with_capacity(records.len());
        for record in records {
            let body = String::from_utf8(record.response.body.clone()).map_err(|e| {
                CacheError::Serialization(format!("body is not valid UTF-8 ({})", e.utf8_error()))
            })?;
            encoded.push(JsonRecord {
                request: record.request.clone(),
                response: JsonResponse {
                    status: record.response.status,
                    headers: record.response.headers.clone(),
                    body,
                },
            });
        }
        serde_json::to_vec(&encoded).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn load(&self, bytes: &[u8]) -> CacheResult<Vec<VariantRecord>> {
        let decoded: Vec<JsonRecord> =
            serde_json::from_slice(bytes).map_err(|e| CacheError::Deserialization(e.to_string()))?;
        Ok(decoded
            .into_iter()
            .map(|record| VariantRecord {
                request: record.request,
                response: StoredResponse {
                    status: record.response.status,
                    headers: record.response.headers,
                    body: record.response.body.into_bytes(),
                },
            })
            .collect())
    }
}

/// Compact binary format; handles arbitrary body bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeSerializer;

impl Serializer for BincodeSerializer {
    fn name(&self) -> &str {
        "bincode"
    }

    fn dump(&self, records: &[VariantRecord]) -> CacheResult<Vec<u8>> {
        bincode::serialize(records).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn load(&self, bytes: &[u8]) -> CacheResult<Vec<VariantRecord>> {
        bincode::deserialize(bytes).map_err(|e| CacheError::Deserialization(e.to_string()))
    }
}

/// Serializer selection for declarative options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializerKind {
    #[default]
    Json,
    Bincode,
}

impl SerializerKind {
    /// Instantiate the selected format.
    pub fn build(self) -> Arc<dyn Serializer> {
        match self {
            Self::Json => Arc::new(JsonSerializer),
            Self::Bincode => Arc::new(BincodeSerializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use edge_core::HttpRequest;

    fn record(body: &[u8]) -> VariantRecord {
        let request = HttpRequest::get("http://example.com/").header("Accept", "text/plain");
        let response = HttpResponse::with_status(200)
            .header("Cache-Control", "max-age=60")
            .with_body(body.to_vec());
        let captured_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        VariantRecord {
            request: RequestSnapshot::capture(&request, &[]),
            response: StoredResponse::from_entry(&CacheEntry::new(response, captured_at)),
        }
    }

    #[test]
    fn test_json_roundtrip_is_textual() {
        let records = vec![record(b"hello")];
        let bytes = JsonSerializer.dump(&records).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains("\"body\":\"hello\""));
        assert!(text.contains("\"method\":\"GET\""));
        assert_eq!(JsonSerializer.load(&bytes).unwrap(), records);
    }

    #[test]
    fn test_json_rejects_non_utf8_body() {
        let err = JsonSerializer.dump(&[record(&[0xff, 0xfe, 0x00])]).unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_bincode_keeps_binary_body() {
        let records = vec![record(&[0xff, 0xfe, 0x00, 0x7f])];
        let bytes = BincodeSerializer.dump(&records).unwrap();
        assert_eq!(BincodeSerializer.load(&bytes).unwrap(), records);
    }

    #[test]
    fn test_load_garbage_is_deserialization_error() {
        assert!(matches!(
            JsonSerializer.load(b"{not json"),
            Err(CacheError::Deserialization(_))
        ));
        assert!(matches!(
            BincodeSerializer.load(&[0xff; 3]),
            Err(CacheError::Deserialization(_))
        ));
    }

    #[test]
    fn test_stored_response_rebuilds_entry() {
        let original = record(b"x");
        let later = Utc.with_ymd_and_hms(2024, 5, 1, 12, 1, 0).unwrap();
        let entry = original.response.to_entry(later);
        assert_eq!(entry.age(), 60);
        assert_eq!(entry.status(), 200);
        assert_eq!(entry.body(), b"x");
        assert_eq!(StoredResponse::from_entry(&entry), original.response);
    }

    #[test]
    fn test_serializer_kind() {
        assert_eq!(SerializerKind::default(), SerializerKind::Json);
        assert_eq!(SerializerKind::Json.build().name(), "json");
        assert_eq!(SerializerKind::Bincode.build().name(), "bincode");
    }
}
