//! Content Store (spec §4.5): content-addressed blob cache with LRU
//! eviction, plus the inline/reference envelope policy it backs (§4.4
//! "Content policy").

use crate::config::ContentConfig;
use crate::error::{NetError, Result};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::SystemTime;
use strand_core::cid::Cid;
use strand_core::identifiers::NodeId;
use strand_core::wire::{ContentEnvelope, ContentReference};

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    mime: String,
    created_by: String,
    created_at: SystemTime,
}

#[derive(Debug, Clone)]
pub struct ContentMetadata {
    pub size: u64,
    pub mime: String,
    pub created_by: String,
    pub created_at: SystemTime,
}

/// Single-mutex LRU blob cache; eviction runs synchronously during `put`
/// (spec §5 "Content store: single mutex plus an LRU intrusive list").
pub struct ContentStore {
    config: ContentConfig,
    blobs: parking_lot::Mutex<LruCache<Cid, StoredBlob>>,
    total_size: parking_lot::Mutex<usize>,
}

impl ContentStore {
    pub fn new(config: ContentConfig) -> Self {
        Self {
            config,
            // Capacity bounds entry count as a safety valve; byte-size
            // eviction below is the actual `MaxSize` enforcement.
            blobs: parking_lot::Mutex::new(LruCache::new(NonZeroUsize::new(1 << 20).unwrap())),
            total_size: parking_lot::Mutex::new(0),
        }
    }

    /// Idempotent: re-putting identical bytes yields the same CID and does
    /// not grow the store (spec §8 scenario 6 "Content dedup").
    pub fn put(&self, bytes: Vec<u8>, mime: impl Into<String>, created_by: impl Into<String>) -> Cid {
        let cid = Cid::of(&bytes);
        let mut blobs = self.blobs.lock();
        if blobs.contains(&cid) {
            blobs.promote(&cid);
            return cid;
        }

        let size = bytes.len();
        blobs.put(
            cid.clone(),
            StoredBlob {
                bytes,
                mime: mime.into(),
                created_by: created_by.into(),
                created_at: SystemTime::now(),
            },
        );
        drop(blobs);

        let mut total = self.total_size.lock();
        *total += size;
        self.evict_while_over_budget(&mut total);
        cid
    }

    fn evict_while_over_budget(&self, total: &mut usize) {
        if *total <= self.config.max_size {
            return;
        }
        let mut blobs = self.blobs.lock();
        while *total > self.config.max_size {
            let Some((_, evicted)) = blobs.pop_lru() else {
                break;
            };
            *total -= evicted.bytes.len();
        }
    }

    pub fn get(&self, cid: &Cid) -> Option<Vec<u8>> {
        self.blobs.lock().get(cid).map(|b| b.bytes.clone())
    }

    pub fn has(&self, cid: &Cid) -> bool {
        self.blobs.lock().contains(cid)
    }

    pub fn delete(&self, cid: &Cid) {
        if let Some(removed) = self.blobs.lock().pop(cid) {
            *self.total_size.lock() -= removed.bytes.len();
        }
    }

    pub fn get_metadata(&self, cid: &Cid) -> Option<ContentMetadata> {
        self.blobs.lock().peek(cid).map(|b| ContentMetadata {
            size: b.bytes.len() as u64,
            mime: b.mime.clone(),
            created_by: b.created_by.clone(),
            created_at: b.created_at,
        })
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies the inline/reference split: payloads at or above
    /// `ContentConfig::content_threshold` are stored and referenced by CID;
    /// smaller payloads travel inline.
    pub fn wrap_content(&self, bytes: Vec<u8>, node_id: NodeId) -> ContentEnvelope {
        if bytes.len() < self.config.content_threshold {
            return ContentEnvelope::Inline { bytes };
        }
        let size = bytes.len() as u64;
        let cid = self.put(bytes, "application/octet-stream", node_id.to_string());
        ContentEnvelope::Reference {
            reference: ContentReference {
                cid,
                size,
                mime: "application/octet-stream".into(),
                created_by: node_id.to_string(),
            },
        }
    }

    /// Resolves an envelope to bytes. References are resolved by local
    /// lookup; the pull-from-creator-peer path is injected by the caller
    /// via `fetch` (spec: "pull endpoint omitted from core spec").
    pub async fn unwrap_content<F, Fut>(&self, envelope: ContentEnvelope, fetch: F) -> Result<Vec<u8>>
    where
        F: FnOnce(ContentReference) -> Fut,
        Fut: std::future::Future<Output = Result<Vec<u8>>>,
    {
        match envelope {
            ContentEnvelope::Inline { bytes } => Ok(bytes),
            ContentEnvelope::Reference { reference } => {
                if let Some(bytes) = self.get(&reference.cid) {
                    return Ok(bytes);
                }
                fetch(reference).await
            }
        }
    }

    pub fn validate_cid(cid: &Cid, bytes: &[u8]) -> bool {
        cid.validate(bytes)
    }
}

pub fn not_found() -> NetError {
    NetError::NotFound
}
