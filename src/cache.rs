//! Read-through cache for template bytes.
//!
//! Templates are stored elsewhere (object storage, a database) and fetched
//! through a [`TemplateSource`]. Bytes for a given version never change, so
//! concurrent fills need no coordination: the last writer wins.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::Mutex;

use crate::error::Result;

/// Time-to-live used by [`TemplateCache::default`].
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Identifies one version of a stored template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub template_type: String,
    pub template_id: String,
    pub version: u32,
}

impl TemplateKey {
    pub fn new(
        template_type: impl Into<String>,
        template_id: impl Into<String>,
        version: u32,
    ) -> Self {
        Self {
            template_type: template_type.into(),
            template_id: template_id.into(),
            version,
        }
    }
}

/// Where template bytes come from on a cache miss.
pub trait TemplateSource: Send + Sync {
    fn fetch(&self, key: &TemplateKey) -> Result<Vec<u8>>;
}

struct Entry {
    bytes: Arc<[u8]>,
    stored_at: Instant,
}

/// Template bytes keyed by [`TemplateKey`], expiring after a fixed TTL.
pub struct TemplateCache {
    ttl: Duration,
    entries: Mutex<HashMap<TemplateKey, Entry>>,
}

impl TemplateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached bytes for `key` if present and not expired.
    pub fn get(&self, key: &TemplateKey) -> Option<Arc<[u8]>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.bytes.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: TemplateKey, bytes: impl Into<Arc<[u8]>>) -> Arc<[u8]> {
        let bytes = bytes.into();
        self.entries.lock().insert(
            key,
            Entry {
                bytes: bytes.clone(),
                stored_at: Instant::now(),
            },
        );
        bytes
    }

    /// Cached bytes, fetching from `source` on a miss. The lock is not held
    /// while fetching.
    pub fn get_or_fetch(
        &self,
        key: &TemplateKey,
        source: &dyn TemplateSource,
    ) -> Result<Arc<[u8]>> {
        if let Some(bytes) = self.get(key) {
            debug!("Template cache hit for {key:?}");
            return Ok(bytes);
        }
        debug!("Template cache miss for {key:?}; fetching");
        let bytes = source.fetch(key)?;
        Ok(self.insert(key.clone(), bytes))
    }

    /// Drop expired entries.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .lock()
            .retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
