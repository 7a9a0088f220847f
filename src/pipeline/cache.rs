/*!
 * Content-addressed transformation cache.
 *
 * Two tiers: a fast bounded in-memory map and a slower persisted SQLite
 * tier. Keys are built from provider id, target language, termbase flag and
 * a SHA-256 digest of the content, so raw content never lands in a key.
 * Expiry is lazy: expired entries are reported absent and only capacity
 * eviction actually removes anything. Eviction follows insertion order, an
 * accepted approximation of LRU given the small batch sizes involved.
 */

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::app_config::Language;
use crate::storage::CacheStore;

/// TTL for translation results
pub const TRANSLATION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// TTL for polish results; polishing is more expensive and less
/// time-sensitive than live translation
pub const POLISH_TTL: Duration = Duration::from_secs(48 * 60 * 60);

/// Memory-tier capacity for the translation cache
pub const TRANSLATION_CAPACITY: usize = 500;

/// Memory-tier capacity for the polish cache
pub const POLISH_CAPACITY: usize = 100;

/// Build the composite cache key. The content goes in as a digest only.
pub fn build_key(provider: &str, target: Language, termbase: bool, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!(
        "{}:{}:{}:{:x}",
        provider,
        target.code(),
        if termbase { 1 } else { 0 },
        hasher.finalize()
    )
}

/// One memory-tier entry
#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
    /// Insertion sequence, used to skip stale eviction-queue slots
    seq: u64,
}

/// Bounded insertion-ordered memory tier
#[derive(Debug, Default)]
struct MemoryTier {
    map: HashMap<String, MemoryEntry>,
    order: VecDeque<(String, u64)>,
    next_seq: u64,
}

impl MemoryTier {
    fn insert(&mut self, key: String, value: String, expires_at: Instant, capacity: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.map.insert(key.clone(), MemoryEntry { value, expires_at, seq });
        self.order.push_back((key, seq));

        while self.map.len() > capacity {
            let Some((old_key, old_seq)) = self.order.pop_front() else {
                break;
            };
            // A re-inserted key leaves a stale slot in the queue; only evict
            // if the slot still describes the live entry
            if self.map.get(&old_key).is_some_and(|e| e.seq == old_seq) {
                self.map.remove(&old_key);
            }
        }
    }
}

/// Two-tier TTL cache shared by the translation and polish stages (one
/// instance each, with their own capacities and TTLs)
pub struct TransformCache {
    memory: Mutex<MemoryTier>,
    store: Option<Arc<dyn CacheStore>>,
    capacity: usize,
    ttl: Duration,
    hits: Mutex<usize>,
    misses: Mutex<usize>,
}

impl TransformCache {
    /// Create a cache with a persisted tier
    pub fn new(capacity: usize, ttl: Duration, store: Arc<dyn CacheStore>) -> Self {
        Self {
            memory: Mutex::new(MemoryTier::default()),
            store: Some(store),
            capacity,
            ttl,
            hits: Mutex::new(0),
            misses: Mutex::new(0),
        }
    }

    /// Create a memory-only cache (used by tests and cache-less runs)
    pub fn memory_only(capacity: usize, ttl: Duration) -> Self {
        Self {
            memory: Mutex::new(MemoryTier::default()),
            store: None,
            capacity,
            ttl,
            hits: Mutex::new(0),
            misses: Mutex::new(0),
        }
    }

    /// Look up a value, promoting persisted hits into the memory tier
    pub fn get(
        &self,
        provider: &str,
        target: Language,
        termbase: bool,
        content: &str,
    ) -> Option<String> {
        self.get_at(provider, target, termbase, content, Instant::now())
    }

    pub(crate) fn get_at(
        &self,
        provider: &str,
        target: Language,
        termbase: bool,
        content: &str,
        now: Instant,
    ) -> Option<String> {
        let key = build_key(provider, target, termbase, content);

        {
            let memory = self.memory.lock();
            if let Some(entry) = memory.map.get(&key) {
                if now < entry.expires_at {
                    *self.hits.lock() += 1;
                    debug!("Cache hit (memory) for {}", key);
                    return Some(entry.value.clone());
                }
                // Expired: absent, left in place until capacity evicts it
            }
        }

        if let Some(store) = &self.store {
            let now_ms = chrono::Utc::now().timestamp_millis();
            match store.get(&key, now_ms) {
                Ok(Some((value, expires_ms))) => {
                    // Promote with the remaining lifetime so a persisted hit
                    // never outlives what set() originally granted it
                    let remaining = Duration::from_millis((expires_ms - now_ms).max(0) as u64);
                    let mut memory = self.memory.lock();
                    memory.insert(
                        key.clone(),
                        value.clone(),
                        now + remaining.min(self.ttl),
                        self.capacity,
                    );
                    *self.hits.lock() += 1;
                    debug!("Cache hit (persisted) for {}", key);
                    return Some(value);
                }
                Ok(None) => {}
                Err(e) => warn!("Persisted cache read failed for {}: {}", key, e),
            }
        }

        *self.misses.lock() += 1;
        debug!("Cache miss for {}", key);
        None
    }

    /// Store a value in both tiers with `expiry = now + ttl`
    pub fn set(&self, provider: &str, target: Language, termbase: bool, content: &str, value: &str) {
        self.set_at(provider, target, termbase, content, value, Instant::now());
    }

    pub(crate) fn set_at(
        &self,
        provider: &str,
        target: Language,
        termbase: bool,
        content: &str,
        value: &str,
        now: Instant,
    ) {
        let key = build_key(provider, target, termbase, content);

        {
            let mut memory = self.memory.lock();
            memory.insert(key.clone(), value.to_string(), now + self.ttl, self.capacity);
        }

        if let Some(store) = &self.store {
            let now_ms = chrono::Utc::now().timestamp_millis();
            let expires_ms = now_ms + self.ttl.as_millis() as i64;
            if let Err(e) = store.set(&key, value, expires_ms, now_ms) {
                warn!("Persisted cache write failed for {}: {}", key, e);
            }
        }
    }

    /// Empty both tiers immediately. Used by the explicit cache-reset action.
    pub fn clear(&self) {
        {
            let mut memory = self.memory.lock();
            memory.map.clear();
            memory.order.clear();
        }
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                warn!("Persisted cache clear failed: {}", e);
            }
        }
        debug!("Transformation cache cleared");
    }

    /// Number of live entries in the memory tier
    pub fn len(&self) -> usize {
        self.memory.lock().map.len()
    }

    /// Whether the memory tier is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (hits, misses) counters
    pub fn stats(&self) -> (usize, usize) {
        (*self.hits.lock(), *self.misses.lock())
    }
}

impl std::fmt::Debug for TransformCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}
