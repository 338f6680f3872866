use std::{
    num::NonZeroUsize,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use lru::LruCache;

use crate::{
    assets::decode::{DecodedImage, ImageDecoder},
    foundation::error::{StoryError, StoryResult},
};

/// Default number of decoded images kept resident.
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 3;

/// Counters describing cache traffic since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// `get` calls served from a resident entry.
    pub hits: u64,
    /// `get` calls that had to decode.
    pub misses: u64,
    /// Entries dropped to make room for a newer one.
    pub evictions: u64,
    /// Decodes that failed and were not cached.
    pub decode_failures: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    decode_failures: AtomicU64,
}

/// Fixed-capacity, least-recently-used cache of decoded images.
///
/// Misses decode synchronously through the injected [`ImageDecoder`]. The decode runs outside the
/// internal lock, so misses on different keys proceed in parallel; concurrent misses on the same
/// key may both decode, and the first insertion wins. Failed decodes are never cached.
pub struct ImageCache {
    decoder: Arc<dyn ImageDecoder>,
    entries: Mutex<LruCache<String, Arc<DecodedImage>>>,
    counters: Counters,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("capacity", &self.capacity())
            .field("resident", &self.resident_keys())
            .field("stats", &self.stats())
            .finish()
    }
}

impl ImageCache {
    /// Build a cache holding at most `capacity` decoded images.
    pub fn new(capacity: usize, decoder: Arc<dyn ImageDecoder>) -> StoryResult<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| StoryError::validation("image cache capacity must be > 0"))?;
        Ok(Self {
            decoder,
            entries: Mutex::new(LruCache::new(capacity)),
            counters: Counters::default(),
        })
    }

    /// Build a cache with [`DEFAULT_IMAGE_CACHE_CAPACITY`].
    pub fn with_default_capacity(decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            decoder,
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(DEFAULT_IMAGE_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            )),
            counters: Counters::default(),
        }
    }

    /// Return the image for `key`, decoding it on a miss.
    ///
    /// A hit marks the entry most recently used. A miss inserts the decoded image as most
    /// recently used, evicting the least recently used entry when the cache is full.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get(&self, key: &str) -> StoryResult<Arc<DecodedImage>> {
        if key.is_empty() {
            return Err(StoryError::validation("image cache key must be non-empty"));
        }

        if let Some(hit) = self.lock().get(key).cloned() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key, "image cache hit");
            return Ok(hit);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key, "image cache miss, decoding");
        let decoded = match self.decoder.decode(key) {
            Ok(img) => Arc::new(img),
            Err(err) => {
                self.counters.decode_failures.fetch_add(1, Ordering::Relaxed);
                return Err(err);
            }
        };

        let mut entries = self.lock();
        if let Some(raced) = entries.get(key) {
            // Another caller inserted the same key while we were decoding.
            return Ok(Arc::clone(raced));
        }
        if let Some((evicted, _)) = entries.push(key.to_string(), Arc::clone(&decoded)) {
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key, evicted = %evicted, "image cache evicted entry");
        }
        Ok(decoded)
    }

    /// True if `key` is resident. Does not change recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    /// Resident keys ordered from least to most recently used.
    pub fn resident_keys(&self) -> Vec<String> {
        let entries = self.lock();
        let mut keys: Vec<String> = entries.iter().map(|(k, _)| k.clone()).collect();
        keys.reverse();
        keys
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            decode_failures: self.counters.decode_failures.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<DecodedImage>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
