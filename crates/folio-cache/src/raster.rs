//! RAM bitmap cache with LRU eviction under a byte budget.

use folio_render::{Bitmap, RasterKey};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Configuration for a raster cache instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Total byte budget across all documents.
    pub memory_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { memory_limit: 128 * 1024 * 1024 }
    }
}

impl CacheConfig {
    pub fn with_mb_limit(megabytes: usize) -> Self {
        Self { memory_limit: megabytes * 1024 * 1024 }
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of bitmaps currently cached
    pub entry_count: usize,

    /// Total bytes held by cached bitmaps
    pub memory_used: usize,

    /// Configured byte budget
    pub memory_limit: usize,

    /// Number of cache hits
    pub hits: u64,

    /// Number of cache misses
    pub misses: u64,

    /// Number of entries evicted under memory pressure
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn memory_utilization(&self) -> f64 {
        if self.memory_limit == 0 {
            0.0
        } else {
            self.memory_used as f64 / self.memory_limit as f64
        }
    }
}

struct CacheState {
    entries: HashMap<RasterKey, Arc<Bitmap>>,

    /// LRU queue: least recently used at front, most recent at back.
    lru_queue: VecDeque<RasterKey>,

    memory_used: usize,
    memory_limit: usize,
    stats: CacheStats,
}

impl CacheState {
    fn new(memory_limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru_queue: VecDeque::new(),
            memory_used: 0,
            memory_limit,
            stats: CacheStats { memory_limit, ..Default::default() },
        }
    }

    fn touch(&mut self, key: RasterKey) {
        self.lru_queue.retain(|&k| k != key);
        self.lru_queue.push_back(key);
    }

    fn evict_lru(&mut self) -> bool {
        let Some(key) = self.lru_queue.pop_front() else {
            return false;
        };

        if let Some(bitmap) = self.entries.remove(&key) {
            self.memory_used = self.memory_used.saturating_sub(bitmap.byte_size());
            self.stats.evictions += 1;
        }
        true
    }

    fn evict_to_fit(&mut self, required_size: usize) {
        while self.memory_used + required_size > self.memory_limit && !self.entries.is_empty() {
            if !self.evict_lru() {
                break;
            }
        }
    }

    fn sync_stats(&mut self) {
        self.stats.entry_count = self.entries.len();
        self.stats.memory_used = self.memory_used;
    }
}

/// Thread-shared bitmap cache with LRU eviction.
///
/// Cloning shares the underlying state; two caches created with `new` are
/// fully independent, which is what keeps per-canvas instances from
/// contaminating each other.
#[derive(Clone)]
pub struct RasterCache {
    state: Arc<Mutex<CacheState>>,
}

impl RasterCache {
    pub fn new(config: CacheConfig) -> Self {
        Self { state: Arc::new(Mutex::new(CacheState::new(config.memory_limit))) }
    }

    /// Look up a bitmap, marking it most recently used on hit.
    pub fn get(&self, key: &RasterKey) -> Option<Arc<Bitmap>> {
        let mut state = self.lock();

        if let Some(bitmap) = state.entries.get(key).cloned() {
            state.stats.hits += 1;
            state.touch(*key);
            Some(bitmap)
        } else {
            state.stats.misses += 1;
            None
        }
    }

    /// Check for a key without touching LRU order or hit statistics.
    pub fn contains(&self, key: &RasterKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Insert a bitmap, evicting least-recently-used entries until it fits.
    ///
    /// A bitmap larger than the entire budget is not admitted; it would
    /// only flush the cache without ever fitting.
    pub fn insert(&self, key: RasterKey, bitmap: Bitmap) -> Option<Arc<Bitmap>> {
        let size = bitmap.byte_size();
        let mut state = self.lock();

        if size > state.memory_limit {
            log::debug!(
                "raster bitmap for page {} exceeds cache budget ({size} > {})",
                key.page_index,
                state.memory_limit
            );
            return None;
        }

        if let Some(previous) = state.entries.remove(&key) {
            state.memory_used = state.memory_used.saturating_sub(previous.byte_size());
            state.lru_queue.retain(|&k| k != key);
        }

        state.evict_to_fit(size);

        let shared = Arc::new(bitmap);
        state.memory_used += size;
        state.entries.insert(key, shared.clone());
        state.touch(key);
        state.sync_stats();

        Some(shared)
    }

    /// Drop every entry. This is the document-swap path: the whole cache
    /// goes, not just the old document's entries.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.lru_queue.clear();
        state.memory_used = 0;
        state.sync_stats();
    }

    pub fn stats(&self) -> CacheStats {
        let mut state = self.lock();
        state.sync_stats();
        state.stats
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
