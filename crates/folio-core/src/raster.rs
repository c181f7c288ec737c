//! Raster service: the UI-thread face of background page rendering.
//!
//! Requests check the cache first; misses are queued for the worker pool.
//! Completions are drained on the UI thread by `poll_completions`, which
//! re-validates the generation (and the document identity encoded in the
//! key) before committing a bitmap, so nothing rendered for a swapped-out
//! document ever reaches a view.

use canvas_core::SizeF;
use folio_cache::{CacheConfig, CacheStats, RasterCache};
use folio_render::{Bitmap, RasterKey, SharedDocument};
use folio_scheduler::{
    CompletedRender, RenderPriority, RenderQueue, RenderWorkerPool, WorkerPoolConfig,
};
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};

pub struct RasterService {
    cache: RasterCache,
    queue: Arc<Mutex<RenderQueue>>,
    pool: Option<RenderWorkerPool>,
    results: Receiver<CompletedRender>,
    document: Option<SharedDocument>,
    generation: u64,
    device_scale: f32,
    /// Keys that failed this generation; they keep their placeholder
    /// instead of being re-queued on every frame.
    failed: HashSet<RasterKey>,
}

impl RasterService {
    pub fn new(
        cache_config: CacheConfig,
        pool_config: WorkerPoolConfig,
        device_scale: f32,
    ) -> Self {
        let queue = Arc::new(Mutex::new(RenderQueue::new()));
        let (sender, results) = mpsc::channel();
        let pool = RenderWorkerPool::new(queue.clone(), sender, pool_config);

        Self {
            cache: RasterCache::new(cache_config),
            queue,
            pool: Some(pool),
            results,
            document: None,
            generation: 0,
            device_scale: if device_scale > 0.0 { device_scale } else { 1.0 },
            failed: HashSet::new(),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn document(&self) -> Option<&SharedDocument> {
        self.document.as_ref()
    }

    pub fn set_device_scale(&mut self, scale: f32) {
        if scale > 0.0 {
            self.device_scale = scale;
        }
    }

    /// Swap the active document. The entire cache is invalidated, not just
    /// the old document's entries, and the queue starts a new generation
    /// so in-flight renders for the old document are discarded on arrival.
    pub fn set_document(&mut self, document: Option<SharedDocument>) {
        self.document = document;
        self.cache.clear();
        self.failed.clear();

        let generation = {
            let mut queue = self.lock_queue();
            queue.begin_generation()
        };
        self.generation = generation;
    }

    /// Cached bitmap for a page at the given frame size, or `None` with a
    /// render queued. Failed keys are not re-queued; the page keeps its
    /// placeholder until something changes the key.
    pub fn request(
        &mut self,
        page_index: u32,
        frame_size: SizeF,
        priority: RenderPriority,
    ) -> Option<Arc<Bitmap>> {
        let document = self.document.as_ref()?;
        if frame_size.is_degenerate() {
            return None;
        }

        let key = RasterKey::new(document.id(), page_index, frame_size, self.device_scale);

        if let Some(bitmap) = self.cache.get(&key) {
            return Some(bitmap);
        }
        if self.failed.contains(&key) {
            return None;
        }

        let document = document.clone();
        self.lock_queue().enqueue(key, priority, document);
        None
    }

    /// Drain finished renders on the UI thread. Returns the keys that
    /// became available so callers can repaint those pages.
    pub fn poll_completions(&mut self) -> Vec<RasterKey> {
        let mut ready = Vec::new();

        while let Ok(completed) = self.results.try_recv() {
            if completed.generation != self.generation {
                log::debug!(
                    "dropping stale render for page {} (generation {} != {})",
                    completed.key.page_index,
                    completed.generation,
                    self.generation
                );
                continue;
            }

            let Some(document) = &self.document else {
                continue;
            };
            if completed.key.document != document.id() {
                log::debug!(
                    "dropping render keyed to a different document (page {})",
                    completed.key.page_index
                );
                continue;
            }

            match completed.outcome {
                Ok(bitmap) => {
                    if self.cache.insert(completed.key, bitmap).is_some() {
                        ready.push(completed.key);
                    }
                }
                Err(_) => {
                    // Worker already logged the failure; remember the key
                    // so request() does not trigger a retry storm.
                    self.failed.insert(completed.key);
                }
            }
        }

        ready
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, RenderQueue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for RasterService {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{DocumentId, PageSize};
    use folio_render::{DocumentSource, RenderError, RenderResult};
    use std::time::{Duration, Instant};

    struct StubDocument {
        id: u64,
        fail_page: Option<u32>,
        fill: u8,
    }

    impl DocumentSource for StubDocument {
        fn id(&self) -> DocumentId {
            DocumentId(self.id)
        }

        fn page_count(&self) -> u32 {
            4
        }

        fn page_size(&self, _index: u32) -> Option<PageSize> {
            Some(PageSize::new(600.0, 800.0))
        }

        fn render_page(&self, index: u32, w: u32, h: u32) -> RenderResult<Bitmap> {
            if self.fail_page == Some(index) {
                return Err(RenderError::Backend("stub".to_owned()));
            }
            Ok(Bitmap::filled(w, h, [self.fill, 0, 0, 255]))
        }
    }

    fn service() -> RasterService {
        RasterService::new(
            CacheConfig::with_mb_limit(16),
            WorkerPoolConfig::new(1).with_poll_interval(Duration::from_millis(1)),
            1.0,
        )
    }

    fn wait_for_completion(service: &mut RasterService) -> Vec<RasterKey> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let ready = service.poll_completions();
            if !ready.is_empty() || Instant::now() > deadline {
                return ready;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn miss_then_hit_after_worker_completes() {
        let mut service = service();
        service.set_document(Some(Arc::new(StubDocument { id: 1, fail_page: None, fill: 7 })));

        let size = SizeF::new(300.0, 400.0);
        assert!(service.request(0, size, RenderPriority::Visible).is_none());

        let ready = wait_for_completion(&mut service);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].page_index, 0);

        let bitmap = service
            .request(0, size, RenderPriority::Visible)
            .expect("cached bitmap expected");
        assert_eq!(bitmap.pixels[0], 7);
    }

    #[test]
    fn document_swap_drops_in_flight_results() {
        let mut service = service();
        service.set_document(Some(Arc::new(StubDocument { id: 1, fail_page: None, fill: 1 })));

        let size = SizeF::new(300.0, 400.0);
        assert!(service.request(0, size, RenderPriority::Visible).is_none());

        // Swap before draining; the first document's render must never land.
        service.set_document(Some(Arc::new(StubDocument { id: 2, fail_page: None, fill: 2 })));

        // Give the worker time to finish the old job, then drain.
        std::thread::sleep(Duration::from_millis(50));
        let stale = service.poll_completions();
        assert!(stale.is_empty());
        assert_eq!(service.cache_stats().entry_count, 0);

        // The new document renders under the new generation.
        assert!(service.request(0, size, RenderPriority::Visible).is_none());
        let ready = wait_for_completion(&mut service);
        assert_eq!(ready.len(), 1);
        let bitmap = service
            .request(0, size, RenderPriority::Visible)
            .expect("new document bitmap expected");
        assert_eq!(bitmap.pixels[0], 2, "bitmap belongs to the new document");
    }

    #[test]
    fn failed_page_is_not_requeued() {
        let mut service = service();
        service.set_document(Some(Arc::new(StubDocument { id: 1, fail_page: Some(0), fill: 0 })));

        let size = SizeF::new(300.0, 400.0);
        assert!(service.request(0, size, RenderPriority::Visible).is_none());

        let deadline = Instant::now() + Duration::from_secs(5);
        while service.poll_completions().is_empty() && !service.failed.contains(&RasterKey::new(
            DocumentId(1),
            0,
            size,
            1.0,
        )) {
            if Instant::now() > deadline {
                panic!("failure never recorded");
            }
            std::thread::sleep(Duration::from_millis(2));
        }

        // Subsequent requests neither hit nor re-queue.
        assert!(service.request(0, size, RenderPriority::Visible).is_none());
        assert!(service.lock_queue().is_empty());
    }

    #[test]
    fn degenerate_frame_size_is_ignored() {
        let mut service = service();
        service.set_document(Some(Arc::new(StubDocument { id: 1, fail_page: None, fill: 0 })));

        assert!(service
            .request(0, SizeF::new(0.0, 100.0), RenderPriority::Visible)
            .is_none());
        assert!(service.lock_queue().is_empty());
    }
}
