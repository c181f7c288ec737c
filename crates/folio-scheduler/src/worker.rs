//! Worker pool draining the render queue on background threads.
//!
//! Each worker pulls the next job, rasterizes through the job's document
//! handle, and sends the outcome back over the results channel. Workers
//! poll the queue with a short sleep when it is empty and exit when the
//! shutdown signal fires or the result receiver goes away.

use crate::queue::RenderQueue;
use folio_render::{Bitmap, RasterKey, RenderError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cooperative shutdown flag shared by every worker in a pool.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

/// A finished rasterization, successful or not, stamped with the
/// generation it was requested under.
pub struct CompletedRender {
    pub key: RasterKey,
    pub generation: u64,
    pub outcome: Result<Bitmap, RenderError>,
}

#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,

    /// Sleep between queue polls when no job is available.
    pub poll_interval: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(2);
        Self { num_workers: workers.min(4), poll_interval: Duration::from_millis(10) }
    }
}

impl WorkerPoolConfig {
    pub fn new(num_workers: usize) -> Self {
        Self { num_workers: num_workers.max(1), ..Self::default() }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Pool of render workers sharing one queue and one results channel.
pub struct RenderWorkerPool {
    workers: Vec<JoinHandle<()>>,
    shutdown: ShutdownSignal,
}

impl RenderWorkerPool {
    pub fn new(
        queue: Arc<Mutex<RenderQueue>>,
        results: Sender<CompletedRender>,
        config: WorkerPoolConfig,
    ) -> Self {
        let shutdown = ShutdownSignal::new();
        let mut workers = Vec::with_capacity(config.num_workers);

        for _ in 0..config.num_workers {
            let queue = queue.clone();
            let results = results.clone();
            let shutdown = shutdown.clone();
            let poll_interval = config.poll_interval;

            workers.push(thread::spawn(move || {
                worker_loop(queue, results, shutdown, poll_interval)
            }));
        }

        Self { workers, shutdown }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Signal shutdown and wait for every worker to finish its current job.
    pub fn shutdown(self) {
        self.shutdown.request();
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    queue: Arc<Mutex<RenderQueue>>,
    results: Sender<CompletedRender>,
    shutdown: ShutdownSignal,
    poll_interval: Duration,
) {
    loop {
        if shutdown.is_requested() {
            return;
        }

        let job = {
            let mut queue = queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            queue.pop_next()
        };

        let Some(job) = job else {
            thread::sleep(poll_interval);
            continue;
        };

        let outcome = job.document.render_page(
            job.key.page_index,
            job.key.pixel_width,
            job.key.pixel_height,
        );

        if let Err(error) = &outcome {
            log::warn!("rasterization failed for page {}: {error}", job.key.page_index);
        }

        let completed =
            CompletedRender { key: job.key, generation: job.generation, outcome };

        // Receiver gone means the canvas was torn down; stop quietly.
        if results.send(completed).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::RenderPriority;
    use doc_model::{DocumentId, PageSize};
    use folio_render::{DocumentSource, RasterKey, RenderResult, SharedDocument};
    use std::sync::mpsc;

    struct StubDocument {
        id: u64,
        fail_page: Option<u32>,
    }

    impl DocumentSource for StubDocument {
        fn id(&self) -> DocumentId {
            DocumentId(self.id)
        }

        fn page_count(&self) -> u32 {
            8
        }

        fn page_size(&self, _index: u32) -> Option<PageSize> {
            Some(PageSize::new(600.0, 800.0))
        }

        fn render_page(&self, index: u32, w: u32, h: u32) -> RenderResult<Bitmap> {
            if self.fail_page == Some(index) {
                return Err(RenderError::Backend("stub failure".to_owned()));
            }
            Ok(Bitmap::filled(w, h, [index as u8, 0, 0, 255]))
        }
    }

    fn stub(id: u64, fail_page: Option<u32>) -> SharedDocument {
        Arc::new(StubDocument { id, fail_page })
    }

    fn key(page: u32) -> RasterKey {
        RasterKey::new(DocumentId(1), page, canvas_core::SizeF::new(64.0, 64.0), 1.0)
    }

    #[test]
    fn pool_renders_queued_job_and_delivers_result() {
        let queue = Arc::new(Mutex::new(RenderQueue::new()));
        let (tx, rx) = mpsc::channel();

        {
            let mut queue = queue.lock().expect("queue lock expected");
            queue.begin_generation();
            queue.enqueue(key(2), RenderPriority::Visible, stub(1, None));
        }

        let pool = RenderWorkerPool::new(queue, tx, WorkerPoolConfig::new(1));

        let completed = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("render result expected");
        assert_eq!(completed.key.page_index, 2);
        let bitmap = completed.outcome.expect("successful render expected");
        assert_eq!(bitmap.width, 64);
        assert_eq!(bitmap.pixels[0], 2);

        pool.shutdown();
    }

    #[test]
    fn failed_render_is_delivered_as_error_outcome() {
        let queue = Arc::new(Mutex::new(RenderQueue::new()));
        let (tx, rx) = mpsc::channel();

        {
            let mut queue = queue.lock().expect("queue lock expected");
            queue.begin_generation();
            queue.enqueue(key(3), RenderPriority::Visible, stub(1, Some(3)));
        }

        let pool = RenderWorkerPool::new(queue, tx, WorkerPoolConfig::new(1));

        let completed = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("render result expected");
        assert!(completed.outcome.is_err());

        pool.shutdown();
    }

    #[test]
    fn shutdown_joins_all_workers() {
        let queue = Arc::new(Mutex::new(RenderQueue::new()));
        let (tx, _rx) = mpsc::channel();

        let pool = RenderWorkerPool::new(queue, tx, WorkerPoolConfig::new(3));
        assert_eq!(pool.num_workers(), 3);

        // Returns only after every worker observed the signal and exited.
        pool.shutdown();
    }
}
