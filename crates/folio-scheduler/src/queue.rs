use folio_render::{RasterKey, SharedDocument};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPriority {
    Visible,
    Prefetch,
}

impl RenderPriority {
    fn rank(self) -> u8 {
        match self {
            Self::Visible => 0,
            Self::Prefetch => 1,
        }
    }
}

/// One rasterization to perform, with the document handle captured when it
/// was queued so workers stay stateless across document swaps.
#[derive(Clone)]
pub struct RenderJob {
    pub key: RasterKey,
    pub priority: RenderPriority,
    pub generation: u64,
    pub document: SharedDocument,
}

struct QueuedJob {
    priority: RenderPriority,
    generation: u64,
    document: SharedDocument,
}

/// Pending render jobs, deduplicated by raster key.
///
/// Re-enqueueing an existing key may only upgrade its priority; `pop_next`
/// returns the highest-priority job in FIFO order within a priority level.
/// The generation counter is bumped on document swap so completions can be
/// checked against the world they were requested in.
#[derive(Default)]
pub struct RenderQueue {
    generation: u64,
    pending: HashMap<RasterKey, QueuedJob>,
    order: VecDeque<RasterKey>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, dropping all pending jobs from the old one.
    pub fn begin_generation(&mut self) -> u64 {
        self.generation += 1;
        self.pending.clear();
        self.order.clear();
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn enqueue(&mut self, key: RasterKey, priority: RenderPriority, document: SharedDocument) {
        match self.pending.get_mut(&key) {
            Some(existing) => {
                if priority.rank() < existing.priority.rank() {
                    existing.priority = priority;
                }
            }
            None => {
                self.pending.insert(
                    key,
                    QueuedJob { priority, generation: self.generation, document },
                );
                self.order.push_back(key);
            }
        }
    }

    pub fn pop_next(&mut self) -> Option<RenderJob> {
        let mut best: Option<(RasterKey, u8)> = None;

        for key in &self.order {
            let Some(queued) = self.pending.get(key) else {
                continue;
            };

            let rank = queued.priority.rank();
            match best {
                Some((_, best_rank)) if rank >= best_rank => {}
                _ => best = Some((*key, rank)),
            }

            if matches!(best, Some((_, 0))) {
                break;
            }
        }

        let (key, _) = best?;
        let queued = self.pending.remove(&key)?;

        if let Some(index) = self.order.iter().position(|candidate| *candidate == key) {
            let _ = self.order.remove(index);
        }

        Some(RenderJob {
            key,
            priority: queued.priority,
            generation: queued.generation,
            document: queued.document,
        })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
