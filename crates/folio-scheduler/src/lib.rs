//! Background rasterization: a generation-stamped render queue and a
//! worker pool that drains it.
//!
//! Workers pull jobs, rasterize through the document handle captured at
//! enqueue time, and send results back over a channel. The UI thread is
//! the only consumer of results; it re-validates the generation before
//! applying a bitmap, so a render finished after a document swap is
//! discarded instead of flashing a stale page.

mod queue;
mod worker;

pub use queue::{RenderJob, RenderPriority, RenderQueue};
pub use worker::{CompletedRender, RenderWorkerPool, ShutdownSignal, WorkerPoolConfig};
