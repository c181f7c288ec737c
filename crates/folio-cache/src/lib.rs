//! Byte-budgeted cache of rasterized page bitmaps.
//!
//! Entries are keyed by the full raster identity (document, page, exact
//! pixel size, device scale) and evicted least-recently-used once the byte
//! budget is exceeded. The cache is an injectable value, not a process
//! singleton: each canvas constructs its own instance, and clones share
//! one budget so render workers and the UI thread see the same state.

mod raster;

pub use raster::{CacheConfig, CacheStats, RasterCache};
