use crate::persistence::PersistenceError;
use folio_render::RenderError;

/// Canvas failure taxonomy.
///
/// Nothing here is allowed to fail destructively: `LayoutNotReady` defers
/// and retries, rasterization failures leave a placeholder, persistence
/// failures leave the in-memory store authoritative, and out-of-range
/// coordinates clamp instead of erroring at all.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("page layout has not run yet; operation deferred until bounds are valid")]
    LayoutNotReady,

    #[error("document failed to load: {0}")]
    DocumentLoadFailure(String),

    #[error(transparent)]
    Rasterization(#[from] RenderError),

    #[error(transparent)]
    PersistenceWrite(#[from] PersistenceError),
}
