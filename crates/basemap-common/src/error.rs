//! Error types for basemap operations.

use thiserror::Error;

/// Result type alias using BasemapError.
pub type BasemapResult<T> = Result<T, BasemapError>;

/// Primary error type for basemap operations.
#[derive(Debug, Error)]
pub enum BasemapError {
    // === Input validation ===
    #[error(transparent)]
    InvalidRegionCode(#[from] crate::region::RegionCodeError),

    // === Boundary lookup ===
    #[error("region not found: {0:?}; boundary lookup is case-insensitive and expects an ISO 3166-1 alpha-2 code")]
    RegionNotFound(String),

    #[error("boundary store error: {0}")]
    BoundaryStore(String),

    #[error("invalid boundary geometry: {0}")]
    InvalidGeometry(String),

    // === Projection ===
    #[error("projection error: {0}")]
    Projection(String),

    // === Remote raster acquisition ===
    #[error("remote fetch failed: {0}")]
    Fetch(String),

    #[error("raster decode failed: {0}")]
    Decode(String),

    #[error("request timeout")]
    Timeout,

    // === Rendering ===
    #[error("rendering failed: {0}")]
    Render(String),

    // Output-file failures propagate unmodified; they are fatal and not
    // recoverable within the render pipeline.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
