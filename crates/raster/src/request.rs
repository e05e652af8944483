//! Compute-service request types.

use basemap_common::{BoundingBox, VisParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle naming a raster asset on the compute service,
/// e.g. `"USGS/SRTMGL1_003"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(pub String);

impl ImageHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request semantics for a raster download.
///
/// Observed call sites use two distinct shapes; they are kept as two named
/// modes rather than unified speculatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// Strict region request: the service must honor the exact grid.
    Exact,
    /// Best-effort request with visualization applied server-side.
    BestEffort,
}

/// Affine pixel transform `[scale_x, 0, origin_x, 0, scale_y, origin_y]`.
pub type CrsTransform = [f64; 6];

/// One raster download request.
///
/// The value raster and its validity mask are requested with identical
/// `crs` and `crs_transform` so the two grids come back pixel-aligned and
/// need no resampling before compositing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub image: ImageHandle,
    /// Request the validity mask of the image instead of its values.
    pub mask: bool,
    /// Server-side clip geometry in WGS84 GeoJSON. The clip operation is
    /// defined in geographic space and does not support multi-part
    /// geometries in a projected CRS, so this is never the projected
    /// boundary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<geojson::Geometry>,
    /// Request region as a closed ring in the target projection.
    pub region: Vec<(f64, f64)>,
    /// CRS authority string, e.g. "EPSG:32648".
    pub crs: String,
    pub crs_transform: CrsTransform,
    /// Response encoding; always "GEO_TIFF" here.
    pub format: String,
    pub mode: RequestMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vis_params: Option<VisParams>,
}

impl DownloadRequest {
    /// Closed ring covering an extent, counter-clockwise from the
    /// south-west corner.
    pub fn region_ring(extent: &BoundingBox) -> Vec<(f64, f64)> {
        vec![
            (extent.min_x, extent.min_y),
            (extent.max_x, extent.min_y),
            (extent.max_x, extent.max_y),
            (extent.min_x, extent.max_y),
            (extent.min_x, extent.min_y),
        ]
    }
}
