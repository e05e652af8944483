//! Region code to projected boundary resolution.

use basemap_common::{BasemapError, BasemapResult, BoundingBox, RegionCode};
use geo::{BoundingRect, Centroid, Coord, MapCoords, MultiPolygon};
use projection::{TransverseMercator, UtmZone};
use tracing::{debug, instrument};

use crate::geometry::{decode_wkb, to_multi_polygon};
use crate::store::BoundaryStore;

/// Fraction of each axis range added as margin on every side of the extent.
const EXTENT_MARGIN: f64 = 0.15;

/// A region boundary resolved into its rendering projection.
///
/// Owned by one render invocation; nothing here is cached across calls.
#[derive(Debug, Clone)]
pub struct ResolvedBoundary {
    pub code: RegionCode,
    /// Boundary in geographic coordinates (WGS84 lon/lat degrees).
    pub geographic: MultiPolygon<f64>,
    /// Boundary in projected coordinates (meters).
    pub projected: MultiPolygon<f64>,
    /// Map frame in projected meters: the projected bounds plus margin.
    pub extent: BoundingBox,
    pub zone: UtmZone,
    pub projection: TransverseMercator,
}

/// Resolve a region code into a projected boundary and map extent.
///
/// The code is validated before any store or geometry work; lookup is
/// case-insensitive. The UTM zone is chosen from the centroid of the
/// geographic boundary, and the projection carries widened validity limits
/// so geometry past the nominal zone band survives intact.
#[instrument(skip(store))]
pub async fn resolve(store: &dyn BoundaryStore, code: &str) -> BasemapResult<ResolvedBoundary> {
    let code = RegionCode::parse(code)?;

    let wkb = store
        .get(&code)
        .await?
        .ok_or_else(|| BasemapError::RegionNotFound(code.as_str().to_string()))?;
    let geographic = to_multi_polygon(decode_wkb(&wkb)?)?;

    let centroid = geographic.centroid().ok_or_else(|| {
        BasemapError::InvalidGeometry(format!("boundary for {code} is empty"))
    })?;
    let zone = UtmZone::for_point(centroid.x(), centroid.y());
    let projection = TransverseMercator::utm_unbounded(zone);
    debug!(code = %code, zone = %zone, epsg = zone.epsg(), "projection selected");

    // Axis order is (x = lon, y = lat) throughout.
    let projected = geographic.map_coords(|c| {
        let (x, y) = projection.forward(c.x, c.y);
        Coord { x, y }
    });

    let rect = projected.bounding_rect().ok_or_else(|| {
        BasemapError::InvalidGeometry(format!("projected boundary for {code} is empty"))
    })?;
    let extent = BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
        .with_margin(EXTENT_MARGIN);

    Ok(ResolvedBoundary {
        code,
        geographic,
        projected,
        extent,
        zone,
        projection,
    })
}
