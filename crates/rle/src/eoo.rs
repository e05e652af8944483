//! Extent of Occurrence derivation.

use basemap_common::BasemapResult;
use geo::GeodesicArea;
use raster::{ComputeService, ImageHandle};
use tracing::{debug, instrument};

/// Options for EOO derivation.
#[derive(Debug, Clone)]
pub struct EooOptions {
    /// Maximum error in meters for the convex hull computation.
    pub max_error_m: f64,
    /// Best-effort vector reduction: less exact but viable for large areas.
    pub best_effort: bool,
}

impl Default for EooOptions {
    fn default() -> Self {
        Self {
            max_error_m: 1.0,
            best_effort: true,
        }
    }
}

/// Compute the Extent of Occurrence polygon for a binary presence image.
///
/// Presence pixels (value 1) are reduced to vector polygons on the compute
/// service, then enclosed in a convex hull. The hull is applied twice on
/// purpose; see [`apply_hull_twice`].
#[instrument(skip(service, region, opts), fields(image = %image))]
pub async fn make_eoo(
    service: &dyn ComputeService,
    image: &ImageHandle,
    region: &geo::Geometry<f64>,
    opts: &EooOptions,
) -> BasemapResult<geo::Geometry<f64>> {
    let region_geojson = geojson::Geometry::from(region);
    let vectors = service
        .reduce_to_vectors(image, &region_geojson, opts.best_effort)
        .await?;
    debug!("presence pixels reduced to vectors");
    apply_hull_twice(service, &vectors, opts.max_error_m).await
}

/// Apply the remote convex-hull operation twice.
///
/// The second application works around an upstream precision defect in the
/// hull operation (tracked as issue 465490917): a single pass can return a
/// slightly non-convex ring. Do not drop the second call without
/// re-verifying against the live service.
pub async fn apply_hull_twice(
    service: &dyn ComputeService,
    geometry: &geo::Geometry<f64>,
    max_error_m: f64,
) -> BasemapResult<geo::Geometry<f64>> {
    let once = service.convex_hull(geometry, max_error_m).await?;
    service.convex_hull(&once, max_error_m).await
}

/// Area of an EOO polygon in square kilometers, computed geodesically on
/// the WGS84 ellipsoid.
pub fn area_km2(geometry: &geo::Geometry<f64>) -> f64 {
    let area_m2 = match geometry {
        geo::Geometry::Polygon(p) => p.geodesic_area_unsigned(),
        geo::Geometry::MultiPolygon(mp) => mp.geodesic_area_unsigned(),
        _ => 0.0,
    };
    area_m2 / 1.0e6
}
