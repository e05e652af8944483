//! Remote raster fetch pipeline.

use std::sync::Arc;

use basemap_common::options::RENDER_SCALE_MULTIPLIER;
use basemap_common::{BasemapResult, BoundingBox, VisParams};
use geo::MultiPolygon;
use projection::UtmZone;
use tracing::{info, instrument, warn};

use crate::geotiff;
use crate::layer::RasterLayer;
use crate::request::{DownloadRequest, ImageHandle, RequestMode};
use crate::service::ComputeService;

/// Outcome of a basemap raster fetch.
///
/// A failed fetch degrades the render instead of aborting it, so failure is
/// a value here, not an error: the renderer logs what was skipped and draws
/// the remaining layers.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(RasterLayer),
    /// The basemap layer is omitted; the render continues without it.
    Skipped { reason: String },
}

impl FetchOutcome {
    pub fn layer(&self) -> Option<&RasterLayer> {
        match self {
            FetchOutcome::Fetched(layer) => Some(layer),
            FetchOutcome::Skipped { .. } => None,
        }
    }

    /// Outcome for a render that never asked for a basemap.
    pub fn not_requested() -> Self {
        FetchOutcome::Skipped {
            reason: "no basemap image requested".to_string(),
        }
    }
}

/// Options for one fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub dpi: u32,
    pub mode: RequestMode,
    pub vis_params: Option<VisParams>,
    /// Clip server-side to this WGS84 boundary before download. Always the
    /// geographic geometry, never the projected one.
    pub clip_to: Option<MultiPolygon<f64>>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            mode: RequestMode::Exact,
            vis_params: None,
            clip_to: None,
        }
    }
}

/// Fetches co-registered value/mask raster pairs from the compute service.
pub struct RasterFetcher {
    service: Arc<dyn ComputeService>,
}

impl RasterFetcher {
    pub fn new(service: Arc<dyn ComputeService>) -> Self {
        Self { service }
    }

    /// Ground sample distance in meters per pixel for an extent and DPI.
    ///
    /// Derived from the output resolution so the download is neither
    /// oversized nor visibly blocky: the long extent axis maps onto
    /// `dpi * RENDER_SCALE_MULTIPLIER` pixels.
    pub fn ground_sample_distance(extent: &BoundingBox, dpi: u32) -> f64 {
        extent.width().max(extent.height()) / (dpi as f64 * RENDER_SCALE_MULTIPLIER as f64)
    }

    /// Fetch the value and mask rasters for an extent and join them.
    ///
    /// Never returns an error: a network timeout, a decode failure or a
    /// malformed response downgrades to `Skipped` with the reason logged as
    /// a warning.
    #[instrument(skip(self, opts), fields(image = %image, zone = %zone))]
    pub async fn fetch(
        &self,
        image: &ImageHandle,
        extent: &BoundingBox,
        zone: UtmZone,
        opts: &FetchOptions,
    ) -> FetchOutcome {
        match self.try_fetch(image, extent, zone, opts).await {
            Ok(layer) => {
                info!(
                    width = layer.width(),
                    height = layer.height(),
                    bands = layer.bands(),
                    fully_masked = layer.is_fully_masked(),
                    "basemap raster fetched"
                );
                FetchOutcome::Fetched(layer)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(error = %reason, "basemap fetch failed; skipping raster layer");
                FetchOutcome::Skipped { reason }
            }
        }
    }

    async fn try_fetch(
        &self,
        image: &ImageHandle,
        extent: &BoundingBox,
        zone: UtmZone,
        opts: &FetchOptions,
    ) -> BasemapResult<RasterLayer> {
        let scale = Self::ground_sample_distance(extent, opts.dpi);
        let clip = opts
            .clip_to
            .as_ref()
            .map(|mp| geojson::Geometry::from(&geo::Geometry::MultiPolygon(mp.clone())));

        // Identical crs/crs_transform on both requests keeps the value and
        // mask grids pixel-aligned without a resampling step.
        let value_request = DownloadRequest {
            image: image.clone(),
            mask: false,
            clip,
            region: DownloadRequest::region_ring(extent),
            crs: zone.crs(),
            crs_transform: [scale, 0.0, extent.min_x, 0.0, scale, extent.min_y],
            format: "GEO_TIFF".to_string(),
            mode: opts.mode,
            vis_params: opts.vis_params.clone(),
        };
        let mask_request = DownloadRequest {
            mask: true,
            vis_params: None,
            ..value_request.clone()
        };

        // The two requests are independent; issue them concurrently and
        // join before compositing.
        let (value_bytes, mask_bytes) = tokio::try_join!(
            self.service.fetch_raster(&value_request),
            self.service.fetch_raster(&mask_request),
        )?;

        let values = geotiff::decode(&value_bytes)?;
        let mask = geotiff::decode(&mask_bytes)?;
        RasterLayer::from_parts(values, mask, *extent)
    }
}
