//! Remote compute service interface.

use async_trait::async_trait;
use basemap_common::{BasemapError, BasemapResult};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::request::{DownloadRequest, ImageHandle};
use crate::session::ComputeSession;

/// Remote raster/vector compute operations.
///
/// One implementation talks HTTP to the real service; tests substitute a
/// mock. Everything takes `&self` so the trait stays object-safe.
#[async_trait]
pub trait ComputeService: Send + Sync {
    /// Fetch one encoded GeoTIFF for the request.
    async fn fetch_raster(&self, request: &DownloadRequest) -> BasemapResult<Bytes>;

    /// Reduce the presence pixels of a binary image to vector polygons.
    async fn reduce_to_vectors(
        &self,
        image: &ImageHandle,
        region: &geojson::Geometry,
        best_effort: bool,
    ) -> BasemapResult<geo::Geometry<f64>>;

    /// Convex hull of a geometry, computed server-side.
    async fn convex_hull(
        &self,
        geometry: &geo::Geometry<f64>,
        max_error_m: f64,
    ) -> BasemapResult<geo::Geometry<f64>>;

    /// Whether an asset exists at the given path.
    async fn asset_exists(&self, path: &str) -> BasemapResult<bool>;

    /// Create an asset folder. Must tolerate the folder already existing:
    /// a concurrent creator can win between a caller's check and this call.
    async fn create_folder(&self, path: &str) -> BasemapResult<()>;
}

/// HTTP implementation backed by a [`ComputeSession`].
pub struct HttpComputeService {
    session: ComputeSession,
}

impl HttpComputeService {
    pub fn new(session: ComputeSession) -> Self {
        Self { session }
    }

    async fn post_geometry(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> BasemapResult<geo::Geometry<f64>> {
        let response = self
            .session
            .authorize(self.session.client().post(self.session.url(path)))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?
            .error_for_status()
            .map_err(|e| BasemapError::Fetch(format!("{path} failed: {e}")))?;

        let geometry: geojson::Geometry = response
            .json()
            .await
            .map_err(|e| BasemapError::Fetch(format!("{path} returned malformed GeoJSON: {e}")))?;
        geo::Geometry::<f64>::try_from(geometry)
            .map_err(|e| BasemapError::Fetch(format!("{path} returned unsupported geometry: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct DownloadUrlResponse {
    url: String,
}

#[async_trait]
impl ComputeService for HttpComputeService {
    #[instrument(skip(self, request), fields(image = %request.image, mask = request.mask))]
    async fn fetch_raster(&self, request: &DownloadRequest) -> BasemapResult<Bytes> {
        // Two round trips, mirroring the service contract: negotiate a
        // download URL for the prepared raster, then stream the bytes.
        let response = self
            .session
            .authorize(self.session.client().post(self.session.url("/v1/download")))
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?
            .error_for_status()
            .map_err(|e| BasemapError::Fetch(format!("download negotiation failed: {e}")))?;

        let DownloadUrlResponse { url } = response
            .json()
            .await
            .map_err(|e| BasemapError::Fetch(format!("malformed download response: {e}")))?;
        debug!(url = %url, "downloading raster");

        let bytes = self
            .session
            .client()
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?
            .error_for_status()
            .map_err(|e| BasemapError::Fetch(format!("raster download failed: {e}")))?
            .bytes()
            .await
            .map_err(map_transport_error)?;

        debug!(size = bytes.len(), "raster downloaded");
        Ok(bytes)
    }

    async fn reduce_to_vectors(
        &self,
        image: &ImageHandle,
        region: &geojson::Geometry,
        best_effort: bool,
    ) -> BasemapResult<geo::Geometry<f64>> {
        self.post_geometry(
            "/v1/reduceToVectors",
            json!({
                "image": image,
                "geometry": region,
                "geometry_type": "polygon",
                "scale": 1,
                "best_effort": best_effort,
            }),
        )
        .await
    }

    async fn convex_hull(
        &self,
        geometry: &geo::Geometry<f64>,
        max_error_m: f64,
    ) -> BasemapResult<geo::Geometry<f64>> {
        self.post_geometry(
            "/v1/convexHull",
            json!({
                "geometry": geojson::Geometry::from(geometry),
                "max_error": max_error_m,
            }),
        )
        .await
    }

    async fn asset_exists(&self, path: &str) -> BasemapResult<bool> {
        let response = self
            .session
            .authorize(
                self.session
                    .client()
                    .get(self.session.url(&format!("/v1/assets/{path}"))),
            )
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(BasemapError::Fetch(format!(
                "asset lookup for {path} failed: HTTP {status}"
            ))),
        }
    }

    async fn create_folder(&self, path: &str) -> BasemapResult<()> {
        let response = self
            .session
            .authorize(self.session.client().post(self.session.url("/v1/assets")))
            .json(&json!({ "path": path, "type": "FOLDER" }))
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Losing the creation race is benign.
            reqwest::StatusCode::CONFLICT => Ok(()),
            status => Err(BasemapError::Fetch(format!(
                "folder creation for {path} failed: HTTP {status}"
            ))),
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> BasemapError {
    if e.is_timeout() {
        BasemapError::Timeout
    } else {
        BasemapError::Fetch(e.to_string())
    }
}
