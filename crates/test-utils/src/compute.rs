//! Mock compute service.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use basemap_common::{BasemapError, BasemapResult};
use bytes::Bytes;
use geo::{ConvexHull, CoordsIter, MultiPoint, Point};
use raster::request::{DownloadRequest, ImageHandle};
use raster::service::ComputeService;

/// How the mock fails, when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Every raster fetch times out.
    Timeout,
    /// Every raster fetch returns bytes that do not decode.
    Garbage,
}

/// In-memory [`ComputeService`] serving canned GeoTIFF responses.
///
/// Records every download request so tests can assert on the crs/transform
/// pairing, and counts convex-hull calls for the double-hull workaround.
pub struct MockComputeService {
    value_raster: Bytes,
    mask_raster: Bytes,
    failure: Option<FailureMode>,
    vector_result: geo::Geometry<f64>,
    pub requests: Mutex<Vec<DownloadRequest>>,
    pub hull_calls: AtomicUsize,
    assets: Mutex<HashSet<String>>,
}

impl MockComputeService {
    pub fn new(value_raster: Bytes, mask_raster: Bytes) -> Self {
        Self {
            value_raster,
            mask_raster,
            failure: None,
            vector_result: geo::Geometry::MultiPoint(MultiPoint(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.5, 1.0),
            ])),
            requests: Mutex::new(Vec::new()),
            hull_calls: AtomicUsize::new(0),
            assets: Mutex::new(HashSet::new()),
        }
    }

    /// A service whose raster fetches always time out.
    pub fn timing_out() -> Self {
        let mut mock = Self::new(Bytes::new(), Bytes::new());
        mock.failure = Some(FailureMode::Timeout);
        mock
    }

    /// A service whose raster fetches return undecodable bytes.
    pub fn garbage() -> Self {
        let mut mock = Self::new(
            Bytes::from_static(b"not a tiff"),
            Bytes::from_static(b"not a tiff"),
        );
        mock.failure = Some(FailureMode::Garbage);
        mock
    }

    pub fn with_vector_result(mut self, geometry: geo::Geometry<f64>) -> Self {
        self.vector_result = geometry;
        self
    }

    pub fn recorded_requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComputeService for MockComputeService {
    async fn fetch_raster(&self, request: &DownloadRequest) -> BasemapResult<Bytes> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failure == Some(FailureMode::Timeout) {
            return Err(BasemapError::Timeout);
        }
        Ok(if request.mask {
            self.mask_raster.clone()
        } else {
            self.value_raster.clone()
        })
    }

    async fn reduce_to_vectors(
        &self,
        _image: &ImageHandle,
        _region: &geojson::Geometry,
        _best_effort: bool,
    ) -> BasemapResult<geo::Geometry<f64>> {
        Ok(self.vector_result.clone())
    }

    async fn convex_hull(
        &self,
        geometry: &geo::Geometry<f64>,
        _max_error_m: f64,
    ) -> BasemapResult<geo::Geometry<f64>> {
        self.hull_calls.fetch_add(1, Ordering::SeqCst);
        let points: MultiPoint<f64> = geometry
            .coords_iter()
            .map(|c| Point::new(c.x, c.y))
            .collect::<Vec<_>>()
            .into();
        Ok(geo::Geometry::Polygon(points.convex_hull()))
    }

    async fn asset_exists(&self, path: &str) -> BasemapResult<bool> {
        Ok(self.assets.lock().unwrap().contains(path))
    }

    async fn create_folder(&self, path: &str) -> BasemapResult<()> {
        // Inserting an existing path is a no-op, which is exactly the
        // "already exists" tolerance the trait requires.
        self.assets.lock().unwrap().insert(path.to_string());
        Ok(())
    }
}
