//! Boundary geometry stores.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use basemap_common::{BasemapError, BasemapResult, RegionCode};
use bytes::Bytes;
use geo::{LineString, MultiPolygon};
use tracing::{debug, instrument, warn};

use crate::geometry::{decode_wkb, to_lines, to_multi_polygon};

/// Keyed store of binary (WKB) boundary geometries in WGS84.
///
/// Keys are lower-cased ISO 3166-1 alpha-2 codes. A missing entry is
/// reported as `Ok(None)` so callers can tell not-found apart from
/// infrastructure failure.
#[async_trait]
pub trait BoundaryStore: Send + Sync {
    async fn get(&self, code: &RegionCode) -> BasemapResult<Option<Bytes>>;
}

/// Filesystem-backed store reading `<code>.wkb` files from a directory.
pub struct FsBoundaryStore {
    root: PathBuf,
}

impl FsBoundaryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load optional context layers from the store directory: `land.wkb`
    /// (polygons), `coastlines.wkb` and `borders.wkb` (line work). A
    /// missing or undecodable file leaves that layer absent.
    pub async fn context(&self) -> ContextData {
        ContextData {
            land: self.read_polygons("land").await,
            coastlines: self.read_line_work("coastlines").await,
            borders: self.read_line_work("borders").await,
        }
    }

    async fn read_wkb(&self, name: &str) -> Option<Vec<u8>> {
        let path = self.root.join(format!("{name}.wkb"));
        match tokio::fs::read(&path).await {
            Ok(data) => Some(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read context layer");
                None
            }
        }
    }

    async fn read_polygons(&self, name: &str) -> Option<MultiPolygon<f64>> {
        let data = self.read_wkb(name).await?;
        match decode_wkb(&data).and_then(to_multi_polygon) {
            Ok(mp) => Some(mp),
            Err(e) => {
                warn!(layer = name, error = %e, "skipping undecodable context layer");
                None
            }
        }
    }

    async fn read_line_work(&self, name: &str) -> Option<Vec<LineString<f64>>> {
        let data = self.read_wkb(name).await?;
        match decode_wkb(&data) {
            Ok(geometry) => Some(to_lines(geometry)),
            Err(e) => {
                warn!(layer = name, error = %e, "skipping undecodable context layer");
                None
            }
        }
    }
}

#[async_trait]
impl BoundaryStore for FsBoundaryStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn get(&self, code: &RegionCode) -> BasemapResult<Option<Bytes>> {
        let path = self.root.join(format!("{code}.wkb"));
        match tokio::fs::read(&path).await {
            Ok(data) => {
                debug!(size = data.len(), "boundary loaded");
                Ok(Some(Bytes::from(data)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BasemapError::BoundaryStore(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }
}

/// In-memory store for tests and embedded data sets.
#[derive(Debug, Default)]
pub struct MemoryBoundaryStore {
    entries: HashMap<String, Bytes>,
}

impl MemoryBoundaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a WKB boundary under a lower-cased code.
    pub fn insert(&mut self, code: &str, wkb: impl Into<Bytes>) {
        self.entries.insert(code.to_ascii_lowercase(), wkb.into());
    }
}

#[async_trait]
impl BoundaryStore for MemoryBoundaryStore {
    async fn get(&self, code: &RegionCode) -> BasemapResult<Option<Bytes>> {
        Ok(self.entries.get(code.as_str()).cloned())
    }
}

/// Optional context geometries (WGS84) drawn around the target region.
#[derive(Debug, Default, Clone)]
pub struct ContextData {
    pub land: Option<MultiPolygon<f64>>,
    pub coastlines: Option<Vec<LineString<f64>>>,
    pub borders: Option<Vec<LineString<f64>>>,
}

impl ContextData {
    pub fn is_empty(&self) -> bool {
        self.land.is_none() && self.coastlines.is_none() && self.borders.is_none()
    }
}
