//! Remote raster acquisition.
//!
//! Talks to the remote compute service, decodes in-memory GeoTIFF
//! responses and joins value/mask raster pairs into layers the renderer
//! can composite.

pub mod fetch;
pub mod geotiff;
pub mod layer;
pub mod request;
pub mod service;
pub mod session;

pub use fetch::{FetchOptions, FetchOutcome, RasterFetcher};
pub use layer::RasterLayer;
pub use request::{DownloadRequest, ImageHandle, RequestMode};
pub use service::{ComputeService, HttpComputeService};
pub use session::{AuthStatus, ComputeSession};
