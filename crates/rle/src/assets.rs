//! Remote asset folder management.

use basemap_common::BasemapResult;
use raster::ComputeService;
use tracing::{debug, instrument};

/// Ensure an asset folder exists; returns true when this call created it.
///
/// Check-then-create: a concurrent creator can win between the check and
/// the create, so the create call itself tolerates "already exists" (the
/// service contract requires it) and the race stays benign.
#[instrument(skip(service))]
pub async fn ensure_asset_folder(
    service: &dyn ComputeService,
    folder_path: &str,
) -> BasemapResult<bool> {
    if service.asset_exists(folder_path).await? {
        debug!("asset folder already exists");
        return Ok(false);
    }
    service.create_folder(folder_path).await?;
    debug!("asset folder created");
    Ok(true)
}
