//! Mask-aware raster layers.

use basemap_common::{BasemapError, BasemapResult, BoundingBox};

use crate::geotiff::DecodedRaster;

/// A value raster joined with its validity mask.
///
/// A pixel is drawable iff its mask sample is positive; everything else is
/// fully transparent, never a sentinel color.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    values: DecodedRaster,
    mask: Vec<bool>,
    /// Georeferenced bounds in projected meters.
    pub bounds: BoundingBox,
}

impl RasterLayer {
    /// Join a value raster with its mask raster.
    ///
    /// The two grids were requested on the same pixel grid and must match
    /// in width and height; a mismatch means the responses are not the
    /// aligned pair we asked for. The mask's first band decides validity.
    pub fn from_parts(
        values: DecodedRaster,
        mask: DecodedRaster,
        fallback_bounds: BoundingBox,
    ) -> BasemapResult<Self> {
        if values.width != mask.width || values.height != mask.height {
            return Err(BasemapError::Decode(format!(
                "mask grid {}x{} does not match value grid {}x{}",
                mask.width, mask.height, values.width, values.height
            )));
        }

        let flags = (0..values.height * values.width)
            .map(|i| mask.sample(i / values.width, i % values.width, 0) > 0.0)
            .collect();
        let bounds = values.bounds.or(mask.bounds).unwrap_or(fallback_bounds);

        Ok(Self {
            values,
            mask: flags,
            bounds,
        })
    }

    pub fn width(&self) -> usize {
        self.values.width
    }

    pub fn height(&self) -> usize {
        self.values.height
    }

    pub fn bands(&self) -> usize {
        self.values.bands
    }

    /// Value sample at (row, col, band).
    pub fn sample(&self, row: usize, col: usize, band: usize) -> f32 {
        self.values.sample(row, col, band)
    }

    /// Whether the pixel at (row, col) carries data.
    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        self.mask[row * self.values.width + col]
    }

    /// True when no pixel carries data. An all-zero mask is not an error:
    /// the layer simply renders fully transparent.
    pub fn is_fully_masked(&self) -> bool {
        !self.mask.iter().any(|&valid| valid)
    }

    /// Iterator over valid samples of one band.
    pub fn valid_samples(&self, band: usize) -> impl Iterator<Item = f32> + '_ {
        self.mask.iter().enumerate().filter_map(move |(i, &valid)| {
            valid.then(|| self.values.data[i * self.values.bands + band])
        })
    }
}
