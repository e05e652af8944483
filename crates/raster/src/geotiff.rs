//! In-memory GeoTIFF decoding.
//!
//! Compute-service responses arrive as encoded GeoTIFF byte streams; they
//! are decoded without touching persistent storage.

use std::io::Cursor;

use basemap_common::{BasemapError, BasemapResult, BoundingBox};
use bytes::Bytes;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

/// GeoTIFF ModelPixelScale tag id.
const GEOTIFF_MODELPIXELSCALE: u16 = 33550;
/// GeoTIFF ModelTiepoint tag id.
const GEOTIFF_MODELTIEPOINT: u16 = 33922;

/// A decoded raster grid.
///
/// Samples are stored row-major and band-interleaved, so
/// `data[(row * width + col) * bands + band]` addresses one sample; this is
/// the order the renderer consumes directly.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    pub width: usize,
    pub height: usize,
    pub bands: usize,
    pub data: Vec<f32>,
    /// Georeferenced bounds when the stream carries pixel-scale and
    /// tiepoint tags.
    pub bounds: Option<BoundingBox>,
}

impl DecodedRaster {
    /// Sample at (row, col, band). Out-of-range indices are a caller bug.
    pub fn sample(&self, row: usize, col: usize, band: usize) -> f32 {
        self.data[(row * self.width + col) * self.bands + band]
    }
}

/// Decode an in-memory GeoTIFF byte stream.
pub fn decode(bytes: &Bytes) -> BasemapResult<DecodedRaster> {
    let mut decoder = Decoder::new(Cursor::new(bytes.as_ref()))
        .map_err(|e| BasemapError::Decode(format!("not a TIFF stream: {e}")))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| BasemapError::Decode(format!("missing dimensions: {e}")))?;
    let (width, height) = (width as usize, height as usize);
    if width == 0 || height == 0 {
        return Err(BasemapError::Decode("raster has zero dimensions".to_string()));
    }

    let bounds = read_bounds(&mut decoder, width, height);

    let data: Vec<f32> = match decoder
        .read_image()
        .map_err(|e| BasemapError::Decode(format!("failed to read image data: {e}")))?
    {
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|s| s as f32).collect(),
        _ => {
            return Err(BasemapError::Decode(
                "unsupported sample format".to_string(),
            ))
        }
    };

    let pixels = width * height;
    if data.len() % pixels != 0 {
        return Err(BasemapError::Decode(format!(
            "{} samples do not fill a {width}x{height} grid",
            data.len()
        )));
    }
    let bands = data.len() / pixels;

    Ok(DecodedRaster {
        width,
        height,
        bands,
        data,
        bounds,
    })
}

/// Bounds from the pixel-scale and tiepoint tags.
///
/// A north-up GeoTIFF stores a positive pixel scale and ties raster pixel
/// (0, 0) to the top-left world coordinate; rows advance southward.
fn read_bounds<R>(decoder: &mut Decoder<R>, width: usize, height: usize) -> Option<BoundingBox>
where
    R: std::io::Read + std::io::Seek,
{
    let scale = decoder
        .get_tag_f64_vec(Tag::Unknown(GEOTIFF_MODELPIXELSCALE))
        .ok()?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::Unknown(GEOTIFF_MODELTIEPOINT))
        .ok()?;
    if scale.len() < 2 || tiepoint.len() < 5 {
        return None;
    }

    let (scale_x, scale_y) = (scale[0], scale[1]);
    let (left, top) = (tiepoint[3], tiepoint[4]);
    let right = left + scale_x * width as f64;
    let bottom = top - scale_y * height as f64;
    Some(BoundingBox::new(left, bottom, right, top))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_tiff() {
        let err = decode(&Bytes::from_static(b"not a tiff")).unwrap_err();
        assert!(err.to_string().contains("TIFF"));
    }
}
