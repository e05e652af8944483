//! Geometry and raster fixtures.

use std::io::Cursor;

use basemap_common::BoundingBox;
use bytes::Bytes;
use geo::{polygon, Geometry, Polygon};
use geozero::{CoordDimensions, ToWkb};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

/// GeoTIFF ModelPixelScale tag id.
const GEOTIFF_MODELPIXELSCALE: u16 = 33550;
/// GeoTIFF ModelTiepoint tag id.
const GEOTIFF_MODELTIEPOINT: u16 = 33922;

/// Axis-aligned rectangle polygon.
pub fn rect_polygon(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    polygon![
        (x: min_x, y: min_y),
        (x: max_x, y: min_y),
        (x: max_x, y: max_y),
        (x: min_x, y: max_y),
        (x: min_x, y: min_y),
    ]
}

/// Rectangle polygon encoded as WKB, as a boundary store would hold it.
pub fn rect_wkb(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bytes {
    let wkb = Geometry::Polygon(rect_polygon(min_x, min_y, max_x, max_y))
        .to_wkb(CoordDimensions::xy())
        .expect("fixture WKB encode");
    Bytes::from(wkb)
}

/// Single-band Float32 GeoTIFF filled with one value, georeferenced to
/// `bounds` via pixel-scale/tiepoint tags.
pub fn geotiff_gray(width: u32, height: u32, value: f32, bounds: BoundingBox) -> Bytes {
    geotiff_from_samples(width, height, &vec![value; (width * height) as usize], bounds)
}

/// Single-band Float32 GeoTIFF from explicit samples (row-major, top row
/// first).
pub fn geotiff_from_samples(
    width: u32,
    height: u32,
    samples: &[f32],
    bounds: BoundingBox,
) -> Bytes {
    assert_eq!(samples.len(), (width * height) as usize);

    let scale_x = bounds.width() / width as f64;
    let scale_y = bounds.height() / height as f64;

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buffer).expect("fixture TIFF encoder");
        let mut image = encoder
            .new_image::<Gray32Float>(width, height)
            .expect("fixture TIFF image");

        // ModelPixelScale: [ScaleX, ScaleY, ScaleZ].
        let pixel_scale = [scale_x, scale_y, 0.0];
        image
            .encoder()
            .write_tag(Tag::Unknown(GEOTIFF_MODELPIXELSCALE), &pixel_scale[..])
            .expect("pixel scale tag");

        // ModelTiepoint ties pixel (0, 0) to the top-left world corner.
        let tiepoint = [0.0, 0.0, 0.0, bounds.min_x, bounds.max_y, 0.0];
        image
            .encoder()
            .write_tag(Tag::Unknown(GEOTIFF_MODELTIEPOINT), &tiepoint[..])
            .expect("tiepoint tag");

        image.write_data(samples).expect("fixture TIFF data");
    }
    Bytes::from(buffer.into_inner())
}
