//! WKB geometry decoding.

use basemap_common::{BasemapError, BasemapResult};
use geo::{Geometry, LineString, MultiPolygon, Polygon};
use geozero::wkb::Wkb;
use geozero::ToGeo;

/// Decode a WKB byte stream into a geometry.
pub fn decode_wkb(data: &[u8]) -> BasemapResult<Geometry<f64>> {
    Wkb(data.to_vec())
        .to_geo()
        .map_err(|e| BasemapError::InvalidGeometry(format!("WKB decode failed: {e}")))
}

/// Normalize a decoded geometry to a multi-polygon.
///
/// Boundary stores hold polygons or multi-polygons; anything else is
/// rejected rather than silently dropped.
pub fn to_multi_polygon(geometry: Geometry<f64>) -> BasemapResult<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        Geometry::MultiPolygon(mp) => Ok(mp),
        other => Err(BasemapError::InvalidGeometry(format!(
            "expected a polygon or multi-polygon, got {}",
            kind_name(&other)
        ))),
    }
}

/// Extract the line work of a geometry, for stroke-only context layers.
pub fn to_lines(geometry: Geometry<f64>) -> Vec<LineString<f64>> {
    match geometry {
        Geometry::LineString(ls) => vec![ls],
        Geometry::MultiLineString(mls) => mls.0,
        Geometry::Polygon(p) => polygon_rings(p),
        Geometry::MultiPolygon(mp) => mp.0.into_iter().flat_map(polygon_rings).collect(),
        Geometry::GeometryCollection(gc) => gc.0.into_iter().flat_map(to_lines).collect(),
        _ => Vec::new(),
    }
}

fn polygon_rings(polygon: Polygon<f64>) -> Vec<LineString<f64>> {
    let (exterior, interiors) = polygon.into_inner();
    std::iter::once(exterior).chain(interiors).collect()
}

fn kind_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "a point",
        Geometry::Line(_) => "a line",
        Geometry::LineString(_) => "a line string",
        Geometry::MultiPoint(_) => "a multi-point",
        Geometry::MultiLineString(_) => "a multi-line-string",
        Geometry::GeometryCollection(_) => "a geometry collection",
        Geometry::Rect(_) => "a rectangle",
        Geometry::Triangle(_) => "a triangle",
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => "a polygon",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, point};
    use geozero::{CoordDimensions, ToWkb};

    #[test]
    fn test_decode_polygon_roundtrip() {
        let poly = polygon![
            (x: 103.6, y: 1.2),
            (x: 104.0, y: 1.2),
            (x: 104.0, y: 1.5),
            (x: 103.6, y: 1.5),
            (x: 103.6, y: 1.2),
        ];
        let wkb = Geometry::Polygon(poly.clone())
            .to_wkb(CoordDimensions::xy())
            .unwrap();

        let decoded = to_multi_polygon(decode_wkb(&wkb).unwrap()).unwrap();
        assert_eq!(decoded.0.len(), 1);
        assert_eq!(decoded.0[0], poly);
    }

    #[test]
    fn test_rejects_non_polygonal() {
        let wkb = Geometry::Point(point!(x: 1.0, y: 2.0))
            .to_wkb(CoordDimensions::xy())
            .unwrap();
        let err = to_multi_polygon(decode_wkb(&wkb).unwrap()).unwrap_err();
        assert!(err.to_string().contains("polygon"));
    }

    #[test]
    fn test_rejects_garbage_bytes() {
        assert!(decode_wkb(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }

    #[test]
    fn test_to_lines_from_polygon() {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let lines = to_lines(Geometry::Polygon(poly));
        assert_eq!(lines.len(), 1);
    }
}
