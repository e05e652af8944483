//! Polygon rasterization in projected coordinates.
//!
//! Fills use an even-odd scanline pass over all rings, so interior rings
//! punch holes. Outlines are stroked with anti-aliased line segments.

use basemap_common::Color;
use geo::{LineString, MultiPolygon};
use image::Rgba;
use imageproc::drawing::draw_antialiased_line_segment_mut;
use imageproc::pixelops::interpolate;

use crate::canvas::Canvas;

/// Fill a multi-polygon onto the canvas.
pub fn fill_multi_polygon(canvas: &mut Canvas, geometry: &MultiPolygon<f64>, color: Color) {
    let rings = pixel_rings(canvas, geometry);
    let rgba = color.to_rgba();
    let height = canvas.height();
    let width = canvas.width() as f64;

    let mut crossings: Vec<f64> = Vec::new();
    for row in 0..height {
        let scan_y = row as f64 + 0.5;
        crossings.clear();
        for ring in &rings {
            for edge in ring.windows(2) {
                let (x0, y0) = edge[0];
                let (x1, y1) = edge[1];
                if (y0 <= scan_y) != (y1 <= scan_y) {
                    let t = (scan_y - y0) / (y1 - y0);
                    crossings.push(x0 + t * (x1 - x0));
                }
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for span in crossings.chunks_exact(2) {
            // A pixel is inside when its center falls between crossings.
            let start = (span[0] - 0.5).ceil().max(0.0) as i64;
            let end = (span[1] - 0.5).floor().min(width - 1.0) as i64;
            for col in start..=end {
                canvas.blend_pixel(col, row as i64, rgba);
            }
        }
    }
}

/// Stroke every ring of a multi-polygon.
pub fn stroke_multi_polygon(
    canvas: &mut Canvas,
    geometry: &MultiPolygon<f64>,
    color: Color,
    width: f32,
) {
    for poly in &geometry.0 {
        stroke_line_string(canvas, poly.exterior(), color, width);
        for interior in poly.interiors() {
            stroke_line_string(canvas, interior, color, width);
        }
    }
}

/// Stroke a line string in projected coordinates.
pub fn stroke_line_string(canvas: &mut Canvas, line: &LineString<f64>, color: Color, width: f32) {
    let points: Vec<(i32, i32)> = line
        .coords()
        .map(|c| {
            let (px, py) = canvas.world_to_px(c.x, c.y);
            (px.round() as i32, py.round() as i32)
        })
        .collect();
    let rgba = Rgba(color.to_rgba());

    // Widths above one pixel redraw the segment at small offsets inside a
    // disc of the stroke radius.
    let radius = ((width - 1.0) / 2.0).ceil().max(0.0) as i32;
    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if start == end {
            continue;
        }
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                draw_antialiased_line_segment_mut(
                    &mut canvas.image,
                    (start.0 + dx, start.1 + dy),
                    (end.0 + dx, end.1 + dy),
                    rgba,
                    interpolate,
                );
            }
        }
    }
}

/// Project every ring of the geometry into pixel space, closing rings that
/// arrive open.
fn pixel_rings(canvas: &Canvas, geometry: &MultiPolygon<f64>) -> Vec<Vec<(f64, f64)>> {
    let mut rings = Vec::new();
    for poly in &geometry.0 {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            let mut px_ring: Vec<(f64, f64)> = ring
                .coords()
                .map(|c| canvas.world_to_px(c.x, c.y))
                .collect();
            if px_ring.len() < 3 {
                continue;
            }
            if px_ring.first() != px_ring.last() {
                px_ring.push(px_ring[0]);
            }
            rings.push(px_ring);
        }
    }
    rings
}
