//! Value-to-color mapping for raster basemaps.

use basemap_common::{Color, VisParams};
use image::RgbaImage;
use rayon::prelude::*;
use raster::RasterLayer;
use tracing::debug;

use crate::canvas::Canvas;

/// A color ramp with evenly spaced stops over a value range.
#[derive(Debug, Clone)]
pub struct ColorRamp {
    min: f32,
    max: f32,
    colors: Vec<Color>,
    /// Nearest-stop mapping instead of interpolation.
    discrete: bool,
}

impl ColorRamp {
    pub fn from_vis_params(vis: &VisParams) -> Self {
        let colors = if vis.palette.is_empty() {
            vec![Color::BLACK, Color::WHITE]
        } else {
            vis.palette.clone()
        };
        Self {
            min: vis.min as f32,
            max: vis.max as f32,
            colors,
            discrete: false,
        }
    }

    /// Grayscale ramp over an observed value range.
    pub fn grayscale(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            colors: vec![Color::BLACK, Color::WHITE],
            discrete: false,
        }
    }

    /// Discrete two-color map used for binary 0/1 rasters by default.
    pub fn binary_default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            colors: vec![Color::rgb(221, 221, 221), Color::rgb(34, 102, 51)],
            discrete: true,
        }
    }

    /// Map a value to a color.
    pub fn map(&self, value: f32) -> Color {
        let span = self.max - self.min;
        let t = if span <= 0.0 {
            0.0
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        };
        let last = self.colors.len() - 1;
        if last == 0 {
            return self.colors[0];
        }

        if self.discrete {
            return self.colors[(t * last as f32).round() as usize];
        }

        let position = t * last as f32;
        let low = position.floor() as usize;
        let high = (low + 1).min(last);
        let frac = position - low as f32;
        lerp(self.colors[low], self.colors[high], frac)
    }
}

fn lerp(a: Color, b: Color, t: f32) -> Color {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color::rgba(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

/// Draw a raster layer onto the canvas using its georeferenced bounds.
///
/// Each canvas pixel samples the raster nearest-neighbor; pixels outside
/// the layer bounds or with a false mask sample stay untouched, so
/// masked-out data is fully transparent rather than a sentinel color.
pub fn draw_raster_layer(canvas: &mut Canvas, layer: &RasterLayer, vis: Option<&VisParams>) {
    if layer.is_fully_masked() {
        debug!("raster layer is fully masked; nothing to draw");
        return;
    }

    let ramp = choose_ramp(layer, vis);
    let width = canvas.width();
    let height = canvas.height();
    let extent = canvas.extent;
    let bounds = layer.bounds;

    // Shade rows independently into an overlay, then composite once.
    let mut overlay = vec![0u8; (width * height * 4) as usize];
    overlay
        .par_chunks_mut((width * 4) as usize)
        .enumerate()
        .for_each(|(row, out_row)| {
            let y = extent.max_y - (row as f64 + 0.5) / height as f64 * extent.height();
            for col in 0..width as usize {
                let x = extent.min_x + (col as f64 + 0.5) / width as f64 * extent.width();
                if !bounds.contains_point(x, y) {
                    continue;
                }
                let src_col = ((x - bounds.min_x) / bounds.width() * layer.width() as f64)
                    .floor()
                    .clamp(0.0, layer.width() as f64 - 1.0) as usize;
                let src_row = ((bounds.max_y - y) / bounds.height() * layer.height() as f64)
                    .floor()
                    .clamp(0.0, layer.height() as f64 - 1.0) as usize;
                if !layer.is_valid(src_row, src_col) {
                    continue;
                }

                let rgba = if layer.bands() >= 3 {
                    // Visualized RGB payload: bands carry 0-255 channels.
                    let channel = |band| {
                        layer.sample(src_row, src_col, band).clamp(0.0, 255.0) as u8
                    };
                    [channel(0), channel(1), channel(2), 255]
                } else {
                    ramp.map(layer.sample(src_row, src_col, 0)).to_rgba()
                };
                out_row[col * 4..col * 4 + 4].copy_from_slice(&rgba);
            }
        });

    let overlay = RgbaImage::from_raw(width, height, overlay).expect("overlay dimensions");
    canvas.composite(&overlay, 1.0);
}

/// Pick the ramp for a layer: caller vis-params win; binary single-band
/// data gets the discrete two-color default; anything else is shaded
/// grayscale over its observed range.
fn choose_ramp(layer: &RasterLayer, vis: Option<&VisParams>) -> ColorRamp {
    if let Some(vis) = vis {
        return ColorRamp::from_vis_params(vis);
    }
    if layer.bands() == 1 {
        if is_binary(layer) {
            return ColorRamp::binary_default();
        }
        let (mut min, mut max) = (f32::INFINITY, f32::NEG_INFINITY);
        for value in layer.valid_samples(0) {
            min = min.min(value);
            max = max.max(value);
        }
        if min.is_finite() && max.is_finite() && max > min {
            return ColorRamp::grayscale(min, max);
        }
    }
    ColorRamp::grayscale(0.0, 1.0)
}

fn is_binary(layer: &RasterLayer) -> bool {
    layer
        .valid_samples(0)
        .all(|v| v == 0.0 || (v - 1.0).abs() < 1e-6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_interpolates() {
        let ramp = ColorRamp::from_vis_params(&VisParams {
            min: 0.0,
            max: 100.0,
            palette: vec![Color::BLACK, Color::WHITE],
        });
        assert_eq!(ramp.map(0.0), Color::BLACK);
        assert_eq!(ramp.map(100.0), Color::WHITE);
        let mid = ramp.map(50.0);
        assert!((mid.r as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_ramp_clamps_out_of_range() {
        let ramp = ColorRamp::from_vis_params(&VisParams {
            min: 0.0,
            max: 10.0,
            palette: vec![Color::BLACK, Color::WHITE],
        });
        assert_eq!(ramp.map(-5.0), Color::BLACK);
        assert_eq!(ramp.map(50.0), Color::WHITE);
    }

    #[test]
    fn test_binary_ramp_is_discrete() {
        let ramp = ColorRamp::binary_default();
        assert_eq!(ramp.map(0.0), ramp.map(0.2));
        assert_eq!(ramp.map(1.0), ramp.map(0.8));
        assert_ne!(ramp.map(0.0), ramp.map(1.0));
    }

    #[test]
    fn test_three_stop_ramp_hits_middle_stop() {
        let ramp = ColorRamp::from_vis_params(&VisParams {
            min: 0.0,
            max: 2.0,
            palette: vec![Color::rgb(0, 0, 255), Color::rgb(0, 255, 0), Color::rgb(255, 0, 0)],
        });
        assert_eq!(ramp.map(1.0), Color::rgb(0, 255, 0));
    }
}
