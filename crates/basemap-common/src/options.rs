//! Render request configuration.

use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Alpha applied to the target-region layer so it reads distinctly from the
/// raw raster and context colors underneath.
pub const REGION_FILL_ALPHA: f32 = 0.7;

/// Multiplier relating output DPI to pixels: the canvas long edge is
/// `dpi * RENDER_SCALE_MULTIPLIER` pixels, and the raster download budget
/// targets the same pixel count so the fetched data roughly matches render
/// resolution.
pub const RENDER_SCALE_MULTIPLIER: u32 = 4;

/// Configuration for one render invocation.
///
/// Every field has a default; an absent field means "use the default",
/// never "fail". Deserializes from partial YAML/JSON documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output PNG path. Defaults to `{lowercased region code}.png`.
    pub output_path: Option<PathBuf>,
    /// Draw land/ocean/coastline/border context around the target region.
    pub show_surrounding_context: bool,
    /// Draw gridlines with kilometer tick labels. When disabled the frame
    /// spines are hidden too, so the output has no dangling axis box.
    pub show_grid: bool,
    /// Stroke the target region outline.
    pub show_border: bool,
    /// Title text; drawn only when non-empty.
    pub title: Option<String>,
    pub fill_color: Color,
    pub edge_color: Color,
    pub edge_width: f32,
    pub dpi: u32,
    /// Remote raster handle for the basemap layer (e.g. an elevation
    /// dataset id). Absent means no basemap fetch.
    pub image: Option<String>,
    /// Color scale for the fetched raster.
    pub vis_params: Option<VisParams>,
    /// Clip the fetched raster server-side to the region boundary.
    pub clip_to_boundary: bool,
    /// Equirectangular world reference image drawn behind everything.
    pub world_background: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output_path: None,
            show_surrounding_context: true,
            show_grid: true,
            show_border: true,
            title: None,
            fill_color: Color::WHITE,
            edge_color: Color::BLACK,
            edge_width: 1.5,
            dpi: 300,
            image: None,
            vis_params: None,
            clip_to_boundary: false,
            world_background: None,
        }
    }
}

/// Visualization parameters for a remotely fetched raster: values in
/// `[min, max]` are mapped across the palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
    pub palette: Vec<Color>,
}

impl Default for VisParams {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            palette: vec![Color::BLACK, Color::WHITE],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = RenderOptions::default();
        assert!(opts.show_grid);
        assert!(opts.show_border);
        assert!(opts.show_surrounding_context);
        assert_eq!(opts.fill_color, Color::WHITE);
        assert_eq!(opts.edge_color, Color::BLACK);
        assert_eq!(opts.edge_width, 1.5);
        assert_eq!(opts.dpi, 300);
        assert!(opts.image.is_none());
        assert!(!opts.clip_to_boundary);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let opts: RenderOptions =
            serde_json::from_str(r##"{"show_grid": false, "fill_color": "#ff6b6b"}"##).unwrap();
        assert!(!opts.show_grid);
        assert_eq!(opts.fill_color, Color::rgb(255, 107, 107));
        // Untouched fields fall back to defaults.
        assert!(opts.show_border);
        assert_eq!(opts.dpi, 300);
    }

    #[test]
    fn test_vis_params_defaults() {
        let vis: VisParams = serde_json::from_str("{}").unwrap();
        assert_eq!(vis.min, 0.0);
        assert_eq!(vis.max, 1.0);
        assert_eq!(vis.palette.len(), 2);
    }
}
