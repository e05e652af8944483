//! Layer composition and PNG output.

use std::path::PathBuf;

use basemap_common::options::{REGION_FILL_ALPHA, RENDER_SCALE_MULTIPLIER};
use basemap_common::{BasemapResult, Color, RegionCode, RenderOptions};
use boundary::{ContextData, ResolvedBoundary};
use geo::{Coord, LineString, MapCoords, MultiPolygon};
use image::RgbaImage;
use projection::TransverseMercator;
use raster::FetchOutcome;
use tracing::{debug, info, instrument, warn};

use crate::canvas::Canvas;
use crate::{colormap, gridlines, png, polygon, text};

/// Ocean/background blue drawn when no world reference image is available.
const OCEAN_COLOR: Color = Color::rgb(173, 216, 230);
const LAND_COLOR: Color = Color::WHITE;
const COASTLINE_COLOR: Color = Color::rgb(64, 64, 64);
const BORDER_COLOR: Color = Color::rgba(96, 96, 96, 128);
const SPINE_COLOR: Color = Color::BLACK;
const TITLE_COLOR: Color = Color::rgb(17, 17, 17);

/// Compose all layers for a request into a canvas.
///
/// Drawing order, back to front: background (world reference image, ocean
/// color, or flat white when context is suppressed), context land fill,
/// raster basemap, context line work, the target polygon at fixed alpha,
/// gridlines and spines, title. Fills sit under the basemap and line work
/// sits over it so the fetched raster stays visible.
///
/// Split from [`render`] so tests can inspect pixels without touching the
/// filesystem.
pub fn compose(
    options: &RenderOptions,
    resolved: &ResolvedBoundary,
    raster: &FetchOutcome,
    context: &ContextData,
    world_background: Option<&RgbaImage>,
) -> Canvas {
    let long_edge = options.dpi * RENDER_SCALE_MULTIPLIER;
    let mut canvas = Canvas::for_extent(resolved.extent, long_edge);

    // 1. Background.
    if !options.show_surrounding_context {
        canvas.fill(Color::WHITE);
    } else if let Some(world) = world_background {
        draw_world_background(&mut canvas, world, &resolved.projection);
    } else {
        canvas.fill(OCEAN_COLOR);
    }

    // 2. Context land fill (under the basemap).
    if options.show_surrounding_context {
        if let Some(land) = &context.land {
            let projected = project_polygons(land, &resolved.projection);
            polygon::fill_multi_polygon(&mut canvas, &projected, LAND_COLOR);
        }
    }

    // 3. Raster basemap, with the georeferenced bounds from the fetcher.
    match raster {
        FetchOutcome::Fetched(layer) => {
            colormap::draw_raster_layer(&mut canvas, layer, options.vis_params.as_ref());
        }
        FetchOutcome::Skipped { reason } => {
            debug!(reason = %reason, "rendering without a basemap layer");
        }
    }

    // 4. Context line work (over the basemap).
    if options.show_surrounding_context {
        if let Some(coastlines) = &context.coastlines {
            for line in coastlines {
                let projected = project_line(line, &resolved.projection);
                polygon::stroke_line_string(&mut canvas, &projected, COASTLINE_COLOR, 0.5);
            }
        }
        if let Some(borders) = &context.borders {
            for line in borders {
                let projected = project_line(line, &resolved.projection);
                polygon::stroke_line_string(&mut canvas, &projected, BORDER_COLOR, 0.5);
            }
        }
    }

    // 5. Target polygon on its own layer, composited at fixed alpha so it
    // reads distinctly from the raw raster and context colors.
    let mut region_layer = canvas.layer();
    polygon::fill_multi_polygon(&mut region_layer, &resolved.projected, options.fill_color);
    if options.show_border {
        polygon::stroke_multi_polygon(
            &mut region_layer,
            &resolved.projected,
            options.edge_color,
            options.edge_width,
        );
    }
    canvas.composite(&region_layer.image, REGION_FILL_ALPHA);

    // 6. Gridlines and spines; with the grid disabled the spines stay
    // hidden too, so the output carries no dangling axis box.
    if options.show_grid {
        gridlines::draw_grid(&mut canvas, resolved.zone);
        gridlines::draw_spines(&mut canvas, SPINE_COLOR);
    }

    // 7. Title, only when non-empty.
    if let Some(title) = options.title.as_deref() {
        if !title.is_empty() {
            let scale = (canvas.width() / 300).max(2);
            let x = (canvas.width() as i64 - text::text_width(title, scale) as i64) / 2;
            text::draw_text(&mut canvas, x, 4 * scale as i64, title, scale, TITLE_COLOR);
        }
    }

    canvas
}

/// Render a request to a PNG file and return the resolved output path.
///
/// Failures writing the file propagate unmodified; everything upstream of
/// this point has already degraded gracefully.
#[instrument(skip_all, fields(code = %resolved.code))]
pub fn render(
    options: &RenderOptions,
    resolved: &ResolvedBoundary,
    raster: &FetchOutcome,
    context: &ContextData,
) -> BasemapResult<PathBuf> {
    let world_background = options.world_background.as_ref().and_then(|path| {
        match image::open(path) {
            Ok(img) => Some(img.to_rgba8()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "world background unreadable; skipping");
                None
            }
        }
    });

    let canvas = compose(options, resolved, raster, context, world_background.as_ref());
    let path = options
        .output_path
        .clone()
        .unwrap_or_else(|| default_output_path(&resolved.code));

    let encoded = png::encode_auto(
        canvas.image.as_raw(),
        canvas.width() as usize,
        canvas.height() as usize,
        Some(options.dpi),
    )?;
    std::fs::write(&path, encoded)?;

    info!(
        path = %path.display(),
        width = canvas.width(),
        height = canvas.height(),
        "basemap written"
    );
    Ok(path)
}

/// Default output path: `{lowercased region code}.png`.
pub fn default_output_path(code: &RegionCode) -> PathBuf {
    PathBuf::from(format!("{code}.png"))
}

fn project_polygons(
    geographic: &MultiPolygon<f64>,
    projection: &TransverseMercator,
) -> MultiPolygon<f64> {
    geographic.map_coords(|c| {
        let (x, y) = projection.forward(c.x, c.y);
        Coord { x, y }
    })
}

fn project_line(line: &LineString<f64>, projection: &TransverseMercator) -> LineString<f64> {
    line.map_coords(|c| {
        let (x, y) = projection.forward(c.x, c.y);
        Coord { x, y }
    })
}

/// Resample an equirectangular world image into the projected canvas
/// through the inverse transform.
fn draw_world_background(canvas: &mut Canvas, world: &RgbaImage, projection: &TransverseMercator) {
    let (world_w, world_h) = world.dimensions();
    for row in 0..canvas.height() {
        for col in 0..canvas.width() {
            let (x, y) = canvas.px_to_world(col, row);
            let (lon, lat) = projection.inverse(x, y);
            if !(-90.0..=90.0).contains(&lat) {
                continue;
            }
            let lon = ((lon + 180.0).rem_euclid(360.0)) - 180.0;
            let src_x = (((lon + 180.0) / 360.0) * world_w as f64)
                .clamp(0.0, world_w as f64 - 1.0) as u32;
            let src_y = (((90.0 - lat) / 180.0) * world_h as f64)
                .clamp(0.0, world_h as f64 - 1.0) as u32;
            let mut pixel = *world.get_pixel(src_x, src_y);
            pixel.0[3] = 255;
            canvas.image.put_pixel(col, row, pixel);
        }
    }
}
