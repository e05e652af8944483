//! Gridlines, kilometer tick labels and frame spines.

use basemap_common::Color;
use projection::UtmZone;

use crate::canvas::Canvas;
use crate::text;

/// Number of tick intervals targeted per axis.
const TICK_BINS: usize = 6;
/// Dash pattern of the gridlines, in pixels drawn/skipped.
const DASH_ON: i64 = 4;
const DASH_OFF: i64 = 4;

const GRID_COLOR: Color = Color::rgba(128, 128, 128, 77);
const LABEL_COLOR: Color = Color::rgb(51, 51, 51);

/// Generate "nice" tick positions covering [min, max].
///
/// Steps are 1, 2 or 5 times a power of ten, chosen so roughly `bins`
/// intervals span the range.
pub fn nice_ticks(min: f64, max: f64, bins: usize) -> Vec<f64> {
    if !(max > min) || bins == 0 {
        return Vec::new();
    }
    let raw_step = (max - min) / bins as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let step = if normalized < 1.5 {
        1.0
    } else if normalized < 3.5 {
        2.0
    } else if normalized < 7.5 {
        5.0
    } else {
        10.0
    } * magnitude;

    let mut ticks = Vec::new();
    let mut tick = (min / step).ceil() * step;
    while tick <= max + step * 1e-9 {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

/// Draw dashed gridlines with kilometer labels and axis captions.
///
/// Tick values are the projection's native meters rendered as kilometers.
pub fn draw_grid(canvas: &mut Canvas, zone: UtmZone) {
    let extent = canvas.extent;
    let width = canvas.width() as i64;
    let height = canvas.height() as i64;
    let label_scale = (canvas.width() / 400).max(1);
    let grid_rgba = GRID_COLOR.to_rgba();

    for tick in nice_ticks(extent.min_x, extent.max_x, TICK_BINS) {
        let (px, _) = canvas.world_to_px(tick, extent.min_y);
        let col = px.round() as i64;
        let mut row = 0;
        while row < height {
            for dash in 0..DASH_ON.min(height - row) {
                canvas.blend_pixel(col, row + dash, grid_rgba);
            }
            row += DASH_ON + DASH_OFF;
        }

        let label = format_km(tick);
        let label_x = col - text::text_width(&label, label_scale) as i64 / 2;
        let label_y = height - (text::GLYPH_HEIGHT * label_scale) as i64 - 2 * label_scale as i64;
        text::draw_text(canvas, label_x, label_y, &label, label_scale, LABEL_COLOR);
    }

    for tick in nice_ticks(extent.min_y, extent.max_y, TICK_BINS) {
        let (_, py) = canvas.world_to_px(extent.min_x, tick);
        let row = py.round() as i64;
        let mut col = 0;
        while col < width {
            for dash in 0..DASH_ON.min(width - col) {
                canvas.blend_pixel(col + dash, row, grid_rgba);
            }
            col += DASH_ON + DASH_OFF;
        }

        let label = format_km(tick);
        let label_y = row - (text::GLYPH_HEIGHT * label_scale) as i64 / 2;
        text::draw_text(canvas, 2 * label_scale as i64, label_y, &label, label_scale, LABEL_COLOR);
    }

    // Axis captions clarify the units and the zone in use.
    let x_caption = format!("EASTING (KM) - UTM ZONE {zone}");
    let caption_x = (width - text::text_width(&x_caption, label_scale) as i64) / 2;
    let caption_y = height - (text::GLYPH_HEIGHT * label_scale) as i64;
    text::draw_text(canvas, caption_x, caption_y, &x_caption, label_scale, LABEL_COLOR);

    let y_caption = "NORTHING (KM)";
    let caption_len = (text::text_width(y_caption, label_scale)) as i64;
    text::draw_text_rotated(
        canvas,
        2 * label_scale as i64,
        (height + caption_len) / 2,
        y_caption,
        label_scale,
        LABEL_COLOR,
    );
}

/// Draw the four frame spines as a one-pixel border.
pub fn draw_spines(canvas: &mut Canvas, color: Color) {
    let rgba = color.to_rgba();
    let width = canvas.width() as i64;
    let height = canvas.height() as i64;
    for col in 0..width {
        canvas.blend_pixel(col, 0, rgba);
        canvas.blend_pixel(col, height - 1, rgba);
    }
    for row in 0..height {
        canvas.blend_pixel(0, row, rgba);
        canvas.blend_pixel(width - 1, row, rgba);
    }
}

fn format_km(meters: f64) -> String {
    format!("{:.0}", meters / 1000.0)
}
