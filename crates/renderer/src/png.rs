//! PNG encoding for RGBA canvases.
//!
//! Basemaps with few colors (flat fills, discrete ramps) encode as indexed
//! PNG (color type 3); everything else falls back to RGBA (color type 6).
//! The caller's DPI is recorded in a pHYs chunk.

use std::collections::HashMap;
use std::io::Write;

use basemap_common::{BasemapError, BasemapResult};

/// Maximum palette entries for an indexed PNG.
const MAX_PALETTE_SIZE: usize = 256;

/// Encode RGBA pixels, choosing indexed output when the image has at most
/// 256 unique colors.
pub fn encode_auto(
    pixels: &[u8],
    width: usize,
    height: usize,
    dpi: Option<u32>,
) -> BasemapResult<Vec<u8>> {
    match extract_palette(pixels) {
        Some((palette, indices)) => encode_indexed(&palette, &indices, width, height, dpi),
        None => encode_rgba(pixels, width, height, dpi),
    }
}

/// Encode RGBA pixels as a color type 6 PNG.
pub fn encode_rgba(
    pixels: &[u8],
    width: usize,
    height: usize,
    dpi: Option<u32>,
) -> BasemapResult<Vec<u8>> {
    let mut png = signature();
    write_ihdr(&mut png, width, height, 6);
    if let Some(dpi) = dpi {
        write_phys(&mut png, dpi);
    }

    let mut scanlines = Vec::with_capacity(height * (1 + width * 4));
    for row in pixels.chunks_exact(width * 4) {
        scanlines.push(0); // filter: none
        scanlines.extend_from_slice(row);
    }
    write_chunk(&mut png, b"IDAT", &deflate(&scanlines)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode palette indices as a color type 3 PNG, with a tRNS chunk when any
/// palette entry is translucent.
pub fn encode_indexed(
    palette: &[[u8; 4]],
    indices: &[u8],
    width: usize,
    height: usize,
    dpi: Option<u32>,
) -> BasemapResult<Vec<u8>> {
    let mut png = signature();
    write_ihdr(&mut png, width, height, 3);
    if let Some(dpi) = dpi {
        write_phys(&mut png, dpi);
    }

    let mut plte = Vec::with_capacity(palette.len() * 3);
    for [r, g, b, _] in palette {
        plte.extend_from_slice(&[*r, *g, *b]);
    }
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|[_, _, _, a]| *a < 255) {
        let trns: Vec<u8> = palette.iter().map(|[_, _, _, a]| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let mut scanlines = Vec::with_capacity(height * (1 + width));
    for row in indices.chunks_exact(width) {
        scanlines.push(0);
        scanlines.extend_from_slice(row);
    }
    write_chunk(&mut png, b"IDAT", &deflate(&scanlines)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// One-pass palette extraction; bails as soon as a 257th color appears.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for pixel in pixels.chunks_exact(4) {
        let key = u32::from_le_bytes([pixel[0], pixel[1], pixel[2], pixel[3]]);
        let index = match lookup.get(&key) {
            Some(&index) => index,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let index = palette.len() as u8;
                palette.push([pixel[0], pixel[1], pixel[2], pixel[3]]);
                lookup.insert(key, index);
                index
            }
        };
        indices.push(index);
    }
    Some((palette, indices))
}

fn signature() -> Vec<u8> {
    vec![137, 80, 78, 71, 13, 10, 26, 10]
}

fn write_ihdr(png: &mut Vec<u8>, width: usize, height: usize, color_type: u8) {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression
    data.push(0); // filter
    data.push(0); // interlace
    write_chunk(png, b"IHDR", &data);
}

/// Physical pixel density chunk: dots per inch converted to pixels per
/// meter.
fn write_phys(png: &mut Vec<u8>, dpi: u32) {
    let per_meter = (dpi as f64 / 0.0254).round() as u32;
    let mut data = Vec::with_capacity(9);
    data.extend_from_slice(&per_meter.to_be_bytes());
    data.extend_from_slice(&per_meter.to_be_bytes());
    data.push(1); // unit: meter
    write_chunk(png, b"pHYs", &data);
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

fn deflate(data: &[u8]) -> BasemapResult<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(data)
        .map_err(|e| BasemapError::Render(format!("IDAT compression failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| BasemapError::Render(format!("IDAT compression failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn test_palette_extraction() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            255, 0, 0, 255, // red again
        ];
        let (palette, indices) = extract_palette(&pixels).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_palette_bails_past_256_colors() {
        let mut pixels = Vec::new();
        for i in 0..300u32 {
            pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 0, 255]);
        }
        assert!(extract_palette(&pixels).is_none());
    }

    #[test]
    fn test_encode_auto_prefers_indexed() {
        // 2x2 image, two colors: indexed output is valid and small.
        let pixels = [
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 255, 0, 255, 255, 0, 0, 255, //
        ];
        let indexed = encode_auto(&pixels, 2, 2, None).unwrap();
        assert_eq!(&indexed[..8], &SIGNATURE);
        // Color type lives at byte 25 of a well-formed header.
        assert_eq!(indexed[25], 3);
    }

    #[test]
    fn test_encode_rgba_fallback() {
        let mut pixels = Vec::new();
        for i in 0..300u32 {
            pixels.extend_from_slice(&[(i % 256) as u8, (i / 2 % 256) as u8, 7, 255]);
        }
        let png = encode_auto(&pixels, 300, 1, None).unwrap();
        assert_eq!(&png[..8], &SIGNATURE);
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_phys_chunk_written_for_dpi() {
        let pixels = [0u8, 0, 0, 255];
        let png = encode_auto(&pixels, 1, 1, Some(300)).unwrap();
        let phys = b"pHYs";
        assert!(
            png.windows(4).any(|w| w == phys),
            "pHYs chunk should be present"
        );
    }

    #[test]
    fn test_transparency_emits_trns() {
        let pixels = [
            255, 0, 0, 255, //
            0, 0, 0, 0, //
        ];
        let png = encode_auto(&pixels, 2, 1, None).unwrap();
        assert!(png.windows(4).any(|w| w == b"tRNS"));
    }
}
