//! Bitmap rasterizer: executes a display list into RGBA pixels and encodes PNG

use super::layout::{layout_block, CELL_WIDTH};
use super::paint::{build_display_list, PaintCommand};
use super::{RasterOptions, Rasterizer, Screenshot};
use crate::{Error, Result};
use image::{ImageFormat, Rgba, RgbaImage};
use log::{debug, warn};
use scraper::{ElementRef, Selector};
use std::io::Cursor;

/// Largest bitmap edge, in device pixels
pub const MAX_DIMENSION: u32 = 16_384;
/// Largest bitmap area, in device pixels (128 MiB of RGBA)
pub const MAX_PIXELS: u64 = 32 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapRasterizer;

impl BitmapRasterizer {
    pub fn new() -> Self {
        BitmapRasterizer
    }
}

impl Rasterizer for BitmapRasterizer {
    fn rasterize(&self, node: ElementRef<'_>, options: &RasterOptions) -> Result<Screenshot> {
        let scale = options.scale.max(1);
        let layout = layout_block(node);
        let (width, height) = bitmap_size(layout.width, layout.height, scale)?;

        let mut tainted = false;
        for src in cross_origin_images(node) {
            if options.use_cors {
                debug!("Cross-origin image {} requested with CORS", src);
            } else if options.allow_taint {
                debug!("Cross-origin image {} taints the canvas", src);
                tainted = true;
            } else {
                warn!("Skipping cross-origin image {}", src);
            }
        }

        let commands = build_display_list(&layout);
        let img = paint(&commands, width, height, scale);
        // A tainted canvas cannot be read back
        let png_data = if tainted { Vec::new() } else { encode_png(&img)? };
        debug!("Rasterized {}x{} ({} commands, {} bytes)", width, height, commands.len(), png_data.len());

        Ok(Screenshot { width, height, png_data, tainted })
    }
}

/// Device-pixel size of a `width`x`height` CSS-pixel block at `scale`,
/// rejecting anything over the edge or area limits.
pub fn bitmap_size(width: u32, height: u32, scale: u32) -> Result<(u32, u32)> {
    let (w, h) = match (width.checked_mul(scale), height.checked_mul(scale)) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            return Err(Error::RenderError(format!(
                "bitmap of {}x{} at scale {} overflows",
                width, height, scale
            )))
        }
    };
    if w > MAX_DIMENSION || h > MAX_DIMENSION {
        return Err(Error::RenderError(format!(
            "bitmap of {}x{} exceeds the {}px limit",
            w, h, MAX_DIMENSION
        )));
    }
    if w as u64 * h as u64 > MAX_PIXELS {
        return Err(Error::RenderError(format!(
            "bitmap of {}x{} exceeds the {} pixel limit",
            w, h, MAX_PIXELS
        )));
    }
    Ok((w, h))
}

/// `src` of every `<img>` under `node` that points at another origin.
pub fn cross_origin_images(node: ElementRef<'_>) -> Vec<String> {
    let sel = Selector::parse("img[src]").unwrap();
    node.select(&sel)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| {
            let s = src.trim().to_ascii_lowercase();
            s.starts_with("http://") || s.starts_with("https://") || s.starts_with("//")
        })
        .map(str::to_string)
        .collect()
}

/// Execute a display list at `scale` device pixels per CSS pixel.
pub fn paint(commands: &[PaintCommand], width: u32, height: u32, scale: u32) -> RgbaImage {
    let mut img = RgbaImage::new(width.max(1), height.max(1));
    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                fill(&mut img, *x, *y, *width, *height, *rgba, scale);
            }
            PaintCommand::Text { x, y, text, rgba } => {
                for (i, c) in text.chars().enumerate() {
                    if let Some((dx, dy, w, h)) = glyph_box(c) {
                        let cx = x + (i as u32 * CELL_WIDTH) as i32;
                        fill(&mut img, cx + dx, y + dy, w, h, *rgba, scale);
                    }
                }
            }
        }
    }
    img
}

// Glyphs are drawn as blocks sized by character class inside an 8x16 cell
fn glyph_box(c: char) -> Option<(i32, i32, u32, u32)> {
    if c.is_whitespace() {
        return None;
    }
    Some(match c {
        '.' | ',' | ':' | ';' => (3, 11, 2, 3),
        '-' | '=' | '+' | '~' => (1, 7, 6, 2),
        '_' => (0, 13, 8, 1),
        '\'' | '"' | '`' => (3, 3, 2, 4),
        c if c.is_ascii_lowercase() => (1, 6, 6, 8),
        _ => (1, 3, 6, 11),
    })
}

fn fill(img: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, rgba: (u8, u8, u8, u8), scale: u32) {
    let s = scale as i64;
    let x0 = (x as i64 * s).max(0);
    let y0 = (y as i64 * s).max(0);
    let x1 = ((x as i64 + w as i64) * s).min(img.width() as i64);
    let y1 = ((y as i64 + h as i64) * s).min(img.height() as i64);
    let px = Rgba([rgba.0, rgba.1, rgba.2, rgba.3]);
    for py in y0..y1 {
        for pxx in x0..x1 {
            img.put_pixel(pxx as u32, py as u32, px);
        }
    }
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
