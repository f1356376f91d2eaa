//! Rendering: layout, paint and rasterization of a code block
//!
//! The export pipeline hands a DOM element to a `Rasterizer` and gets back a
//! `Screenshot`. The built-in `BitmapRasterizer` lays the element out on a
//! fixed character grid, paints it into an RGBA bitmap and encodes PNG.

pub mod layout;
pub mod paint;
#[cfg(feature = "bitmap")]
pub mod raster;

#[cfg(feature = "bitmap")]
pub use raster::BitmapRasterizer;

use crate::Result;
use scraper::ElementRef;

/// Options passed to the rasterizer for every capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    /// Draw cross-origin images even though they taint the canvas
    pub allow_taint: bool,
    /// Treat cross-origin images as CORS-enabled so they do not taint
    pub use_cors: bool,
    /// Device pixels per CSS pixel
    pub scale: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self { allow_taint: true, use_cors: true, scale: 1 }
    }
}

/// A rasterized element
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
    /// Pixels came from a cross-origin source without CORS; they cannot be read back
    pub tainted: bool,
}

pub trait Rasterizer: Send + Sync {
    /// Rasterize `node` and its subtree.
    fn rasterize(&self, node: ElementRef<'_>, options: &RasterOptions) -> Result<Screenshot>;
}

/// Value of a CSS property inside an inline `style` attribute.
pub fn style_property<'a>(style: &'a str, name: &str) -> Option<&'a str> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(prop, _)| prop.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
}
