// glyphcast/text/src/raster.rs
//
// Copyright © 2026 The Glyphcast Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The outline-font rasterizer seam.
//!
//! The renderer consumes the rasterizer as a black box: a bounding box and
//! advance per codepoint, plus a coverage mask composited into an RGBA
//! bitmap. `FontContext` is the fontdue-backed implementation; tests supply
//! their own.

use euclid::default::{Point2D, Size2D};
use fontdue;
use std::ops::Deref;

use crate::error::FontError;

/// The default rendering DPI.
pub const DPI: u32 = 72;

/// Outline gridfitting mode, as requested from the rasterizer.
///
/// Reserved: the fontdue backend performs no hinting and ignores this knob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HintingMode {
    None,
    Full,
}

/// Immutable rasterizer configuration, built once per font session and
/// passed by reference into every glyph fill.
#[derive(Clone, Copy, Debug)]
pub struct RasterConfig {
    pub point_size: f32,
    pub dpi: u32,
    pub hinting: HintingMode,
}

impl RasterConfig {
    #[inline]
    pub fn new(point_size: f32) -> RasterConfig {
        RasterConfig { point_size, dpi: DPI, hinting: HintingMode::Full }
    }

    #[inline]
    pub fn px_per_em(&self) -> f32 {
        self.point_size * self.dpi as f32 / 72.0
    }
}

/// A glyph bounding box in 26.6 fixed point, y-down: `min_y` is negative
/// above the baseline and `max_y` is positive below it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl GlyphBounds {
    #[inline]
    pub fn width_px(&self) -> i32 {
        (self.max_x - self.min_x) >> 6
    }

    #[inline]
    pub fn height_px(&self) -> i32 {
        (self.max_y - self.min_y) >> 6
    }

    #[inline]
    pub fn ascent_px(&self) -> i32 {
        -self.min_y >> 6
    }

    #[inline]
    pub fn descent_px(&self) -> i32 {
        self.max_y >> 6
    }

    #[inline]
    pub fn left_px(&self) -> i32 {
        self.min_x >> 6
    }
}

/// Scaled bounding box and advance for one codepoint.
#[derive(Clone, Copy, Debug)]
pub struct GlyphDimensions {
    pub bounds: GlyphBounds,
    /// Horizontal advance in 1/64-pixel subunits.
    pub advance: i32,
}

/// A fixed-size RGBA8 surface. The background is opaque black; glyph
/// coverage is composited in as white, so the fragment shader can read
/// coverage from the red channel.
pub struct Bitmap {
    size: Size2D<i32>,
    data: Vec<u8>,
}

impl Bitmap {
    pub fn new(size: Size2D<i32>) -> Bitmap {
        debug_assert!(size.width > 0 && size.height > 0);
        let area = size.width as usize * size.height as usize;
        let mut data = vec![0; area * 4];
        for pixel in data.chunks_mut(4) {
            pixel[3] = 255;
        }
        Bitmap { size, data }
    }

    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        self.size
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Composites an 8-bit coverage mask, clipped to the bitmap bounds.
    pub fn composite_coverage(&mut self,
                              coverage: &[u8],
                              size: Size2D<i32>,
                              origin: Point2D<i32>) {
        for y in 0..size.height {
            let dest_y = origin.y + y;
            if dest_y < 0 || dest_y >= self.size.height {
                continue;
            }
            for x in 0..size.width {
                let dest_x = origin.x + x;
                if dest_x < 0 || dest_x >= self.size.width {
                    continue;
                }
                let value = coverage[(y * size.width + x) as usize];
                let index = ((dest_y * self.size.width + dest_x) * 4) as usize;
                self.data[index] = value;
                self.data[index + 1] = value;
                self.data[index + 2] = value;
            }
        }
    }
}

/// An outline font, consumed as a black box.
pub trait OutlineFont {
    /// Returns the scaled bounding box and advance for a codepoint, or
    /// `None` if the font has no glyph for it.
    fn glyph_dimensions(&self, config: &RasterConfig, codepoint: char)
                        -> Option<GlyphDimensions>;

    /// Returns the font-wide bounds at the configured scale, used as the
    /// fallback extent for zero-area glyphs such as the space.
    fn font_bounds(&self, config: &RasterConfig) -> GlyphBounds;

    /// Draws the codepoint's coverage into `bitmap` with the pen dot at
    /// `pen` (pixels from the bitmap's top-left). Returns false if the
    /// codepoint is unsupported.
    fn rasterize_glyph(&self,
                       config: &RasterConfig,
                       codepoint: char,
                       bitmap: &mut Bitmap,
                       pen: Point2D<i32>)
                       -> bool;
}

/// The fontdue-backed rasterizer.
pub struct FontContext {
    font: fontdue::Font,
}

impl FontContext {
    /// Parses an in-memory TrueType or OpenType font.
    pub fn from_bytes<D>(bytes: D) -> Result<FontContext, FontError>
                         where D: Deref<Target = [u8]> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(FontError::Parse)?;
        Ok(FontContext { font })
    }
}

impl OutlineFont for FontContext {
    fn glyph_dimensions(&self, config: &RasterConfig, codepoint: char)
                        -> Option<GlyphDimensions> {
        if self.font.lookup_glyph_index(codepoint) == 0 {
            return None;
        }

        let metrics = self.font.metrics(codepoint, config.px_per_em());
        let top = metrics.ymin + metrics.height as i32;
        Some(GlyphDimensions {
            bounds: GlyphBounds {
                min_x: metrics.xmin << 6,
                min_y: -(top << 6),
                max_x: (metrics.xmin + metrics.width as i32) << 6,
                max_y: -metrics.ymin << 6,
            },
            advance: (metrics.advance_width * 64.0).round() as i32,
        })
    }

    fn font_bounds(&self, config: &RasterConfig) -> GlyphBounds {
        let px = config.px_per_em();
        let em = (px * 64.0).round() as i32;
        match self.font.horizontal_line_metrics(px) {
            Some(line) => GlyphBounds {
                min_x: 0,
                min_y: -(line.ascent * 64.0).round() as i32,
                max_x: em,
                max_y: (-line.descent * 64.0).round() as i32,
            },
            None => GlyphBounds { min_x: 0, min_y: -em, max_x: em, max_y: 0 },
        }
    }

    fn rasterize_glyph(&self,
                       config: &RasterConfig,
                       codepoint: char,
                       bitmap: &mut Bitmap,
                       pen: Point2D<i32>)
                       -> bool {
        if self.font.lookup_glyph_index(codepoint) == 0 {
            return false;
        }

        let (metrics, coverage) = self.font.rasterize(codepoint, config.px_per_em());
        let size = Size2D::new(metrics.width as i32, metrics.height as i32);
        let origin = Point2D::new(pen.x + metrics.xmin,
                                  pen.y - (metrics.ymin + metrics.height as i32));
        bitmap.composite_coverage(&coverage, size, origin);
        true
    }
}

#[cfg(test)]
mod tests {
    use euclid::default::{Point2D, Size2D};

    use super::{Bitmap, GlyphBounds};

    #[test]
    fn bitmap_starts_opaque_black() {
        let bitmap = Bitmap::new(Size2D::new(2, 2));
        assert_eq!(bitmap.data(), &[0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255][..]);
    }

    #[test]
    fn coverage_composites_as_white() {
        let mut bitmap = Bitmap::new(Size2D::new(2, 1));
        bitmap.composite_coverage(&[128, 255], Size2D::new(2, 1), Point2D::new(0, 0));
        assert_eq!(bitmap.data(), &[128, 128, 128, 255, 255, 255, 255, 255][..]);
    }

    #[test]
    fn coverage_is_clipped_to_the_bitmap() {
        let mut bitmap = Bitmap::new(Size2D::new(1, 1));
        bitmap.composite_coverage(&[1, 2, 3, 4], Size2D::new(2, 2), Point2D::new(-1, -1));
        assert_eq!(bitmap.data(), &[4, 4, 4, 255][..]);
    }

    #[test]
    fn bounds_pixel_accessors_round_like_26_6() {
        let bounds = GlyphBounds { min_x: 64, min_y: -9 << 6, max_x: 8 << 6, max_y: 2 << 6 };
        assert_eq!(bounds.width_px(), 7);
        assert_eq!(bounds.height_px(), 11);
        assert_eq!(bounds.ascent_px(), 9);
        assert_eq!(bounds.descent_px(), 2);
        assert_eq!(bounds.left_px(), 1);
    }
}
