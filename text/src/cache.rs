// glyphcast/text/src/cache.rs
//
// Copyright © 2026 The Glyphcast Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The glyph cache.
//!
//! Glyphs are rasterized lazily, in contiguous blocks of 32 codepoints
//! aligned to multiples of 32. One batch amortizes the per-glyph rasterizer
//! and texture setup cost and bounds the miss latency to a single block.
//! Records are immutable once inserted and are never evicted; the textures
//! they own are released together when the cache is dropped.

use euclid::default::{Point2D, Size2D};
use glyphcast_gpu::{Device, TextureFormat};
use hashbrown::HashMap;

use crate::raster::{Bitmap, GlyphDimensions, OutlineFont, RasterConfig};

/// Codepoint ranges are always filled in aligned blocks of this many glyphs.
pub const GLYPH_BATCH_SIZE: u32 = 32;

/// One cached glyph: its dedicated texture plus the geometry needed to lay
/// a quad for it.
pub struct GlyphRecord<D> where D: Device {
    pub texture: D::Texture,
    /// Bitmap width in pixels, at least 1.
    pub width: i32,
    /// Bitmap height in pixels, at least 1.
    pub height: i32,
    /// Horizontal advance in 1/64-pixel subunits.
    pub advance: i32,
    /// Offset from the pen to the glyph's left edge, in pixels.
    pub bearing_h: i32,
    /// Offset from the baseline down to the glyph's bottom edge, in pixels.
    pub bearing_v: i32,
}

impl<D> GlyphRecord<D> where D: Device {
    /// The advance in whole pixels, discarding the 1/64 subunits.
    #[inline]
    pub fn advance_px(&self) -> f32 {
        (self.advance >> 6) as f32
    }
}

/// Pixel-space glyph geometry derived from the rasterizer's bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphMetrics {
    pub width: i32,
    pub height: i32,
    pub advance: i32,
    pub bearing_h: i32,
    pub bearing_v: i32,
    pub ascent: i32,
}

impl GlyphMetrics {
    /// Derives pixel metrics from scaled bounds, substituting the font-wide
    /// bounds for zero-area glyphs (the space character, typically) and
    /// clamping to 1×1 as a last resort so no degenerate texture or quad is
    /// ever produced. Ascent, descent, and bearings come from whichever
    /// bounds ended up in effect.
    pub fn extract<F>(font: &F, config: &RasterConfig, dimensions: &GlyphDimensions)
                      -> GlyphMetrics
                      where F: OutlineFont {
        let mut bounds = dimensions.bounds;
        let (mut width, mut height) = (bounds.width_px(), bounds.height_px());

        if width == 0 || height == 0 {
            bounds = font.font_bounds(config);
            width = bounds.width_px();
            height = bounds.height_px();

            // Small fonts can produce an empty font-wide box as well.
            if width == 0 || height == 0 {
                width = 1;
                height = 1;
            }
        }

        GlyphMetrics {
            width,
            height,
            advance: dimensions.advance,
            bearing_h: bounds.left_px(),
            bearing_v: bounds.descent_px(),
            ascent: bounds.ascent_px(),
        }
    }
}

pub struct GlyphCache<D> where D: Device {
    glyphs: HashMap<char, GlyphRecord<D>>,
}

impl<D> GlyphCache<D> where D: Device {
    #[inline]
    pub fn new() -> GlyphCache<D> {
        GlyphCache { glyphs: HashMap::new() }
    }

    #[inline]
    pub fn get(&self, codepoint: char) -> Option<&GlyphRecord<D>> {
        self.glyphs.get(&codepoint)
    }

    #[inline]
    pub fn contains(&self, codepoint: char) -> bool {
        self.glyphs.contains_key(&codepoint)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Looks up a codepoint, filling its aligned 32-wide batch on a miss.
    /// Returns `None` only if the rasterizer has no glyph for it.
    pub fn resolve<F>(&mut self,
                      device: &D,
                      font: &F,
                      config: &RasterConfig,
                      codepoint: char)
                      -> Option<&GlyphRecord<D>>
                      where F: OutlineFont {
        if !self.glyphs.contains_key(&codepoint) {
            let low = codepoint as u32 - codepoint as u32 % GLYPH_BATCH_SIZE;
            self.fill_range(device, font, config, low, low + GLYPH_BATCH_SIZE - 1);
        }
        self.glyphs.get(&codepoint)
    }

    /// Rasterizes and caches every uncached codepoint in `[low, high]`.
    /// Codepoints the rasterizer does not support are left absent; entries
    /// already present are untouched, so refilling a range is a no-op.
    pub fn fill_range<F>(&mut self,
                         device: &D,
                         font: &F,
                         config: &RasterConfig,
                         low: u32,
                         high: u32)
                         where F: OutlineFont {
        for codepoint in low..=high {
            let codepoint = match std::char::from_u32(codepoint) {
                Some(codepoint) => codepoint,
                None => continue,
            };
            if self.glyphs.contains_key(&codepoint) {
                continue;
            }
            if let Some(record) = build_record(device, font, config, codepoint) {
                self.glyphs.insert(codepoint, record);
            }
        }
    }
}

/// Rasterizes one glyph into a fresh texture: extract metrics, composite
/// the coverage mask with the pen dot at (-bearing_h, ascent) so the glyph
/// interior is fully contained, then upload.
fn build_record<D, F>(device: &D,
                      font: &F,
                      config: &RasterConfig,
                      codepoint: char)
                      -> Option<GlyphRecord<D>>
                      where D: Device, F: OutlineFont {
    let dimensions = font.glyph_dimensions(config, codepoint)?;
    let metrics = GlyphMetrics::extract(font, config, &dimensions);

    let mut bitmap = Bitmap::new(Size2D::new(metrics.width, metrics.height));
    let pen = Point2D::new(-metrics.bearing_h, metrics.ascent);
    if !font.rasterize_glyph(config, codepoint, &mut bitmap, pen) {
        return None;
    }

    let texture = device.create_texture_from_data(TextureFormat::RGBA8,
                                                  bitmap.size(),
                                                  bitmap.data());
    Some(GlyphRecord {
        texture,
        width: metrics.width,
        height: metrics.height,
        advance: metrics.advance,
        bearing_h: metrics.bearing_h,
        bearing_v: metrics.bearing_v,
    })
}

#[cfg(test)]
mod tests {
    use euclid::default::Point2D;

    use crate::raster::{Bitmap, GlyphBounds, GlyphDimensions, OutlineFont, RasterConfig};

    use super::GlyphMetrics;

    struct TestFont {
        em_box: GlyphBounds,
    }

    impl TestFont {
        fn new() -> TestFont {
            TestFont {
                em_box: GlyphBounds { min_x: 0, min_y: -20 << 6, max_x: 18 << 6, max_y: 4 << 6 },
            }
        }

        fn with_empty_em_box() -> TestFont {
            TestFont { em_box: GlyphBounds::default() }
        }

        fn em_box(&self) -> GlyphBounds {
            self.em_box
        }
    }

    impl OutlineFont for TestFont {
        fn glyph_dimensions(&self, _: &RasterConfig, _: char) -> Option<GlyphDimensions> {
            None
        }

        fn font_bounds(&self, _: &RasterConfig) -> GlyphBounds {
            self.em_box
        }

        fn rasterize_glyph(&self, _: &RasterConfig, _: char, _: &mut Bitmap, _: Point2D<i32>)
                           -> bool {
            true
        }
    }

    #[test]
    fn metrics_come_from_the_scaled_bounds() {
        let font = TestFont::new();
        let config = RasterConfig::new(24.0);
        let dimensions = GlyphDimensions {
            bounds: GlyphBounds { min_x: 1 << 6, min_y: -9 << 6, max_x: 8 << 6, max_y: 2 << 6 },
            advance: 10 << 6,
        };

        let metrics = GlyphMetrics::extract(&font, &config, &dimensions);
        assert_eq!(metrics.width, 7);
        assert_eq!(metrics.height, 11);
        assert_eq!(metrics.bearing_h, 1);
        assert_eq!(metrics.bearing_v, 2);
        assert_eq!(metrics.ascent, 9);
        assert_eq!(metrics.advance, 10 << 6);
    }

    #[test]
    fn zero_area_glyphs_fall_back_to_the_font_bounds() {
        let font = TestFont::new();
        let config = RasterConfig::new(24.0);
        let dimensions = GlyphDimensions {
            bounds: GlyphBounds::default(),
            advance: 6 << 6,
        };

        let metrics = GlyphMetrics::extract(&font, &config, &dimensions);
        let font_bounds = font.em_box();
        assert_eq!(metrics.width, font_bounds.width_px());
        assert_eq!(metrics.height, font_bounds.height_px());
        // The bearings track the substituted bounds too.
        assert_eq!(metrics.bearing_h, font_bounds.left_px());
        assert_eq!(metrics.bearing_v, font_bounds.descent_px());
        assert_eq!(metrics.advance, 6 << 6);
    }

    #[test]
    fn empty_font_bounds_clamp_to_one_pixel() {
        let font = TestFont::with_empty_em_box();
        let config = RasterConfig::new(24.0);
        let dimensions = GlyphDimensions {
            bounds: GlyphBounds::default(),
            advance: 0,
        };

        let metrics = GlyphMetrics::extract(&font, &config, &dimensions);
        assert_eq!((metrics.width, metrics.height), (1, 1));
    }
}
