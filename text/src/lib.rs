// glyphcast/text/src/lib.rs
//
// Copyright © 2026 The Glyphcast Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! On-demand glyph rasterization and textured-quad text rendering.
//!
//! A `FontSession` owns an outline font, a glyph cache, and the GPU
//! resources for a single reusable quad. Drawing walks a string, resolves
//! each codepoint against the cache (rasterizing missing glyphs in aligned
//! batches of 32), streams one quad per glyph through the shared vertex
//! buffer, and advances a pen cursor. There is no shaping, kerning, or
//! line layout: this is HUD and overlay text.
//!
//! Sessions are single-threaded. Every mutating operation takes `&mut
//! self`, and the device handed in must belong to the calling thread's GPU
//! context.

use euclid::default::{Point2D, Size2D};
use glyphcast_gpu::{BlendState, BufferData, BufferTarget, BufferUploadMode, ColorF, Device};
use glyphcast_gpu::{Primitive, RenderState, ShaderKind, UniformData, VertexAttrType};
use log::debug;
use std::fs;
use std::path::Path;

pub mod cache;
pub mod raster;

mod error;

pub use crate::cache::{GlyphCache, GlyphMetrics, GlyphRecord, GLYPH_BATCH_SIZE};
pub use crate::error::FontError;
pub use crate::raster::{Bitmap, FontContext, GlyphBounds, GlyphDimensions, HintingMode};
pub use crate::raster::{OutlineFont, RasterConfig};

/// The codepoint range pre-filled at load time: printable ASCII.
pub const ASCII_PREFILL_LOW: u32 = 32;
pub const ASCII_PREFILL_HIGH: u32 = 127;

const QUAD_VERTEX_COUNT: u32 = 6;
const TEXT_VERTEX_SIZE: usize = 16;

static TEXT_VERTEX_SHADER_SOURCE: &[u8] = include_bytes!("../shaders/text.vs.glsl");
static TEXT_FRAGMENT_SHADER_SOURCE: &[u8] = include_bytes!("../shaders/text.fs.glsl");

/// The direction in which strings would be laid out.
///
/// Reserved: stored on the session but not yet applied; layout is always
/// left-to-right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Direction {
    /// E.g. Latin.
    LeftToRight,
    /// E.g. Arabic.
    RightToLeft,
    /// E.g. Chinese.
    TopToBottom,
}

impl Default for Direction {
    #[inline]
    fn default() -> Direction {
        Direction::LeftToRight
    }
}

/// A loaded font plus everything needed to draw it: the glyph cache, the
/// text shader program, and the single-quad vertex buffer that every glyph
/// draw streams through.
pub struct FontSession<D, F = FontContext> where D: Device, F: OutlineFont {
    font: F,
    config: RasterConfig,
    cache: GlyphCache<D>,
    text_program: TextProgram<D>,
    vertex_array: TextVertexArray<D>,
    color: ColorF,
    direction: Direction,
}

impl<D> FontSession<D, FontContext> where D: Device {
    /// Loads a TrueType or OpenType font from a file and prepares it for
    /// drawing at the given point size.
    pub fn load<P>(device: &D,
                   path: P,
                   point_size: f32,
                   viewport_size: Size2D<i32>)
                   -> Result<FontSession<D, FontContext>, FontError>
                   where P: AsRef<Path> {
        let bytes = fs::read(path)?;
        FontSession::from_bytes(device, &bytes, point_size, viewport_size)
    }

    /// Like `load`, for font data already in memory.
    pub fn from_bytes(device: &D,
                      bytes: &[u8],
                      point_size: f32,
                      viewport_size: Size2D<i32>)
                      -> Result<FontSession<D, FontContext>, FontError> {
        let font = FontContext::from_bytes(bytes)?;
        FontSession::with_font(device, font, point_size, viewport_size)
    }
}

impl<D, F> FontSession<D, F> where D: Device, F: OutlineFont {
    /// Builds a session over any outline-font implementation. Compiles the
    /// built-in text shader, allocates the shared one-quad vertex buffer,
    /// and pre-fills printable ASCII.
    pub fn with_font(device: &D,
                     font: F,
                     point_size: f32,
                     viewport_size: Size2D<i32>)
                     -> Result<FontSession<D, F>, FontError> {
        let text_program = TextProgram::new(device)?;
        let vertex_array = TextVertexArray::new(device, &text_program);

        let mut session = FontSession {
            font,
            config: RasterConfig::new(point_size),
            cache: GlyphCache::new(),
            text_program,
            vertex_array,
            color: ColorF::white(),
            direction: Direction::default(),
        };
        session.update_resolution(device, viewport_size);
        session.generate_glyphs(device, ASCII_PREFILL_LOW, ASCII_PREFILL_HIGH);
        Ok(session)
    }

    /// Sets the color used by subsequent draws.
    #[inline]
    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.color = ColorF::new(r, g, b, a);
    }

    #[inline]
    pub fn color(&self) -> ColorF {
        self.color
    }

    #[inline]
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn point_size(&self) -> f32 {
        self.config.point_size
    }

    #[inline]
    pub fn font(&self) -> &F {
        &self.font
    }

    /// Looks up an already-cached glyph without triggering a fill.
    #[inline]
    pub fn glyph(&self, codepoint: char) -> Option<&GlyphRecord<D>> {
        self.cache.get(codepoint)
    }

    /// Recalibrates the session for a new viewport. Leaves the glyph cache
    /// and the draw color untouched.
    pub fn update_resolution(&self, device: &D, viewport_size: Size2D<i32>) {
        device.use_program(&self.text_program.program);
        device.set_uniform(&self.text_program.resolution_uniform,
                           UniformData::Vec2([viewport_size.width as f32,
                                              viewport_size.height as f32]));
        device.unuse_program();
    }

    /// Pre-warms the cache for an inclusive codepoint range. Normally this
    /// happens implicitly, 32 glyphs at a time, on the first draw that
    /// needs them.
    pub fn generate_glyphs(&mut self, device: &D, low: u32, high: u32) {
        self.cache.fill_range(device, &self.font, &self.config, low, high);
    }

    /// Draws a string with its baseline origin at `origin`, scaled by
    /// `scale`, and returns the final pen position.
    ///
    /// Codepoints the font has no glyph for are skipped without moving the
    /// pen. An empty string touches no GPU state at all.
    pub fn draw(&mut self, device: &D, origin: Point2D<f32>, scale: f32, text: &str)
                -> Point2D<f32> {
        let mut pen = origin;
        if text.is_empty() {
            return pen;
        }

        device.use_program(&self.text_program.program);
        device.set_uniform(&self.text_program.color_uniform,
                           UniformData::Vec4(self.color.to_array()));
        device.set_uniform(&self.text_program.texture_uniform, UniformData::TextureUnit(0));
        device.bind_vertex_array(&self.vertex_array.vertex_array);

        for codepoint in text.chars() {
            let glyph = match self.cache.resolve(device, &self.font, &self.config, codepoint) {
                Some(glyph) => glyph,
                None => {
                    debug!("no glyph for U+{:04X}, skipping", codepoint as u32);
                    continue;
                }
            };

            let left = pen.x + glyph.bearing_h as f32 * scale;
            let bottom = pen.y - (glyph.height - glyph.bearing_v) as f32 * scale;
            let width = glyph.width as f32 * scale;
            let height = glyph.height as f32 * scale;

            device.bind_texture(&glyph.texture, 0);
            device.upload_to_buffer(&self.vertex_array.vertex_buffer,
                                    &quad_vertices(left, bottom, width, height),
                                    BufferTarget::Vertex);
            device.draw_arrays(Primitive::Triangles, QUAD_VERTEX_COUNT, &RenderState {
                blend: BlendState::RGBSrcAlphaAlphaOneMinusSrcAlpha,
                ..RenderState::default()
            });

            pen.x += glyph.advance_px() * scale;
        }

        device.unbind_texture(0);
        device.unbind_vertex_array();
        device.unuse_program();
        pen
    }

    /// Measures the width a draw of the same string would advance the pen
    /// by, in pixels. Fills the cache like `draw` but issues no draw calls.
    pub fn width(&mut self, device: &D, scale: f32, text: &str) -> f32 {
        let mut width = 0.0;
        for codepoint in text.chars() {
            match self.cache.resolve(device, &self.font, &self.config, codepoint) {
                Some(glyph) => width += glyph.advance_px() * scale,
                None => debug!("no glyph for U+{:04X}, skipping", codepoint as u32),
            }
        }
        width
    }
}

struct TextProgram<D> where D: Device {
    program: D::Program,
    resolution_uniform: D::Uniform,
    color_uniform: D::Uniform,
    texture_uniform: D::Uniform,
}

impl<D> TextProgram<D> where D: Device {
    fn new(device: &D) -> Result<TextProgram<D>, FontError> {
        let vertex_shader = device.create_shader_from_source("text",
                                                             TEXT_VERTEX_SHADER_SOURCE,
                                                             ShaderKind::Vertex)?;
        let fragment_shader = device.create_shader_from_source("text",
                                                               TEXT_FRAGMENT_SHADER_SOURCE,
                                                               ShaderKind::Fragment)?;
        let program = device.create_program_from_shaders("text", vertex_shader,
                                                         fragment_shader)?;
        let resolution_uniform = device.get_uniform(&program, "Resolution");
        let color_uniform = device.get_uniform(&program, "Color");
        let texture_uniform = device.get_uniform(&program, "Texture");
        Ok(TextProgram { program, resolution_uniform, color_uniform, texture_uniform })
    }
}

struct TextVertexArray<D> where D: Device {
    vertex_array: D::VertexArray,
    vertex_buffer: D::Buffer,
}

impl<D> TextVertexArray<D> where D: Device {
    /// Sized for exactly one quad. Every glyph draw overwrites it in
    /// place; it is never grown.
    fn new(device: &D, text_program: &TextProgram<D>) -> TextVertexArray<D> {
        let vertex_array = device.create_vertex_array();
        let vertex_buffer = device.create_buffer();

        let position_attr = device.get_vertex_attr(&text_program.program, "Position");
        let tex_coord_attr = device.get_vertex_attr(&text_program.program, "TexCoord");

        device.bind_vertex_array(&vertex_array);
        device.use_program(&text_program.program);
        device.bind_buffer(&vertex_buffer, BufferTarget::Vertex);
        device.allocate_buffer::<TextVertex>(&vertex_buffer,
                                             BufferData::Uninitialized(QUAD_VERTEX_COUNT as
                                                                       usize),
                                             BufferTarget::Vertex,
                                             BufferUploadMode::Dynamic);
        device.configure_float_vertex_attr(&position_attr,
                                           2,
                                           VertexAttrType::F32,
                                           false,
                                           TEXT_VERTEX_SIZE,
                                           0);
        device.configure_float_vertex_attr(&tex_coord_attr,
                                           2,
                                           VertexAttrType::F32,
                                           false,
                                           TEXT_VERTEX_SIZE,
                                           8);
        device.unbind_buffer(BufferTarget::Vertex);
        device.unbind_vertex_array();
        device.unuse_program();

        TextVertexArray { vertex_array, vertex_buffer }
    }
}

#[derive(Clone, Copy, Debug)]
#[repr(C)]
struct TextVertex {
    x: f32,
    y: f32,
    u: f32,
    v: f32,
}

impl TextVertex {
    #[inline]
    fn new(x: f32, y: f32, u: f32, v: f32) -> TextVertex {
        TextVertex { x, y, u, v }
    }
}

/// Two counterclockwise triangles covering the glyph rectangle, texcoords
/// mapping (0,0)–(1,1) with v growing toward the glyph's bottom.
fn quad_vertices(left: f32, bottom: f32, width: f32, height: f32) -> [TextVertex; 6] {
    [
        TextVertex::new(left + width, bottom, 1.0, 0.0),
        TextVertex::new(left, bottom, 0.0, 0.0),
        TextVertex::new(left, bottom + height, 0.0, 1.0),
        TextVertex::new(left, bottom + height, 0.0, 1.0),
        TextVertex::new(left + width, bottom + height, 1.0, 1.0),
        TextVertex::new(left + width, bottom, 1.0, 0.0),
    ]
}
