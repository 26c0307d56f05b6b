// glyphcast/text/tests/session.rs
//
// Copyright © 2026 The Glyphcast Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Session-level tests over a recording device and a deterministic outline
//! font, so the cache, the quad renderer, and the width measurer can be
//! exercised without a GPU context or a font file.

use euclid::default::{Point2D, Size2D};
use glyphcast_gpu::{BlendState, BufferData, BufferTarget, BufferUploadMode, Device, Primitive};
use glyphcast_gpu::{RenderState, ShaderError, ShaderKind, TextureFormat, UniformData};
use glyphcast_gpu::VertexAttrType;
use glyphcast_text::{FontError, FontSession, GlyphBounds, GlyphDimensions, OutlineFont};
use glyphcast_text::{Bitmap, RasterConfig};
use std::cell::{Cell, RefCell};
use std::mem;

const VIEWPORT: Size2D<i32> = Size2D::new(800, 600);

#[derive(Clone, Debug, PartialEq)]
enum Event {
    CreateTexture { id: u32, size: (i32, i32), bytes: usize },
    CreateShader(ShaderKind),
    CreateProgram,
    AllocateBuffer { bytes: usize },
    UploadBuffer { bytes: usize },
    SetUniform(String),
    UseProgram,
    UnuseProgram,
    BindVertexArray,
    UnbindVertexArray,
    BindBuffer,
    UnbindBuffer,
    BindTexture { id: u32, unit: u32 },
    UnbindTexture { unit: u32 },
    DrawArrays { primitive: Primitive, vertex_count: u32, blend: BlendState },
}

struct RecordingDevice {
    events: RefCell<Vec<Event>>,
    next_texture_id: Cell<u32>,
    fail_shaders: bool,
}

impl RecordingDevice {
    fn new() -> RecordingDevice {
        RecordingDevice {
            events: RefCell::new(vec![]),
            next_texture_id: Cell::new(1),
            fail_shaders: false,
        }
    }

    fn with_broken_shader_compiler() -> RecordingDevice {
        RecordingDevice { fail_shaders: true, ..RecordingDevice::new() }
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn take_events(&self) -> Vec<Event> {
        mem::replace(&mut *self.events.borrow_mut(), vec![])
    }

    fn draw_calls(events: &[Event]) -> Vec<(Primitive, u32, BlendState)> {
        events
            .iter()
            .filter_map(|event| match *event {
                Event::DrawArrays { primitive, vertex_count, blend } => {
                    Some((primitive, vertex_count, blend))
                }
                _ => None,
            })
            .collect()
    }

    fn texture_creations(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, Event::CreateTexture { .. }))
            .count()
    }
}

struct MockTexture {
    id: u32,
    size: Size2D<i32>,
}

struct MockBuffer;
struct MockProgram;
struct MockShader;
struct MockVertexArray;
struct MockVertexAttr;

struct MockUniform {
    name: String,
}

impl Device for RecordingDevice {
    type Buffer = MockBuffer;
    type Program = MockProgram;
    type Shader = MockShader;
    type Texture = MockTexture;
    type Uniform = MockUniform;
    type VertexArray = MockVertexArray;
    type VertexAttr = MockVertexAttr;

    fn create_texture_from_data(&self,
                                format: TextureFormat,
                                size: Size2D<i32>,
                                data: &[u8])
                                -> MockTexture {
        assert_eq!(format, TextureFormat::RGBA8);
        assert_eq!(data.len(), size.width as usize * size.height as usize * 4);
        let id = self.next_texture_id.get();
        self.next_texture_id.set(id + 1);
        self.record(Event::CreateTexture {
            id,
            size: (size.width, size.height),
            bytes: data.len(),
        });
        MockTexture { id, size }
    }

    fn create_shader_from_source(&self, name: &str, source: &[u8], kind: ShaderKind)
                                 -> Result<MockShader, ShaderError> {
        assert!(!source.is_empty());
        if self.fail_shaders {
            return Err(ShaderError::Compile {
                kind,
                name: name.to_owned(),
                log: "synthetic failure".to_owned(),
            });
        }
        self.record(Event::CreateShader(kind));
        Ok(MockShader)
    }

    fn create_program_from_shaders(&self, _: &str, _: MockShader, _: MockShader)
                                   -> Result<MockProgram, ShaderError> {
        self.record(Event::CreateProgram);
        Ok(MockProgram)
    }

    fn create_vertex_array(&self) -> MockVertexArray {
        MockVertexArray
    }

    fn create_buffer(&self) -> MockBuffer {
        MockBuffer
    }

    fn get_vertex_attr(&self, _: &MockProgram, _: &str) -> MockVertexAttr {
        MockVertexAttr
    }

    fn get_uniform(&self, _: &MockProgram, name: &str) -> MockUniform {
        MockUniform { name: name.to_owned() }
    }

    fn use_program(&self, _: &MockProgram) {
        self.record(Event::UseProgram);
    }

    fn unuse_program(&self) {
        self.record(Event::UnuseProgram);
    }

    fn configure_float_vertex_attr(&self,
                                   _: &MockVertexAttr,
                                   _: usize,
                                   _: VertexAttrType,
                                   _: bool,
                                   _: usize,
                                   _: usize) {}

    fn set_uniform(&self, uniform: &MockUniform, _: UniformData) {
        self.record(Event::SetUniform(uniform.name.clone()));
    }

    fn allocate_buffer<T>(&self,
                          _: &MockBuffer,
                          data: BufferData<T>,
                          _: BufferTarget,
                          _: BufferUploadMode) {
        let bytes = match data {
            BufferData::Uninitialized(len) => len * mem::size_of::<T>(),
            BufferData::Memory(slice) => slice.len() * mem::size_of::<T>(),
        };
        self.record(Event::AllocateBuffer { bytes });
    }

    fn upload_to_buffer<T>(&self, _: &MockBuffer, data: &[T], _: BufferTarget) {
        self.record(Event::UploadBuffer { bytes: data.len() * mem::size_of::<T>() });
    }

    fn texture_size(&self, texture: &MockTexture) -> Size2D<i32> {
        texture.size
    }

    fn bind_vertex_array(&self, _: &MockVertexArray) {
        self.record(Event::BindVertexArray);
    }

    fn unbind_vertex_array(&self) {
        self.record(Event::UnbindVertexArray);
    }

    fn bind_buffer(&self, _: &MockBuffer, _: BufferTarget) {
        self.record(Event::BindBuffer);
    }

    fn unbind_buffer(&self, _: BufferTarget) {
        self.record(Event::UnbindBuffer);
    }

    fn bind_texture(&self, texture: &MockTexture, unit: u32) {
        self.record(Event::BindTexture { id: texture.id, unit });
    }

    fn unbind_texture(&self, unit: u32) {
        self.record(Event::UnbindTexture { unit });
    }

    fn draw_arrays(&self, primitive: Primitive, vertex_count: u32, render_state: &RenderState) {
        self.record(Event::DrawArrays {
            primitive,
            vertex_count,
            blend: render_state.blend,
        });
    }
}

/// A synthetic outline font covering U+0020..=U+017E. The space has a
/// zero-area bounding box; every other glyph is 6×12 px with a small
/// codepoint-dependent advance that carries nonzero 1/64 subunits.
struct TestFont {
    queried: RefCell<Vec<u32>>,
}

const TEST_FONT_LOW: u32 = 0x20;
const TEST_FONT_HIGH: u32 = 0x17E;

impl TestFont {
    fn new() -> TestFont {
        TestFont { queried: RefCell::new(vec![]) }
    }

    fn supports(codepoint: char) -> bool {
        (TEST_FONT_LOW..=TEST_FONT_HIGH).contains(&(codepoint as u32))
    }

    fn advance_subunits(codepoint: char) -> i32 {
        ((codepoint as i32 % 8 + 8) << 6) + 13
    }

    fn advance_px(codepoint: char) -> f32 {
        (Self::advance_subunits(codepoint) >> 6) as f32
    }

    fn queried_codepoints(&self) -> Vec<u32> {
        self.queried.borrow().clone()
    }

    fn clear_queries(&self) {
        self.queried.borrow_mut().clear();
    }
}

impl OutlineFont for TestFont {
    fn glyph_dimensions(&self, _: &RasterConfig, codepoint: char) -> Option<GlyphDimensions> {
        self.queried.borrow_mut().push(codepoint as u32);
        if !Self::supports(codepoint) {
            return None;
        }
        let bounds = if codepoint == ' ' {
            GlyphBounds::default()
        } else {
            GlyphBounds { min_x: 1 << 6, min_y: -10 << 6, max_x: 7 << 6, max_y: 2 << 6 }
        };
        Some(GlyphDimensions { bounds, advance: Self::advance_subunits(codepoint) })
    }

    fn font_bounds(&self, _: &RasterConfig) -> GlyphBounds {
        GlyphBounds { min_x: 0, min_y: -12 << 6, max_x: 10 << 6, max_y: 3 << 6 }
    }

    fn rasterize_glyph(&self, _: &RasterConfig, codepoint: char, _: &mut Bitmap, _: Point2D<i32>)
                       -> bool {
        Self::supports(codepoint)
    }
}

fn new_session(device: &RecordingDevice) -> FontSession<RecordingDevice, TestFont> {
    let _ = env_logger::builder().is_test(true).try_init();
    FontSession::with_font(device, TestFont::new(), 24.0, VIEWPORT)
        .expect("session should build against the recording device")
}

#[test]
fn load_prefills_printable_ascii() {
    let device = RecordingDevice::new();
    let session = new_session(&device);

    for codepoint in 0x20..=0x7Fu32 {
        let codepoint = std::char::from_u32(codepoint).unwrap();
        assert!(session.glyph(codepoint).is_some(), "missing prefilled {:?}", codepoint);
    }
    assert!(session.glyph('\u{100}').is_none());

    let events = device.take_events();
    assert_eq!(RecordingDevice::texture_creations(&events), 96);
}

#[test]
fn measure_agrees_with_draw_pen_delta() {
    let device = RecordingDevice::new();
    let mut session = new_session(&device);

    for &scale in &[1.0, 2.5] {
        let text = "Hello, world!";
        let measured = session.width(&device, scale, text);
        let origin = Point2D::new(100.0, 50.0);
        let pen = session.draw(&device, origin, scale, text);
        assert_eq!(pen.x - origin.x, measured);
        assert_eq!(pen.y, origin.y);
    }
}

#[test]
fn cache_misses_fill_aligned_batches_of_32() {
    let device = RecordingDevice::new();
    let mut session = new_session(&device);
    session.font().clear_queries();

    // U+0101 sits in the aligned block [U+0100, U+011F].
    session.draw(&device, Point2D::new(0.0, 0.0), 1.0, "\u{101}");

    let queried = session.font().queried_codepoints();
    assert_eq!(queried, (0x100..=0x11F).collect::<Vec<u32>>());

    for codepoint in 0x100..=0x11Fu32 {
        let codepoint = std::char::from_u32(codepoint).unwrap();
        assert!(session.glyph(codepoint).is_some(), "missing batch-filled {:?}", codepoint);
    }
    assert!(session.glyph('\u{120}').is_none());
}

#[test]
fn generate_glyphs_is_idempotent() {
    let device = RecordingDevice::new();
    let mut session = new_session(&device);
    device.take_events();

    session.generate_glyphs(&device, 0x100, 0x11F);
    let first = device.take_events();
    assert_eq!(RecordingDevice::texture_creations(&first), 32);
    let (width, height, advance) = {
        let glyph = session.glyph('\u{100}').unwrap();
        (glyph.width, glyph.height, glyph.advance)
    };

    session.generate_glyphs(&device, 0x100, 0x11F);
    let second = device.take_events();
    assert_eq!(RecordingDevice::texture_creations(&second), 0);
    let glyph = session.glyph('\u{100}').unwrap();
    assert_eq!((glyph.width, glyph.height, glyph.advance), (width, height, advance));
}

#[test]
fn degenerate_glyphs_are_never_zero_sized() {
    let device = RecordingDevice::new();
    let session = new_session(&device);

    let space = session.glyph(' ').unwrap();
    assert!(space.width >= 1 && space.height >= 1);
    // The space falls back to the font-wide bounds: 10×15 px.
    assert_eq!((space.width, space.height), (10, 15));

    let events = device.take_events();
    assert!(events.contains(&Event::CreateTexture {
        id: 1,
        size: (10, 15),
        bytes: 10 * 15 * 4,
    }));
}

#[test]
fn empty_text_is_a_gpu_no_op() {
    let device = RecordingDevice::new();
    let mut session = new_session(&device);
    device.take_events();

    let origin = Point2D::new(12.0, 34.0);
    let pen = session.draw(&device, origin, 3.0, "");
    assert_eq!(pen, origin);
    assert_eq!(session.width(&device, 3.0, ""), 0.0);
    assert!(device.take_events().is_empty());
}

#[test]
fn unsupported_codepoints_are_skipped_without_advancing() {
    let device = RecordingDevice::new();
    let mut session = new_session(&device);
    device.take_events();

    // U+2022 is outside the test font's coverage.
    let text = "A\u{2022}B";
    let expected = TestFont::advance_px('A') + TestFont::advance_px('B');

    assert_eq!(session.width(&device, 1.0, text), expected);
    let pen = session.draw(&device, Point2D::new(0.0, 0.0), 1.0, text);
    assert_eq!(pen.x, expected);

    let events = device.take_events();
    assert_eq!(RecordingDevice::draw_calls(&events).len(), 2);
    assert_eq!(RecordingDevice::texture_creations(&events), 0);
}

#[test]
fn draw_streams_one_six_vertex_quad_per_glyph() {
    let device = RecordingDevice::new();
    let mut session = new_session(&device);
    device.take_events();

    let origin = Point2D::new(10.0, 20.0);
    let pen = session.draw(&device, origin, 1.0, "AB");

    let expected = TestFont::advance_px('A') + TestFont::advance_px('B');
    assert_eq!(pen.x - origin.x, expected);

    let events = device.take_events();
    let draws = RecordingDevice::draw_calls(&events);
    assert_eq!(draws.len(), 2);
    for (primitive, vertex_count, blend) in draws {
        assert_eq!(primitive, Primitive::Triangles);
        assert_eq!(vertex_count, 6);
        assert_eq!(blend, BlendState::RGBSrcAlphaAlphaOneMinusSrcAlpha);
    }

    // Each draw overwrites the shared one-quad buffer: 6 vertices × 4 f32.
    let uploads: Vec<usize> = events
        .iter()
        .filter_map(|event| match *event {
            Event::UploadBuffer { bytes } => Some(bytes),
            _ => None,
        })
        .collect();
    assert_eq!(uploads, vec![96, 96]);

    // Everything is unbound on the way out.
    let tail = &events[events.len() - 3..];
    assert_eq!(tail,
               &[Event::UnbindTexture { unit: 0 }, Event::UnbindVertexArray,
                 Event::UnuseProgram]);
}

#[test]
fn draw_sets_color_and_texture_uniforms() {
    let device = RecordingDevice::new();
    let mut session = new_session(&device);
    session.set_color(0.5, 0.25, 0.125, 1.0);
    device.take_events();

    session.draw(&device, Point2D::new(0.0, 0.0), 1.0, "A");

    let events = device.take_events();
    assert!(events.contains(&Event::SetUniform("Color".to_owned())));
    assert!(events.contains(&Event::SetUniform("Texture".to_owned())));
}

#[test]
fn update_resolution_leaves_cache_and_color_alone() {
    let device = RecordingDevice::new();
    let mut session = new_session(&device);
    session.set_color(0.0, 1.0, 0.0, 1.0);
    let cached = session.glyph('A').map(|glyph| glyph.advance);
    device.take_events();

    session.update_resolution(&device, Size2D::new(1920, 1080));

    let events = device.take_events();
    assert_eq!(events,
               vec![Event::UseProgram, Event::SetUniform("Resolution".to_owned()),
                    Event::UnuseProgram]);
    assert_eq!(session.glyph('A').map(|glyph| glyph.advance), cached);
    assert_eq!(session.color().to_array(), [0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn shader_failure_surfaces_as_an_error() {
    let device = RecordingDevice::with_broken_shader_compiler();
    let result = FontSession::with_font(&device, TestFont::new(), 24.0, VIEWPORT);
    match result {
        Err(FontError::Shader(ShaderError::Compile { kind, .. })) => {
            assert_eq!(kind, ShaderKind::Vertex);
        }
        _ => panic!("expected a shader error"),
    }
}
