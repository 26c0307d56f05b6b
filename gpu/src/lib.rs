// glyphcast/gpu/src/lib.rs
//
// Copyright © 2026 The Glyphcast Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Minimal abstractions over GPU device capabilities.
//!
//! The text renderer only needs a small slice of a real graphics API:
//! compile a program, upload textures and vertex data, and issue draw
//! calls. Everything behind this trait is swappable, which also lets the
//! test suite run against a recording device with no GPU context at all.

use euclid::default::Size2D;
use std::error::Error;
use std::fmt;

pub trait Device {
    type Buffer;
    type Program;
    type Shader;
    type Texture;
    type Uniform;
    type VertexArray;
    type VertexAttr;

    fn create_texture_from_data(&self,
                                format: TextureFormat,
                                size: Size2D<i32>,
                                data: &[u8])
                                -> Self::Texture;
    fn create_shader_from_source(&self, name: &str, source: &[u8], kind: ShaderKind)
                                 -> Result<Self::Shader, ShaderError>;
    fn create_program_from_shaders(&self,
                                   name: &str,
                                   vertex_shader: Self::Shader,
                                   fragment_shader: Self::Shader)
                                   -> Result<Self::Program, ShaderError>;
    fn create_vertex_array(&self) -> Self::VertexArray;
    fn create_buffer(&self) -> Self::Buffer;
    fn get_vertex_attr(&self, program: &Self::Program, name: &str) -> Self::VertexAttr;
    fn get_uniform(&self, program: &Self::Program, name: &str) -> Self::Uniform;
    fn use_program(&self, program: &Self::Program);
    fn unuse_program(&self);
    fn configure_float_vertex_attr(&self,
                                   attr: &Self::VertexAttr,
                                   size: usize,
                                   attr_type: VertexAttrType,
                                   normalized: bool,
                                   stride: usize,
                                   offset: usize);
    fn set_uniform(&self, uniform: &Self::Uniform, data: UniformData);
    fn allocate_buffer<T>(&self,
                          buffer: &Self::Buffer,
                          data: BufferData<T>,
                          target: BufferTarget,
                          mode: BufferUploadMode);
    /// Overwrites the front of an already-allocated buffer. Never grows it.
    fn upload_to_buffer<T>(&self, buffer: &Self::Buffer, data: &[T], target: BufferTarget);
    fn texture_size(&self, texture: &Self::Texture) -> Size2D<i32>;

    fn bind_vertex_array(&self, vertex_array: &Self::VertexArray);
    fn unbind_vertex_array(&self);
    fn bind_buffer(&self, buffer: &Self::Buffer, target: BufferTarget);
    fn unbind_buffer(&self, target: BufferTarget);
    fn bind_texture(&self, texture: &Self::Texture, unit: u32);
    fn unbind_texture(&self, unit: u32);

    /// Issues one non-indexed draw call. The device applies `render_state`
    /// before drawing and restores the defaults afterward, so state such as
    /// blending can never leak out of a single draw.
    fn draw_arrays(&self, primitive: Primitive, vertex_count: u32, render_state: &RenderState);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    R8,
    RGBA8,
}

#[derive(Clone, Copy, Debug)]
pub enum VertexAttrType {
    F32,
    U16,
    U8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

#[derive(Clone, Copy, Debug)]
pub enum BufferUploadMode {
    Static,
    Dynamic,
}

pub enum BufferData<'a, T> {
    Uninitialized(usize),
    Memory(&'a [T]),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

#[derive(Clone, Copy, Debug)]
pub enum UniformData {
    Int(i32),
    Vec2([f32; 2]),
    Vec4([f32; 4]),
    TextureUnit(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Triangles,
    Lines,
}

#[derive(Clone, Debug)]
pub struct RenderState {
    pub blend: BlendState,
    pub color_mask: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlendState {
    Off,
    RGBOneAlphaOneMinusSrcAlpha,
    RGBSrcAlphaAlphaOneMinusSrcAlpha,
}

impl Default for BlendState {
    #[inline]
    fn default() -> BlendState {
        BlendState::Off
    }
}

/// A shader compilation or program link failure, with the driver's info log.
#[derive(Clone, Debug)]
pub enum ShaderError {
    Compile { kind: ShaderKind, name: String, log: String },
    Link { name: String, log: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShaderError::Compile { kind, ref name, ref log } => {
                write!(f, "{:?} shader '{}' failed to compile: {}", kind, name, log)
            }
            ShaderError::Link { ref name, ref log } => {
                write!(f, "program '{}' failed to link: {}", name, log)
            }
        }
    }
}

impl Error for ShaderError {}

/// An RGBA color with normalized `f32` components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorF {
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> ColorF {
        ColorF { r, g, b, a }
    }

    #[inline]
    pub fn white() -> ColorF {
        ColorF { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for RenderState {
    fn default() -> RenderState {
        RenderState { blend: BlendState::default(), color_mask: true }
    }
}
