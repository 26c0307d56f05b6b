// glyphcast/gl/src/device.rs
//
// Copyright © 2026 The Glyphcast Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `Device` implementation on raw OpenGL bindings.

use euclid::default::Size2D;
use gl::types::{GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint, GLvoid};
use glyphcast_gpu::{BlendState, BufferData, BufferTarget, BufferUploadMode, Device, Primitive};
use glyphcast_gpu::{RenderState, ShaderError, ShaderKind, TextureFormat, UniformData};
use glyphcast_gpu::VertexAttrType;
use log::warn;
use std::ffi::CString;
use std::mem;
use std::ptr;

pub struct GLDevice;

impl GLDevice {
    /// The GL function pointers must already be loaded for the current
    /// context (e.g. via `gl::load_with`) before any device call is made.
    #[inline]
    pub fn new() -> GLDevice {
        GLDevice
    }

    fn set_render_state(&self, render_state: &RenderState) {
        unsafe {
            match render_state.blend {
                BlendState::Off => {
                    gl::Disable(gl::BLEND);
                }
                BlendState::RGBOneAlphaOneMinusSrcAlpha => {
                    gl::BlendEquation(gl::FUNC_ADD);
                    gl::BlendFuncSeparate(gl::ONE,
                                          gl::ONE_MINUS_SRC_ALPHA,
                                          gl::ONE,
                                          gl::ONE);
                    gl::Enable(gl::BLEND);
                }
                BlendState::RGBSrcAlphaAlphaOneMinusSrcAlpha => {
                    gl::BlendEquation(gl::FUNC_ADD);
                    gl::BlendFuncSeparate(gl::SRC_ALPHA,
                                          gl::ONE_MINUS_SRC_ALPHA,
                                          gl::ONE,
                                          gl::ONE);
                    gl::Enable(gl::BLEND);
                }
            }

            let color_mask = render_state.color_mask as u8;
            gl::ColorMask(color_mask, color_mask, color_mask, color_mask);
        }
    }

    fn reset_render_state(&self, render_state: &RenderState) {
        unsafe {
            if render_state.blend != BlendState::Off {
                gl::Disable(gl::BLEND);
            }
            gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
        }
    }

    fn set_texture_parameters(&self) {
        unsafe {
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
        }
    }
}

impl Device for GLDevice {
    type Buffer = GLBuffer;
    type Program = GLProgram;
    type Shader = GLShader;
    type Texture = GLTexture;
    type Uniform = GLUniform;
    type VertexArray = GLVertexArray;
    type VertexAttr = GLVertexAttr;

    fn create_texture_from_data(&self,
                                format: TextureFormat,
                                size: Size2D<i32>,
                                data: &[u8])
                                -> GLTexture {
        let channels = match format {
            TextureFormat::R8 => 1,
            TextureFormat::RGBA8 => 4,
        };
        assert!(data.len() >= size.width as usize * size.height as usize * channels);

        let (internal_format, gl_format) = match format {
            TextureFormat::R8 => (gl::R8 as GLint, gl::RED),
            TextureFormat::RGBA8 => (gl::RGBA as GLint, gl::RGBA),
        };

        let mut texture = GLTexture { gl_texture: 0, size };
        unsafe {
            gl::GenTextures(1, &mut texture.gl_texture);
            self.bind_texture(&texture, 0);
            gl::TexImage2D(gl::TEXTURE_2D,
                           0,
                           internal_format,
                           size.width as GLsizei,
                           size.height as GLsizei,
                           0,
                           gl_format,
                           gl::UNSIGNED_BYTE,
                           data.as_ptr() as *const GLvoid);
        }

        self.set_texture_parameters();
        texture
    }

    fn create_shader_from_source(&self, name: &str, source: &[u8], kind: ShaderKind)
                                 -> Result<GLShader, ShaderError> {
        let gl_shader_kind = match kind {
            ShaderKind::Vertex => gl::VERTEX_SHADER,
            ShaderKind::Fragment => gl::FRAGMENT_SHADER,
        };

        unsafe {
            let gl_shader = gl::CreateShader(gl_shader_kind);
            gl::ShaderSource(gl_shader,
                             1,
                             [source.as_ptr() as *const GLchar].as_ptr(),
                             [source.len() as GLint].as_ptr());
            gl::CompileShader(gl_shader);

            let mut compile_status = 0;
            gl::GetShaderiv(gl_shader, gl::COMPILE_STATUS, &mut compile_status);
            if compile_status != gl::TRUE as GLint {
                let log = get_info_log(gl_shader, gl::GetShaderiv, gl::GetShaderInfoLog);
                gl::DeleteShader(gl_shader);
                return Err(ShaderError::Compile { kind, name: name.to_owned(), log });
            }

            // Drivers sometimes report warnings even when compilation succeeds.
            let log = get_info_log(gl_shader, gl::GetShaderiv, gl::GetShaderInfoLog);
            if !log.is_empty() {
                warn!("{:?} shader '{}' compiled with warnings: {}", kind, name, log);
            }

            Ok(GLShader { gl_shader })
        }
    }

    fn create_program_from_shaders(&self,
                                   name: &str,
                                   vertex_shader: GLShader,
                                   fragment_shader: GLShader)
                                   -> Result<GLProgram, ShaderError> {
        unsafe {
            let gl_program = gl::CreateProgram();
            gl::AttachShader(gl_program, vertex_shader.gl_shader);
            gl::AttachShader(gl_program, fragment_shader.gl_shader);
            gl::LinkProgram(gl_program);

            let mut link_status = 0;
            gl::GetProgramiv(gl_program, gl::LINK_STATUS, &mut link_status);
            if link_status != gl::TRUE as GLint {
                let log = get_info_log(gl_program, gl::GetProgramiv, gl::GetProgramInfoLog);
                gl::DeleteProgram(gl_program);
                return Err(ShaderError::Link { name: name.to_owned(), log });
            }

            Ok(GLProgram { gl_program, vertex_shader, fragment_shader })
        }
    }

    #[inline]
    fn create_vertex_array(&self) -> GLVertexArray {
        unsafe {
            let mut gl_vertex_array = 0;
            gl::GenVertexArrays(1, &mut gl_vertex_array);
            GLVertexArray { gl_vertex_array }
        }
    }

    #[inline]
    fn create_buffer(&self) -> GLBuffer {
        unsafe {
            let mut gl_buffer = 0;
            gl::GenBuffers(1, &mut gl_buffer);
            GLBuffer { gl_buffer }
        }
    }

    fn get_vertex_attr(&self, program: &GLProgram, name: &str) -> GLVertexAttr {
        let name = CString::new(format!("a{}", name)).unwrap();
        let attr = unsafe {
            gl::GetAttribLocation(program.gl_program, name.as_ptr() as *const GLchar) as GLuint
        };
        GLVertexAttr { attr }
    }

    fn get_uniform(&self, program: &GLProgram, name: &str) -> GLUniform {
        let name = CString::new(format!("u{}", name)).unwrap();
        let location = unsafe {
            gl::GetUniformLocation(program.gl_program, name.as_ptr() as *const GLchar)
        };
        GLUniform { location }
    }

    #[inline]
    fn use_program(&self, program: &GLProgram) {
        unsafe {
            gl::UseProgram(program.gl_program);
        }
    }

    #[inline]
    fn unuse_program(&self) {
        unsafe {
            gl::UseProgram(0);
        }
    }

    fn configure_float_vertex_attr(&self,
                                   attr: &GLVertexAttr,
                                   size: usize,
                                   attr_type: VertexAttrType,
                                   normalized: bool,
                                   stride: usize,
                                   offset: usize) {
        unsafe {
            gl::VertexAttribPointer(attr.attr,
                                    size as GLint,
                                    attr_type.to_gl_type(),
                                    if normalized { gl::TRUE } else { gl::FALSE },
                                    stride as GLsizei,
                                    offset as *const GLvoid);
            gl::EnableVertexAttribArray(attr.attr);
        }
    }

    fn set_uniform(&self, uniform: &GLUniform, data: UniformData) {
        if uniform.location < 0 {
            return;
        }
        unsafe {
            match data {
                UniformData::Int(value) => gl::Uniform1i(uniform.location, value),
                UniformData::Vec2(value) => {
                    gl::Uniform2f(uniform.location, value[0], value[1])
                }
                UniformData::Vec4(value) => {
                    gl::Uniform4f(uniform.location, value[0], value[1], value[2], value[3])
                }
                UniformData::TextureUnit(unit) => gl::Uniform1i(uniform.location, unit as GLint),
            }
        }
    }

    fn allocate_buffer<T>(&self,
                          buffer: &GLBuffer,
                          data: BufferData<T>,
                          target: BufferTarget,
                          mode: BufferUploadMode) {
        let target = target.to_gl_target();
        let mode = match mode {
            BufferUploadMode::Static => gl::STATIC_DRAW,
            BufferUploadMode::Dynamic => gl::DYNAMIC_DRAW,
        };
        unsafe {
            gl::BindBuffer(target, buffer.gl_buffer);
            match data {
                BufferData::Uninitialized(len) => {
                    gl::BufferData(target,
                                   (len * mem::size_of::<T>()) as GLsizeiptr,
                                   ptr::null(),
                                   mode);
                }
                BufferData::Memory(slice) => {
                    gl::BufferData(target,
                                   (slice.len() * mem::size_of::<T>()) as GLsizeiptr,
                                   slice.as_ptr() as *const GLvoid,
                                   mode);
                }
            }
        }
    }

    fn upload_to_buffer<T>(&self, buffer: &GLBuffer, data: &[T], target: BufferTarget) {
        let target = target.to_gl_target();
        unsafe {
            gl::BindBuffer(target, buffer.gl_buffer);
            gl::BufferSubData(target,
                              0,
                              (data.len() * mem::size_of::<T>()) as GLsizeiptr,
                              data.as_ptr() as *const GLvoid);
        }
    }

    #[inline]
    fn texture_size(&self, texture: &GLTexture) -> Size2D<i32> {
        texture.size
    }

    #[inline]
    fn bind_vertex_array(&self, vertex_array: &GLVertexArray) {
        unsafe {
            gl::BindVertexArray(vertex_array.gl_vertex_array);
        }
    }

    #[inline]
    fn unbind_vertex_array(&self) {
        unsafe {
            gl::BindVertexArray(0);
        }
    }

    #[inline]
    fn bind_buffer(&self, buffer: &GLBuffer, target: BufferTarget) {
        unsafe {
            gl::BindBuffer(target.to_gl_target(), buffer.gl_buffer);
        }
    }

    #[inline]
    fn unbind_buffer(&self, target: BufferTarget) {
        unsafe {
            gl::BindBuffer(target.to_gl_target(), 0);
        }
    }

    #[inline]
    fn bind_texture(&self, texture: &GLTexture, unit: u32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(gl::TEXTURE_2D, texture.gl_texture);
        }
    }

    #[inline]
    fn unbind_texture(&self, unit: u32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
    }

    fn draw_arrays(&self, primitive: Primitive, vertex_count: u32, render_state: &RenderState) {
        self.set_render_state(render_state);
        unsafe {
            gl::DrawArrays(primitive.to_gl_primitive(), 0, vertex_count as GLsizei);
        }
        self.reset_render_state(render_state);
    }
}

pub struct GLVertexArray {
    pub gl_vertex_array: GLuint,
}

impl Drop for GLVertexArray {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &mut self.gl_vertex_array);
        }
    }
}

pub struct GLVertexAttr {
    attr: GLuint,
}

pub struct GLBuffer {
    pub gl_buffer: GLuint,
}

impl Drop for GLBuffer {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &mut self.gl_buffer);
        }
    }
}

#[derive(Debug)]
pub struct GLUniform {
    location: GLint,
}

pub struct GLProgram {
    pub gl_program: GLuint,
    #[allow(dead_code)]
    vertex_shader: GLShader,
    #[allow(dead_code)]
    fragment_shader: GLShader,
}

impl Drop for GLProgram {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.gl_program);
        }
    }
}

pub struct GLShader {
    gl_shader: GLuint,
}

impl Drop for GLShader {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            gl::DeleteShader(self.gl_shader);
        }
    }
}

pub struct GLTexture {
    gl_texture: GLuint,
    pub size: Size2D<i32>,
}

impl Drop for GLTexture {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(1, &mut self.gl_texture);
        }
    }
}

fn get_info_log(object: GLuint,
                get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
                get_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar))
                -> String {
    unsafe {
        let mut info_log_length = 0;
        get_iv(object, gl::INFO_LOG_LENGTH, &mut info_log_length);
        let mut info_log = vec![0u8; info_log_length as usize];
        get_log(object,
                info_log.len() as GLsizei,
                ptr::null_mut(),
                info_log.as_mut_ptr() as *mut GLchar);
        String::from_utf8_lossy(&info_log).trim_end_matches('\0').trim().to_owned()
    }
}

trait BufferTargetExt {
    fn to_gl_target(self) -> GLuint;
}

impl BufferTargetExt for BufferTarget {
    fn to_gl_target(self) -> GLuint {
        match self {
            BufferTarget::Vertex => gl::ARRAY_BUFFER,
            BufferTarget::Index => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

trait PrimitiveExt {
    fn to_gl_primitive(self) -> GLuint;
}

impl PrimitiveExt for Primitive {
    fn to_gl_primitive(self) -> GLuint {
        match self {
            Primitive::Triangles => gl::TRIANGLES,
            Primitive::Lines => gl::LINES,
        }
    }
}

trait VertexAttrTypeExt {
    fn to_gl_type(self) -> GLuint;
}

impl VertexAttrTypeExt for VertexAttrType {
    fn to_gl_type(self) -> GLuint {
        match self {
            VertexAttrType::F32 => gl::FLOAT,
            VertexAttrType::U16 => gl::UNSIGNED_SHORT,
            VertexAttrType::U8 => gl::UNSIGNED_BYTE,
        }
    }
}
