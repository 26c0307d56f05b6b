// glyphcast/gl/src/lib.rs
//
// Copyright © 2026 The Glyphcast Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An OpenGL 3.3 backend for the glyphcast device abstraction.
//!
//! Every resource struct owns its GL object name and deletes it on drop, so
//! dropping a font session releases its program, buffers, and every cached
//! glyph texture along with it.

pub mod device;

pub use crate::device::GLDevice;
