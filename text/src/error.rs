// glyphcast/text/src/error.rs
//
// Copyright © 2026 The Glyphcast Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors.

use glyphcast_gpu::ShaderError;
use std::error::Error;
use std::fmt;
use std::io;

/// Errors that can occur while loading a font session.
///
/// Unsupported codepoints are not errors: they are skipped during drawing
/// and measurement and reported through the `log` facade.
#[derive(Debug)]
pub enum FontError {
    /// The font file or stream could not be read.
    Load(io::Error),
    /// The font data was malformed.
    Parse(&'static str),
    /// The text shader failed to compile or link.
    Shader(ShaderError),
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FontError::Load(ref err) => write!(f, "failed to read font: {}", err),
            FontError::Parse(reason) => write!(f, "failed to parse font: {}", reason),
            FontError::Shader(ref err) => write!(f, "failed to build text shader: {}", err),
        }
    }
}

impl Error for FontError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            FontError::Load(ref err) => Some(err),
            FontError::Parse(_) => None,
            FontError::Shader(ref err) => Some(err),
        }
    }
}

impl From<io::Error> for FontError {
    fn from(err: io::Error) -> FontError {
        FontError::Load(err)
    }
}

impl From<ShaderError> for FontError {
    fn from(err: ShaderError) -> FontError {
        FontError::Shader(err)
    }
}
