//! RGB textures that sampler uniforms can point at.

use crate::gl33::{state::GLState, GL33};
use gl::{self, types::*};
use shaderscope::texture::Texture2D;
use std::{cell::RefCell, error, fmt, os::raw::c_void, rc::Rc};

/// Errors that might happen when creating a texture.
#[non_exhaustive]
#[derive(Debug, Eq, PartialEq)]
pub enum TextureError {
  /// A texture cannot have a zero dimension.
  InvalidSize {
    /// Requested width.
    width: u32,
    /// Requested height.
    height: u32,
  },
  /// The texel slice doesn’t match the size of the texture.
  TexelCountMismatch {
    /// Number of bytes the texture needs.
    expected: usize,
    /// Number of bytes provided.
    provided: usize,
  },
}

impl fmt::Display for TextureError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      TextureError::InvalidSize { width, height } => {
        write!(f, "invalid texture size: {}×{}", width, height)
      }

      TextureError::TexelCountMismatch { expected, provided } => write!(
        f,
        "texel count mismatch: expected {} bytes, provided {}",
        expected, provided
      ),
    }
  }
}

impl error::Error for TextureError {}

/// A 2D RGB texture living on the GPU.
///
/// Each texture gets its own texture unit for its whole lifetime, so that several sampler uniforms
/// can be fed at once. Dropping the texture deletes it and gives its unit back.
///
/// A texture must outlive the sampler values taken from [`Texture::binding`]. Once it’s dropped,
/// binding a program still holding such a value samples the placeholder instead.
#[derive(Debug)]
pub struct Texture {
  handle: GLuint,
  unit: u32,
  size: [u32; 2],
  state: Rc<RefCell<GLState>>,
}

impl Texture {
  /// Value to store in a sampler uniform to sample this texture.
  pub fn binding(&self) -> Texture2D {
    Texture2D::new(self.handle, self.unit)
  }

  /// Size of the texture, in pixels.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }
}

impl Drop for Texture {
  fn drop(&mut self) {
    let mut state = self.state.borrow_mut();

    state.unbind_texture(self.handle);
    state.release_texture_unit(self.unit);

    unsafe {
      gl::DeleteTextures(1, &self.handle);
    }
  }
}

impl GL33 {
  /// Create a 2D texture from tightly packed 8-bit RGB texels, rows going bottom-up.
  pub fn new_texture_rgb8(
    &mut self,
    width: u32,
    height: u32,
    texels: &[u8],
  ) -> Result<Texture, TextureError> {
    if width == 0 || height == 0 {
      return Err(TextureError::InvalidSize { width, height });
    }

    let expected = width as usize * height as usize * 3;
    if texels.len() != expected {
      return Err(TextureError::TexelCountMismatch {
        expected,
        provided: texels.len(),
      });
    }

    let mut state = self.state.borrow_mut();
    let mut handle: GLuint = 0;

    let unit = unsafe {
      gl::GenTextures(1, &mut handle);
      let unit = state.reserve_texture_unit(handle);
      state.bind_texture(unit, gl::TEXTURE_2D, handle);

      set_sampling(gl::TEXTURE_2D);

      // RGB rows are not 4-byte aligned in general
      gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
      gl::TexImage2D(
        gl::TEXTURE_2D,
        0,
        gl::RGB8 as GLint,
        width as GLsizei,
        height as GLsizei,
        0,
        gl::RGB,
        gl::UNSIGNED_BYTE,
        texels.as_ptr() as *const c_void,
      );

      unit
    };

    log::debug!(
      "created {}×{} texture {} on unit {}",
      width,
      height,
      handle,
      unit
    );

    Ok(Texture {
      handle,
      unit,
      size: [width, height],
      state: self.state.clone(),
    })
  }
}

fn set_sampling(target: GLenum) {
  unsafe {
    gl::TexParameteri(target, gl::TEXTURE_BASE_LEVEL, 0);
    gl::TexParameteri(target, gl::TEXTURE_MAX_LEVEL, 0);
    gl::TexParameteri(target, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
    gl::TexParameteri(target, gl::TEXTURE_WRAP_T, gl::REPEAT as GLint);
    gl::TexParameteri(target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
    gl::TexParameteri(target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
  }
}
