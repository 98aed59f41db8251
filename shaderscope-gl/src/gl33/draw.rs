//! Minimal drawing support.
//!
//! Shaders are shown at work on a single attributeless triangle covering the whole viewport: the
//! vertex shader is expected to derive its positions from `gl_VertexID`.

use crate::gl33::{
  state::{Bind, GLState},
  GL33,
};
use gl::{self, types::*};
use std::{cell::RefCell, rc::Rc};

/// Attributeless triangle covering the viewport.
#[derive(Debug)]
pub struct FullscreenTriangle {
  vao: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Drop for FullscreenTriangle {
  fn drop(&mut self) {
    let mut state = self.state.borrow_mut();

    unsafe {
      state.unbind_vertex_array();
      gl::DeleteVertexArrays(1, &self.vao);
    }
  }
}

impl FullscreenTriangle {
  /// Create the vertex array.
  pub fn new(gl33: &mut GL33) -> Self {
    let mut vao: GLuint = 0;

    unsafe {
      gl::GenVertexArrays(1, &mut vao);

      // force binding the vertex array so that previously bound vertex arrays (possibly the same
      // handle) don’t prevent us from binding here
      gl33.state.borrow_mut().bind_vertex_array(vao, Bind::Forced);
    }

    FullscreenTriangle {
      vao,
      state: gl33.state.clone(),
    }
  }

  /// Draw the triangle with whatever program is currently in use.
  pub fn render(&self) {
    let mut state = self.state.borrow_mut();

    unsafe {
      state.bind_vertex_array(self.vao, Bind::Cached);
      gl::DrawArrays(gl::TRIANGLES, 0, 3);
    }
  }
}

impl GL33 {
  /// Set the viewport and clear the color buffer.
  pub fn clear(&mut self, viewport: [u32; 2], color: [f32; 4]) {
    let mut state = self.state.borrow_mut();

    unsafe {
      state.set_viewport([0, 0, viewport[0] as GLint, viewport[1] as GLint]);
      state.set_clear_color(color);
      gl::Clear(gl::COLOR_BUFFER_BIT);
    }
  }
}
