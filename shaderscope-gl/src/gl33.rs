//! OpenGL 3.3 backend.
//!
//! This module implements an OpenGL 3.3 backend for shaderscope. The backend type is [`GL33`].

mod draw;
mod shader;
mod state;
mod texture;

pub use self::draw::FullscreenTriangle;
pub use self::shader::{Program, Stage};
pub use self::state::GLState;
pub use self::state::StateQueryError;
pub use self::texture::{Texture, TextureError};
use std::cell::RefCell;
use std::rc::Rc;

/// An OpenGL 3.3 backend.
///
/// This type is to be used as a shaderscope backend type. It implements the whole public API.
#[derive(Debug)]
pub struct GL33 {
  pub(crate) state: Rc<RefCell<GLState>>,
}

impl GL33 {
  /// Create a new OpenGL 3.3 backend.
  ///
  /// An OpenGL context must be current on the calling thread, and only one backend can be created
  /// per thread.
  pub fn new() -> Result<Self, StateQueryError> {
    GLState::new().map(|state| GL33 {
      state: Rc::new(RefCell::new(state)),
    })
  }
}
