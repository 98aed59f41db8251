//! Texture references held by sampler uniforms.
//!
//! shaderscope doesn’t load textures itself. A sampler uniform only stores which texture it should
//! sample and which image unit that texture is bound to. Backends create the actual textures and
//! hand out [`Texture2D`] values describing them.

/// A 2D texture bound to an image unit.
///
/// The placeholder texture (handle `0`, unit `0`) is what sampler uniforms hold right after
/// reflection, before any real texture gets assigned.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Texture2D {
  handle: u32,
  unit: u32,
}

impl Texture2D {
  /// Reference the texture `handle` bound to image unit `unit`.
  pub const fn new(handle: u32, unit: u32) -> Self {
    Texture2D { handle, unit }
  }

  /// The empty texture.
  pub const fn placeholder() -> Self {
    Self::new(0, 0)
  }

  /// Backend handle of the texture; `0` for the placeholder.
  pub fn handle(&self) -> u32 {
    self.handle
  }

  /// Image unit the texture is bound to.
  pub fn unit(&self) -> u32 {
    self.unit
  }

  /// Whether this texture is the placeholder one.
  pub fn is_placeholder(&self) -> bool {
    self.handle == 0
  }
}
