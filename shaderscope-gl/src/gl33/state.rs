//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::error;
use std::fmt;
use std::marker::PhantomData;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// Texture units handed out to textures.
///
/// Units are reserved for the whole life of a texture, so that a sampler uniform can keep pointing
/// at the same unit across binds. Released units are reused before new ones are allocated.
#[derive(Debug, Default)]
struct BindingStack {
  next_texture_unit: u32,
  free_texture_units: Vec<u32>,
  // live texture owning each reserved unit
  owners: HashMap<u32, GLuint>,
}

impl BindingStack {
  fn reserve_texture_unit(&mut self, texture: GLuint) -> u32 {
    let unit = match self.free_texture_units.pop() {
      Some(unit) => unit,
      None => {
        let unit = self.next_texture_unit;
        self.next_texture_unit += 1;
        unit
      }
    };

    self.owners.insert(unit, texture);
    unit
  }

  fn release_texture_unit(&mut self, unit: u32) {
    if self.owners.remove(&unit).is_some() {
      self.free_texture_units.push(unit);
    }
  }

  fn owns(&self, unit: u32, texture: GLuint) -> bool {
    self.owners.get(&unit) == Some(&texture)
  }
}

/// Value last sent to the GPU.
///
/// Setting a value equal to the cached one doesn’t issue any GPU command.
#[derive(Debug)]
struct Cached<T>(T)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Store `value` and tell whether it differs from the previous one.
  fn update(&mut self, value: T) -> bool {
    if self.0 == value {
      false
    } else {
      self.0 = value;
      true
    }
  }
}

/// OpenGL state of the current thread.
///
/// Every state change the backend makes goes through this type, which remembers what was last set
/// and skips redundant GL calls. Only one can exist per thread.
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  binding_stack: BindingStack,
  viewport: Cached<[GLint; 4]>,
  clear_color: Cached<[GLfloat; 4]>,
  current_texture_unit: Cached<u32>,
  // (target, handle) bound to each unit
  bound_textures: Vec<(GLenum, GLuint)>,
  bound_vertex_array: GLuint,
  current_program: GLuint,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// > Note: keep in mind you can create only one per thread.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();
          Self::get_from_context()
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  // Seed the caches with what the context currently holds.
  fn get_from_context() -> Result<Self, StateQueryError> {
    let mut viewport = [0; 4];
    let mut clear_color = [0.; 4];

    unsafe {
      gl::GetIntegerv(gl::VIEWPORT, viewport.as_mut_ptr());
      gl::GetFloatv(gl::COLOR_CLEAR_VALUE, clear_color.as_mut_ptr());

      Ok(GLState {
        _a: PhantomData,
        binding_stack: BindingStack::default(),
        viewport: Cached(viewport),
        clear_color: Cached(clear_color),
        current_texture_unit: Cached(query_texture_unit()?),
        // 48 units is the minimum an implementation must provide
        bound_textures: vec![(gl::TEXTURE_2D, 0); 48],
        bound_vertex_array: query_binding(gl::VERTEX_ARRAY_BINDING)
          .map_err(StateQueryError::UnknownVertexArray)?,
        current_program: query_binding(gl::CURRENT_PROGRAM)
          .map_err(StateQueryError::UnknownProgram)?,
      })
    }
  }

  /// Reserve a texture unit no other texture of this state uses.
  pub(crate) fn reserve_texture_unit(&mut self, texture: GLuint) -> u32 {
    self.binding_stack.reserve_texture_unit(texture)
  }

  /// Whether `texture` is alive and still owns `unit`.
  pub(crate) fn owns_texture_unit(&self, unit: u32, texture: GLuint) -> bool {
    self.binding_stack.owns(unit, texture)
  }

  /// Give a texture unit back.
  pub(crate) fn release_texture_unit(&mut self, unit: u32) {
    self.binding_stack.release_texture_unit(unit);
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.update(viewport) {
      let [x, y, width, height] = viewport;
      gl::Viewport(x, y, width, height);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, clear_color: [GLfloat; 4]) {
    if self.clear_color.update(clear_color) {
      let [r, g, b, a] = clear_color;
      gl::ClearColor(r, g, b, a);
    }
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    if self.current_texture_unit.update(unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit);
    }
  }

  /// Bind a texture to a texture unit.
  ///
  /// The unit is made the active one first.
  pub(crate) unsafe fn bind_texture(&mut self, unit: u32, target: GLenum, handle: GLuint) {
    self.set_texture_unit(unit);

    let unit = unit as usize;
    if unit >= self.bound_textures.len() {
      self.bound_textures.resize(unit + 1, (gl::TEXTURE_2D, 0));
    }

    if self.bound_textures[unit] != (target, handle) {
      gl::BindTexture(target, handle);
      self.bound_textures[unit] = (target, handle);
    }
  }

  /// Forget every binding of a texture that is about to be deleted.
  pub(crate) fn unbind_texture(&mut self, handle: GLuint) {
    for t in &mut self.bound_textures {
      if t.1 == handle {
        *t = (gl::TEXTURE_2D, 0);
      }
    }
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_vertex_array != handle {
      gl::BindVertexArray(handle);
      self.bound_vertex_array = handle;
    }
  }

  pub(crate) unsafe fn unbind_vertex_array(&mut self) {
    self.bind_vertex_array(0, Bind::Cached)
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program != handle {
      gl::UseProgram(handle);
      self.current_program = handle;
    }
  }

  /// Handle of the program in use.
  pub(crate) fn current_program(&self) -> GLuint {
    self.current_program
  }
}

/// Should the binding be cached or forced to the provided value?
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
  /// Corrupted active texture unit.
  UnknownTextureUnit(GLenum),
  /// Corrupted vertex array binding.
  UnknownVertexArray(GLint),
  /// Corrupted program binding.
  UnknownProgram(GLint),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownTextureUnit(ref u) => write!(f, "unknown active texture unit: {}", u),
      StateQueryError::UnknownVertexArray(ref a) => write!(f, "unknown vertex array binding: {}", a),
      StateQueryError::UnknownProgram(ref p) => write!(f, "unknown program binding: {}", p),
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn query_texture_unit() -> Result<u32, StateQueryError> {
  let mut active_texture = gl::TEXTURE0 as GLint;
  gl::GetIntegerv(gl::ACTIVE_TEXTURE, &mut active_texture);

  let active_texture = active_texture as GLenum;
  active_texture
    .checked_sub(gl::TEXTURE0)
    .ok_or(StateQueryError::UnknownTextureUnit(active_texture))
}

// Handle bound to `binding`; a negative answer is returned as the error.
unsafe fn query_binding(binding: GLenum) -> Result<GLuint, GLint> {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(binding, &mut bound);

  if bound < 0 {
    Err(bound)
  } else {
    Ok(bound as GLuint)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cached_value_reports_changes() {
    let mut unit = Cached(0);

    assert!(!unit.update(0));
    assert!(unit.update(3));
    assert!(!unit.update(3));
    assert!(unit.update(0));
  }

  #[test]
  fn texture_units_are_reused() {
    let mut stack = BindingStack::default();

    let a = stack.reserve_texture_unit(10);
    let b = stack.reserve_texture_unit(11);
    assert_eq!((a, b), (0, 1));

    stack.release_texture_unit(a);
    assert_eq!(stack.reserve_texture_unit(12), a);
    assert_eq!(stack.reserve_texture_unit(13), 2);
  }

  #[test]
  fn released_unit_is_handed_out_once() {
    let mut stack = BindingStack::default();
    let unit = stack.reserve_texture_unit(10);

    stack.release_texture_unit(unit);
    stack.release_texture_unit(unit);

    assert_eq!(stack.reserve_texture_unit(11), unit);
    assert_ne!(stack.reserve_texture_unit(12), unit);
  }

  #[test]
  fn reused_unit_forgets_previous_owner() {
    let mut stack = BindingStack::default();
    let unit = stack.reserve_texture_unit(10);
    assert!(stack.owns(unit, 10));

    stack.release_texture_unit(unit);
    assert!(!stack.owns(unit, 10));

    assert_eq!(stack.reserve_texture_unit(11), unit);
    assert!(!stack.owns(unit, 10));
    assert!(stack.owns(unit, 11));
  }
}
