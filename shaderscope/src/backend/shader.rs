//! Shader backend interface.
//!
//! This interface defines the low-level API shader programs must implement to be usable. A backend
//! compiles stages, links programs, resolves uniform locations, reads uniform values back from the
//! GPU and uploads new ones.

use crate::shader::uniform::{UniformType, UniformValue};
use crate::shader::{ProgramError, StageError, StageType};

/// Shader support.
///
/// # Unsafety
///
/// Representations handed out by [`Shader::new_stage`] and [`Shader::new_program`] must stay valid
/// until their matching `destroy_*` function is called, and must not be used afterwards. The
/// wrapping types in [`crate::shader`] guarantee that.
pub unsafe trait Shader {
  /// Backend representation of a shader stage.
  type StageRepr;

  /// Backend representation of a linked shader program.
  type ProgramRepr;

  /// Create and compile a new shader stage from its source.
  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError>;

  /// Destroy a shader stage.
  ///
  /// Stages are only needed while linking; programs don’t keep them alive.
  unsafe fn destroy_stage(stage: &mut Self::StageRepr);

  /// Attach a vertex and a fragment stage and link them into a program.
  ///
  /// When linking fails, the backend releases whatever it allocated and returns
  /// [`ProgramError::LinkFailed`] with the driver log.
  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError>;

  /// Destroy a program.
  unsafe fn destroy_program(program: &mut Self::ProgramRepr);

  /// Resolve the location of a uniform by name.
  ///
  /// Returns `None` if the uniform doesn’t exist in the linked program, which is also the case
  /// for uniforms the linker optimized out.
  unsafe fn uniform_location(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<i32>;

  /// Read the value the GPU currently holds for the uniform at `location`.
  ///
  /// The returned value must be of type `ty`. For sampler uniforms, only the image unit can be read
  /// back; the texture handle is reported as `0`.
  unsafe fn read_uniform(
    &mut self,
    program: &Self::ProgramRepr,
    location: i32,
    ty: UniformType,
  ) -> UniformValue;

  /// Make a program the active one, or deactivate any program if `None` is passed.
  unsafe fn use_program(&mut self, program: Option<&Self::ProgramRepr>);

  /// Upload a value to the uniform at `location`.
  ///
  /// `program` must be the currently active program. Sampler values also bind their texture to
  /// their image unit when they hold a non-placeholder texture.
  unsafe fn update_uniform(
    &mut self,
    program: &Self::ProgramRepr,
    location: i32,
    value: &UniformValue,
  );
}
