//! Shader API.
//!
//! This module contains everything about shader stages and programs:
//!
//! - [`uniform`] holds the uniform model: types, values and the [`ShaderUniform`] entity.
//! - [`parser`] recognizes uniform declarations in GLSL source lines.
//! - [`program`] builds [`Program`]s out of vertex / fragment sources, reflects their uniforms and
//!   keeps them in sync with the GPU.
//!
//! [`ShaderUniform`]: crate::shader::uniform::ShaderUniform
//! [`Program`]: crate::shader::program::Program

pub mod parser;
pub mod program;
pub mod uniform;

use std::error;
use std::fmt;

use crate::backend::shader::Shader;
use crate::context::GraphicsContext;

use self::parser::ParseError;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile.
  ///
  /// The `String` is the info log provided by the driver.
  CompilationFailed(StageType, String),
}

impl StageError {
  /// Create a compilation failure.
  pub fn compilation_failed<R>(ty: StageType, reason: R) -> Self
  where
    R: Into<String>,
  {
    StageError::CompilationFailed(ty, reason.into())
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a [`Program`](program::Program) can generate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
  /// A shader stage failed to compile.
  Stage(StageError),
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
}

impl ProgramError {
  /// Create a link failure.
  pub fn link_failed<R>(reason: R) -> Self
  where
    R: Into<String>,
  {
    ProgramError::LinkFailed(reason.into())
  }
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramError::Stage(ref e) => write!(f, "shader program has stage error: {}", e),
      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::Stage(e) => Some(e),
      ProgramError::LinkFailed(_) => None,
    }
  }
}

impl From<StageError> for ProgramError {
  fn from(e: StageError) -> Self {
    ProgramError::Stage(e)
  }
}

/// Program warnings, not considered blocking errors.
///
/// They are gathered while building a program and can be inspected afterwards; all of them are
/// logged as well.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramWarning {
  /// The program could not be built; it is left invalid.
  Program(ProgramError),
  /// A uniform declaration was rejected.
  Parse(ParseError),
  /// A uniform was declared twice with different types; the later declaration is ignored.
  DuplicateUniform(String),
  /// Inactive uniform (declared but optimized out by the linker).
  InactiveUniform(String),
}

impl fmt::Display for ProgramWarning {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramWarning::Program(ref e) => write!(f, "{}", e),
      ProgramWarning::Parse(ref e) => write!(f, "rejected uniform declaration: {}", e),
      ProgramWarning::DuplicateUniform(ref n) => {
        write!(f, "uniform {} declared again with a different type", n)
      }
      ProgramWarning::InactiveUniform(ref n) => write!(f, "inactive {} uniform", n),
    }
  }
}

impl From<ProgramError> for ProgramWarning {
  fn from(e: ProgramError) -> Self {
    ProgramWarning::Program(e)
  }
}

impl From<ParseError> for ProgramWarning {
  fn from(e: ParseError) -> Self {
    ProgramWarning::Parse(e)
  }
}

/// A compiled shader stage.
///
/// Stages are transient: they are only alive while a program gets linked.
pub struct Stage<B>
where
  B: ?Sized + Shader,
{
  repr: B::StageRepr,
}

impl<B> Stage<B>
where
  B: ?Sized + Shader,
{
  /// Compile a new stage.
  pub fn new<C, R>(ctx: &mut C, ty: StageType, src: R) -> Result<Self, StageError>
  where
    C: GraphicsContext<Backend = B>,
    R: AsRef<str>,
  {
    unsafe {
      ctx
        .backend()
        .new_stage(ty, src.as_ref())
        .map(|repr| Stage { repr })
    }
  }
}

impl<B> Drop for Stage<B>
where
  B: ?Sized + Shader,
{
  fn drop(&mut self) {
    unsafe { B::destroy_stage(&mut self.repr) }
  }
}
