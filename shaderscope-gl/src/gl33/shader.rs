use crate::gl33::GL33;
use gl::{self, types::*};
use shaderscope::{
  backend::shader::Shader,
  shader::{
    uniform::{UniformType, UniformValue},
    ProgramError, StageError, StageType,
  },
  texture::Texture2D,
};
use std::{
  borrow::Cow,
  ffi::CString,
  ptr::{null, null_mut},
};

/// Compiled shader stage.
#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
  ty: StageType,
}

impl Stage {
  /// Type of the stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }
}

/// Linked shader program.
#[derive(Debug)]
pub struct Program {
  pub(crate) handle: GLuint,
}

impl Program {
  /// OpenGL handle of the program.
  pub fn handle(&self) -> GLuint {
    self.handle
  }

  fn link(&self) -> Result<(), ProgramError> {
    let handle = self.handle;

    unsafe {
      gl::LinkProgram(handle);

      let mut linked: GLint = gl::FALSE.into();
      gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

      if linked == gl::TRUE.into() {
        Ok(())
      } else {
        let mut log_len: GLint = 0;
        gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

        let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
        gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

        Err(ProgramError::link_failed(info_log_to_string(log)))
      }
    }
  }
}

unsafe impl Shader for GL33 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let c_src = CString::new(glsl_version_src(src).as_bytes())
      .map_err(|_| StageError::compilation_failed(ty, "shader source contains a NUL byte"))?;

    let handle = gl::CreateShader(opengl_shader_type(ty));

    if handle == 0 {
      return Err(StageError::compilation_failed(
        ty,
        "unable to create shader stage",
      ));
    }

    gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
    gl::CompileShader(handle);

    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

    if compiled == gl::TRUE.into() {
      Ok(Stage { handle, ty })
    } else {
      let mut log_len: GLint = 0;
      gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

      let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
      gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

      gl::DeleteShader(handle);

      Err(StageError::compilation_failed(ty, info_log_to_string(log)))
    }
  }

  unsafe fn destroy_stage(stage: &mut Self::StageRepr) {
    gl::DeleteShader(stage.handle);
  }

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let handle = gl::CreateProgram();

    gl::AttachShader(handle, vertex.handle);
    gl::AttachShader(handle, fragment.handle);

    let program = Program { handle };
    let linked = program.link();

    // stages are not needed anymore once linked; detaching them lets them be deleted right away
    gl::DetachShader(handle, vertex.handle);
    gl::DetachShader(handle, fragment.handle);

    match linked {
      Ok(()) => Ok(program),
      Err(e) => {
        gl::DeleteProgram(handle);
        Err(e)
      }
    }
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    gl::DeleteProgram(program.handle);
  }

  unsafe fn uniform_location(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<i32> {
    let c_name = CString::new(name.as_bytes()).ok()?;
    let location = gl::GetUniformLocation(program.handle, c_name.as_ptr() as *const GLchar);

    // ensure the location smells good
    if location < 0 {
      None
    } else {
      Some(location)
    }
  }

  unsafe fn read_uniform(
    &mut self,
    program: &Self::ProgramRepr,
    location: i32,
    ty: UniformType,
  ) -> UniformValue {
    let handle = program.handle;

    match ty {
      UniformType::Int => {
        let mut x: GLint = 0;
        gl::GetUniformiv(handle, location, &mut x);
        UniformValue::Int(x)
      }

      UniformType::UInt => {
        let mut x: GLuint = 0;
        gl::GetUniformuiv(handle, location, &mut x);
        UniformValue::UInt(x)
      }

      UniformType::Bool => {
        let mut x: GLint = 0;
        gl::GetUniformiv(handle, location, &mut x);
        UniformValue::Bool(x != 0)
      }

      // only the image unit is stored in the program
      UniformType::Sampler2D => {
        let mut unit: GLint = 0;
        gl::GetUniformiv(handle, location, &mut unit);
        UniformValue::Sampler2D(Texture2D::new(0, unit.max(0) as u32))
      }

      _ => {
        let mut components = [0.; 16];
        gl::GetUniformfv(handle, location, components.as_mut_ptr());
        UniformValue::from_floats(ty, &components[..ty.component_count()])
      }
    }
  }

  unsafe fn use_program(&mut self, program: Option<&Self::ProgramRepr>) {
    let handle = program.map_or(0, |program| program.handle);
    self.state.borrow_mut().use_program(handle);
  }

  unsafe fn update_uniform(
    &mut self,
    program: &Self::ProgramRepr,
    location: i32,
    value: &UniformValue,
  ) {
    debug_assert_eq!(
      self.state.borrow().current_program(),
      program.handle,
      "uniform upload to a program that is not in use"
    );

    match *value {
      UniformValue::Int(x) => gl::Uniform1i(location, x),
      UniformValue::UInt(x) => gl::Uniform1ui(location, x),
      UniformValue::Bool(x) => gl::Uniform1i(location, x as GLint),
      UniformValue::Float(x) => gl::Uniform1f(location, x),
      UniformValue::Vec2(ref v) => gl::Uniform2fv(location, 1, v.as_ptr()),
      UniformValue::Vec3(ref v) => gl::Uniform3fv(location, 1, v.as_ptr()),
      UniformValue::Vec4(ref v) => gl::Uniform4fv(location, 1, v.as_ptr()),
      UniformValue::M22(ref m) => gl::UniformMatrix2fv(location, 1, gl::FALSE, m.as_ptr()),
      UniformValue::M33(ref m) => gl::UniformMatrix3fv(location, 1, gl::FALSE, m.as_ptr()),
      UniformValue::M44(ref m) => gl::UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr()),

      UniformValue::Sampler2D(texture) => {
        let mut state = self.state.borrow_mut();

        // a dropped texture’s unit may already belong to another one
        let texture = if texture.is_placeholder()
          || state.owns_texture_unit(texture.unit(), texture.handle())
        {
          texture
        } else {
          log::warn!(
            "texture {} was deleted, sampling the placeholder instead",
            texture.handle()
          );
          Texture2D::placeholder()
        };

        if !texture.is_placeholder() {
          state.bind_texture(texture.unit(), gl::TEXTURE_2D, texture.handle());
        }

        gl::Uniform1i(location, texture.unit() as GLint);
      }
    }
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

const GLSL_VERSION: &str = "#version 330 core\n";

/// Prepend the `#version` directive to sources that lack one.
fn glsl_version_src(src: &str) -> Cow<str> {
  let has_version = src
    .lines()
    .any(|line| line.trim_start().starts_with("#version"));

  if has_version {
    Cow::Borrowed(src)
  } else {
    let mut versioned = String::from(GLSL_VERSION);
    versioned.push_str(src);
    Cow::Owned(versioned)
  }
}

fn info_log_to_string(mut log: Vec<u8>) -> String {
  // drop the NUL terminator and anything after it
  if let Some(nul) = log.iter().position(|&b| b == 0) {
    log.truncate(nul);
  }

  String::from_utf8_lossy(&log).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_prepended_when_missing() {
    let src = "void main() {}\n";
    assert_eq!(glsl_version_src(src), "#version 330 core\nvoid main() {}\n");
  }

  #[test]
  fn version_kept() {
    let src = "  #version 400 core\nvoid main() {}\n";
    assert!(matches!(glsl_version_src(src), Cow::Borrowed(s) if s == src));
  }

  #[test]
  fn info_log_truncated_at_nul() {
    assert_eq!(info_log_to_string(b"0:1: error\0\0\0".to_vec()), "0:1: error");
    assert_eq!(info_log_to_string(Vec::new()), "");
  }
}
