//! A stage that doesn’t compile leaves an invalid program that still lists its uniforms.

use crate::shared;
use shaderscope::shader::{
  program::{Program, ProgramStatus},
  uniform::UniformValue,
  ProgramError, ProgramWarning, StageError, StageType,
};

const FS: &str = "
out vec4 frag;

uniform vec4 color;

void main() {
  frag = color
}";

pub fn fixture() {
  let mut ctx = shared::context("compile error");
  let built = Program::from_strings(&mut ctx, shared::FULLSCREEN_VS, FS);

  assert!(built.warnings.iter().any(|w| matches!(
    w,
    ProgramWarning::Program(ProgramError::Stage(StageError::CompilationFailed(
      StageType::FragmentShader,
      _
    )))
  )));

  let program = built.ignore_warnings();

  assert!(matches!(program.status(), ProgramStatus::Invalid(_)));
  assert_eq!(
    program.uniform("color").map(|u| *u.value()),
    Some(UniformValue::Vec4([0.; 4]))
  );

  // binding an invalid program leaves no program in use, and must not crash
  shared::draw_frame(&mut ctx, &program);
  assert_eq!(program.read_back(&mut ctx, "color"), None);
}
