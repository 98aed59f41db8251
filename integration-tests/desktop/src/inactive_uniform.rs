//! A declared but unused uniform is kept, without a location, and binding skips it.

use crate::shared;
use shaderscope::shader::{
  program::Program,
  uniform::{UniformType, UniformValue},
  ProgramWarning,
};

const FS: &str = "
out vec4 frag;

uniform vec4 color;
uniform float unused;

void main() {
  frag = color;
}";

pub fn fixture() {
  let mut ctx = shared::context("inactive uniform");
  let built = Program::from_strings(&mut ctx, shared::FULLSCREEN_VS, FS);

  assert!(built
    .warnings
    .iter()
    .any(|w| matches!(w, ProgramWarning::InactiveUniform(name) if name == "unused")));

  let mut program = built.ignore_warnings();
  let unused = program.uniform("unused").expect("inactive uniform kept");

  assert_eq!(unused.ty(), UniformType::Float);
  assert_eq!(unused.location(), None);
  assert_eq!(unused.value(), &UniformValue::Float(0.));

  program
    .set_uniform("unused", UniformValue::Float(2.))
    .unwrap();
  shared::draw_frame(&mut ctx, &program);

  assert_eq!(program.read_back(&mut ctx, "unused"), None);
  assert!(program.read_back(&mut ctx, "color").is_some());
}
