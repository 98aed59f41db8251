//! Binding pushes the stored values every time, whatever happened to the GPU state in between.

use crate::shared;
use shaderscope::shader::{program::Program, uniform::UniformValue};

const FS: &str = "
out vec4 frag;

uniform vec4 color;

void main() {
  frag = color;
}";

pub fn fixture() {
  let mut ctx = shared::context("bind idempotence");
  let mut first = Program::from_strings(&mut ctx, shared::FULLSCREEN_VS, FS).ignore_warnings();
  let mut second = Program::from_strings(&mut ctx, shared::FULLSCREEN_VS, FS).ignore_warnings();

  let color = UniformValue::Vec4([0.1, 0.2, 0.3, 1.]);
  first.set_uniform("color", color).unwrap();
  second
    .set_uniform("color", UniformValue::Vec4([1., 1., 1., 1.]))
    .unwrap();

  shared::draw_frame(&mut ctx, &first);
  shared::draw_frame(&mut ctx, &first);
  assert_eq!(first.read_back(&mut ctx, "color"), Some(color));

  shared::draw_frame(&mut ctx, &second);
  shared::draw_frame(&mut ctx, &first);
  assert_eq!(first.read_back(&mut ctx, "color"), Some(color));

  // values live in the program, unbinding leaves them alone
  assert_eq!(first.uniform("color").map(|u| *u.value()), Some(color));
}
