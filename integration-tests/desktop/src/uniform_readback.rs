//! Uniforms are initialized with what the GPU holds right after linking.

use crate::shared;
use shaderscope::shader::{program::Program, uniform::UniformValue};

const FS: &str = "
in vec2 v_uv;
out vec4 frag;

uniform vec3 tint = vec3(.25, .5, 1.);
uniform int level = 3;
uniform float gain;

void main() {
  frag = vec4(tint * float(level) * gain, v_uv.x);
}";

pub fn fixture() {
  let mut ctx = shared::context("uniform read-back");
  let program = Program::from_strings(&mut ctx, shared::FULLSCREEN_VS, FS).ignore_warnings();

  assert!(program.is_linked());

  let values: Vec<_> = program
    .uniforms()
    .iter()
    .map(|u| (u.name(), *u.value()))
    .collect();

  assert_eq!(
    values,
    vec![
      ("tint", UniformValue::Vec3([0.25, 0.5, 1.])),
      ("level", UniformValue::Int(3)),
      ("gain", UniformValue::Float(0.)),
    ]
  );
}
