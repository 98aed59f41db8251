//! Reloading keeps edited values whose uniform still exists with the same type.

use crate::shared;
use shaderscope::{registry::Registry, shader::uniform::UniformValue};

const FS: &str = "
out vec4 frag;

uniform vec4 color;
uniform float gain;

void main() {
  frag = color * gain;
}";

const FS_EDITED: &str = "
out vec4 frag;

uniform vec4 color;
uniform int gain;

void main() {
  frag = color * float(gain);
}";

pub fn fixture() {
  let mut ctx = shared::context("reload carries values");
  let mut registry = Registry::new();

  let old = registry
    .load_from_strings(&mut ctx, "plasma", shared::FULLSCREEN_VS, FS)
    .unwrap();

  let color = UniformValue::Vec4([0.5, 0.25, 0.125, 1.]);
  let program = registry.get_mut("plasma").unwrap();
  program.set_uniform("color", color).unwrap();
  program.set_uniform("gain", UniformValue::Float(2.)).unwrap();

  let new = registry
    .reload_from_strings(&mut ctx, "plasma", shared::FULLSCREEN_VS, FS_EDITED)
    .unwrap();

  assert!(registry.resolve(old).is_none());

  let program = registry.resolve(new).unwrap();
  assert_eq!(program.uniform("color").map(|u| *u.value()), Some(color));
  // the type changed, so the value was not carried over
  assert_eq!(
    program.uniform("gain").map(|u| *u.value()),
    Some(UniformValue::Int(0))
  );

  shared::draw_frame(&mut ctx, program);
  assert_eq!(program.read_back(&mut ctx, "color"), Some(color));
}
