//! Samplers start with the placeholder texture and bind real textures to their unit.

use crate::shared;
use shaderscope::{
  context::GraphicsContext as _,
  shader::{program::Program, uniform::UniformValue},
  texture::Texture2D,
};

const FS: &str = "
in vec2 v_uv;
out vec4 frag;

uniform sampler2D diffuse;

void main() {
  frag = texture(diffuse, v_uv);
}";

pub fn fixture() {
  let mut ctx = shared::context("sampler placeholder");
  let mut program = Program::from_strings(&mut ctx, shared::FULLSCREEN_VS, FS).ignore_warnings();

  assert_eq!(
    program.uniform("diffuse").map(|u| *u.value()),
    Some(UniformValue::Sampler2D(Texture2D::placeholder()))
  );

  // binding the placeholder is harmless
  shared::draw_frame(&mut ctx, &program);

  let texels = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
  let texture = ctx.backend().new_texture_rgb8(2, 2, &texels).unwrap();
  let binding = texture.binding();

  assert!(!binding.is_placeholder());

  program
    .set_uniform("diffuse", UniformValue::Sampler2D(binding))
    .unwrap();
  shared::draw_frame(&mut ctx, &program);

  // only the unit is stored GPU-side
  assert_eq!(
    program.read_back(&mut ctx, "diffuse"),
    Some(UniformValue::Sampler2D(Texture2D::new(0, binding.unit())))
  );
}
