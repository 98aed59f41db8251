//! A sampler holding a dropped texture falls back to the placeholder instead of whatever texture
//! reused its unit.

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
  let mut ctx = shared::context("dropped texture");
  let mut program = Program::from_strings(&mut ctx, shared::FULLSCREEN_VS, FS).ignore_warnings();
  let texels = [255; 12];

  // keeps unit 0 busy so that the dropped texture gets another one
  let _keeper = ctx.backend().new_texture_rgb8(2, 2, &texels).unwrap();

  let dropped = ctx.backend().new_texture_rgb8(2, 2, &texels).unwrap();
  let stale = dropped.binding();
  assert_ne!(stale.unit(), Texture2D::placeholder().unit());

  program
    .set_uniform("diffuse", UniformValue::Sampler2D(stale))
    .unwrap();
  drop(dropped);

  let replacement = ctx.backend().new_texture_rgb8(2, 2, &texels).unwrap();
  assert_eq!(replacement.binding().unit(), stale.unit());

  shared::draw_frame(&mut ctx, &program);

  assert_eq!(
    program.read_back(&mut ctx, "diffuse"),
    Some(UniformValue::Sampler2D(Texture2D::placeholder()))
  );
}
