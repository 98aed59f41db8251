//! Every supported type goes to the GPU on bind and reads back identically.

use crate::shared;
use shaderscope::{
  shader::{
    program::Program,
    uniform::{UniformType, UniformValue},
  },
  texture::Texture2D,
};

const FS: &str = "
in vec2 v_uv;
out vec4 frag;

uniform int i;
uniform uint u;
uniform bool b;
uniform float f;
uniform vec2 v2;
uniform vec3 v3;
uniform vec4 v4;
uniform mat2 m2;
uniform mat3 m3;
uniform mat4 m4;
uniform sampler2D tex;

void main() {
  float s = float(i) + float(u) + float(b) + f + v2.x + v3.y + v4.z;
  s += m2[1][0] + m3[2][1] + m4[3][2];
  frag = vec4(s) + texture(tex, v_uv);
}";

fn counting(n: usize) -> Vec<f32> {
  (0..n).map(|i| i as f32 * 0.5 + 1.).collect()
}

pub fn fixture() {
  let mut ctx = shared::context("set and bind round-trip");
  let mut program = Program::from_strings(&mut ctx, shared::FULLSCREEN_VS, FS).ignore_warnings();

  assert!(program.is_linked());
  assert!(program.uniforms().iter().all(|u| u.is_active()));

  let m2 = counting(4);
  let m3 = counting(9);
  let m4 = counting(16);
  let values = [
    ("i", UniformValue::Int(-7)),
    ("u", UniformValue::UInt(42)),
    ("b", UniformValue::Bool(true)),
    ("f", UniformValue::Float(3.5)),
    ("v2", UniformValue::Vec2([1., 2.])),
    ("v3", UniformValue::Vec3([1., 2., 3.])),
    ("v4", UniformValue::Vec4([1., 2., 3., 4.])),
    ("m2", UniformValue::from_floats(UniformType::M22, &m2)),
    ("m3", UniformValue::from_floats(UniformType::M33, &m3)),
    ("m4", UniformValue::from_floats(UniformType::M44, &m4)),
    ("tex", UniformValue::Sampler2D(Texture2D::new(0, 5))),
  ];

  for (name, value) in &values {
    program.set_uniform(name, *value).unwrap();
  }

  shared::draw_frame(&mut ctx, &program);

  for (name, value) in &values {
    assert_eq!(program.read_back(&mut ctx, name).as_ref(), Some(value), "{}", name);
  }
}

