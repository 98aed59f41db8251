//! Handles to unloaded shaders stop resolving.

use crate::shared;
use shaderscope::registry::{Registry, DEFAULT_SHADER_NAME};

const FS: &str = "
out vec4 frag;

uniform vec4 color;

void main() {
  frag = color;
}";

pub fn fixture() {
  let mut ctx = shared::context("registry stale handle");
  let mut registry = Registry::new();

  registry
    .load_from_strings(&mut ctx, DEFAULT_SHADER_NAME, shared::FULLSCREEN_VS, FS)
    .unwrap();
  let plasma = registry
    .load_from_strings(&mut ctx, "plasma", shared::FULLSCREEN_VS, FS)
    .unwrap();

  assert!(registry
    .load_from_strings(&mut ctx, "plasma", shared::FULLSCREEN_VS, FS)
    .is_err());

  let program = registry.resolve(plasma).expect("live handle");
  shared::draw_frame(&mut ctx, program);

  drop(registry.unload("plasma"));

  assert!(registry.resolve(plasma).is_none());
  assert!(registry.get("plasma").is_none());
  assert_eq!(registry.names().collect::<Vec<_>>(), vec![DEFAULT_SHADER_NAME]);
}
