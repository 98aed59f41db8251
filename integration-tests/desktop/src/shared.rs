//! Helpers shared by the fixtures.

use glfw::Context as _;
use shaderscope::{context::GraphicsContext as _, shader::program::Program};
use shaderscope_gl::{gl33::FullscreenTriangle, GL33};
use shaderscope_glfw::{GL33Context, GlfwSurface};
use shaderscope_windowing::{WindowDim, WindowOpt};

/// Attributeless vertex shader covering the viewport.
pub const FULLSCREEN_VS: &str = "
out vec2 v_uv;

void main() {
  vec2 p = vec2(float((gl_VertexID & 1) << 2), float((gl_VertexID & 2) << 1)) - 1.;
  v_uv = p * .5 + .5;
  gl_Position = vec4(p, 0., 1.);
}";

/// Open a small window and get its context.
pub fn context(title: &str) -> GL33Context {
  let dim = WindowDim::Windowed {
    width: 64,
    height: 64,
  };

  GlfwSurface::new_gl33(title, WindowOpt::default().set_dim(dim))
    .expect("GLFW surface creation")
    .context
}

/// Bind a program, draw a frame with it and present it.
pub fn draw_frame(ctx: &mut GL33Context, program: &Program<GL33>) {
  let triangle = FullscreenTriangle::new(ctx.backend());

  ctx.clear([0., 0., 0., 1.]);
  program.bind(ctx);
  triangle.render();
  program.unbind(ctx);
  ctx.window.swap_buffers();
}
