//! Inspection session: the loaded shaders, the active one and the textures fed to samplers.

use crate::assignment::Assignment;
use image::ImageError;
use shaderscope::{
  context::GraphicsContext as _,
  registry::{Registry, RegistryError, ShaderId, ShaderSourcePair, DEFAULT_SHADER_NAME},
  shader::{
    program::Program,
    uniform::{UniformType, UniformValue},
  },
};
use shaderscope_gl::{gl33::Texture, gl33::TextureError, GL33};
use shaderscope_glfw::GL33Context;
use std::{collections::HashMap, error::Error, fmt, path::Path};

const DEFAULT_VS: &str = "out vec2 v_uv;

void main() {
  vec2 p = vec2(float((gl_VertexID & 1) << 2), float((gl_VertexID & 2) << 1)) - 1.;
  v_uv = p * .5 + .5;
  gl_Position = vec4(p, 0., 1.);
}
";

const DEFAULT_FS: &str = "in vec2 v_uv;
out vec4 frag;

uniform float time;
uniform vec3 tint = vec3(1., 1., 1.);

void main() {
  frag = vec4(tint * (.5 + .5 * cos(time + v_uv.xyx * 6.2831 + vec3(0., 2., 4.))), 1.);
}
";

/// Name of the uniform fed with the elapsed time, in seconds.
const TIME_UNIFORM: &str = "time";

/// Name of the uniform fed with the framebuffer size, in pixels.
const RESOLUTION_UNIFORM: &str = "resolution";

#[derive(Debug)]
pub enum SessionError {
  Registry(RegistryError),
  Image(ImageError),
  Texture(TextureError),
}

impl fmt::Display for SessionError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      SessionError::Registry(ref e) => write!(f, "cannot load shader: {}", e),
      SessionError::Image(ref e) => write!(f, "cannot load texture: {}", e),
      SessionError::Texture(ref e) => write!(f, "cannot create texture: {}", e),
    }
  }
}

impl Error for SessionError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      SessionError::Registry(e) => Some(e),
      SessionError::Image(e) => Some(e),
      SessionError::Texture(e) => Some(e),
    }
  }
}

impl From<RegistryError> for SessionError {
  fn from(e: RegistryError) -> Self {
    SessionError::Registry(e)
  }
}

impl From<ImageError> for SessionError {
  fn from(e: ImageError) -> Self {
    SessionError::Image(e)
  }
}

impl From<TextureError> for SessionError {
  fn from(e: TextureError) -> Self {
    SessionError::Texture(e)
  }
}

pub struct Session {
  registry: Registry<GL33>,
  active: Option<ShaderId>,
  // source files of every shader loaded from disk, by name
  sources: HashMap<String, ShaderSourcePair>,
  textures: Vec<Texture>,
}

impl Session {
  /// Create a session with the default shader loaded and active.
  pub fn new(ctx: &mut GL33Context) -> Result<Self, SessionError> {
    let mut registry = Registry::new();
    let id = registry.load_from_strings(ctx, DEFAULT_SHADER_NAME, DEFAULT_VS, DEFAULT_FS)?;

    Ok(Session {
      registry,
      active: Some(id),
      sources: HashMap::new(),
      textures: Vec::new(),
    })
  }

  /// Load a vertex / fragment pair from disk and make it the active shader.
  pub fn load(&mut self, ctx: &mut GL33Context, pair: &ShaderSourcePair) -> Result<(), SessionError> {
    let id = self.registry.load_pair(ctx, pair)?;

    if let Some(name) = self.registry.name_of(id) {
      self.sources.insert(name.to_owned(), pair.clone());
    }

    self.active = Some(id);
    Ok(())
  }

  /// Name of the active shader.
  pub fn active_name(&self) -> Option<&str> {
    self.active.and_then(|id| self.registry.name_of(id))
  }

  fn active_program(&self) -> Option<&Program<GL33>> {
    self.active.and_then(|id| self.registry.resolve(id))
  }

  /// Parse and store a value in every shader declaring the uniform.
  ///
  /// Returns the number of shaders the value was stored in.
  pub fn assign(&mut self, assignment: &Assignment) -> usize {
    let mut assigned = 0;
    let names: Vec<String> = self.registry.names().map(str::to_owned).collect();

    for shader in names {
      let uniform = match self
        .registry
        .get_mut(&shader)
        .and_then(|program| program.uniform_mut(&assignment.name))
      {
        Some(uniform) => uniform,
        None => continue,
      };

      match uniform.set_from_str(&assignment.value) {
        Ok(()) => assigned += 1,
        Err(e) => log::error!("{}.{}: {}", shader, assignment.name, e),
      }
    }

    if assigned == 0 {
      log::warn!("no shader declares a uniform {}", assignment.name);
    }

    assigned
  }

  /// Upload an image file and point every sampler uniform named `name` at it.
  pub fn assign_texture(
    &mut self,
    ctx: &mut GL33Context,
    name: &str,
    path: &Path,
  ) -> Result<usize, SessionError> {
    let img = image::open(path)?.flipv().to_rgb8();
    let (width, height) = img.dimensions();
    let texture = ctx.backend().new_texture_rgb8(width, height, img.as_raw())?;
    let value = UniformValue::Sampler2D(texture.binding());

    let mut assigned = 0;
    let names: Vec<String> = self.registry.names().map(str::to_owned).collect();
    for shader in names {
      if let Some(program) = self.registry.get_mut(&shader) {
        let is_sampler = program
          .uniform(name)
          .map_or(false, |u| u.ty() == UniformType::Sampler2D);

        if is_sampler && program.set_uniform(name, value).is_ok() {
          assigned += 1;
        }
      }
    }

    log::info!(
      "texture {} ({}×{}) assigned to {} shader(s)",
      path.display(),
      width,
      height,
      assigned
    );

    self.textures.push(texture);
    Ok(assigned)
  }

  /// Reload every shader loaded from disk, keeping the edited values.
  pub fn reload_all(&mut self, ctx: &mut GL33Context) {
    let active_name = self.active_name().map(str::to_owned);

    for (name, pair) in &self.sources {
      let reloaded = pair
        .paths()
        .and_then(|(vs, fs)| self.registry.reload_from_files(ctx, vs, fs));

      match reloaded {
        Ok(id) if active_name.as_deref() == Some(name.as_str()) => self.active = Some(id),
        Ok(_) => (),
        Err(e) => log::error!("cannot reload {}: {}", name, e),
      }
    }
  }

  /// Make the next shader, in load order, the active one.
  pub fn cycle(&mut self) {
    let names: Vec<&str> = self.registry.names().collect();

    if let Some(next) = next_name(&names, self.active_name()) {
      log::info!("active shader: {}", next);
      self.active = self.registry.id_of(next);
    }
  }

  /// Unload the active shader, unless it’s the default one.
  pub fn unload_active(&mut self) {
    let name = match self.active_name() {
      Some(name) if name != DEFAULT_SHADER_NAME => name.to_owned(),
      _ => {
        log::warn!("the {} shader cannot be unloaded", DEFAULT_SHADER_NAME);
        return;
      }
    };

    self.registry.unload(&name);
    self.sources.remove(&name);

    let names: Vec<&str> = self.registry.names().collect();
    self.active = fallback_name(&names).and_then(|name| self.registry.id_of(name));
  }

  /// Feed the built-in inputs, then draw the active shader.
  pub fn render(&mut self, ctx: &mut GL33Context, time: f32, draw: impl FnOnce(&mut GL33Context)) {
    let [width, height] = ctx.framebuffer_size();

    if let Some(program) = self.active.and_then(|id| self.registry.resolve_mut(id)) {
      feed(program, TIME_UNIFORM, UniformValue::Float(time));
      feed(
        program,
        RESOLUTION_UNIFORM,
        UniformValue::Vec2([width as f32, height as f32]),
      );
    }

    ctx.clear([0., 0., 0., 1.]);

    if let Some(program) = self.active_program() {
      program.bind(ctx);
      draw(ctx);
      program.unbind(ctx);
    }
  }

  /// Print the uniforms of the active shader, along with what the GPU holds.
  pub fn print_active(&self, ctx: &mut GL33Context) {
    if let (Some(name), Some(program)) = (self.active_name(), self.active_program()) {
      print_program(ctx, name, program);
    }
  }

  /// Print the uniforms of every shader.
  pub fn print_all(&self, ctx: &mut GL33Context) {
    for name in self.registry.names() {
      if let Some(program) = self.registry.get(name) {
        print_program(ctx, name, program);
      }
    }
  }
}

fn feed(program: &mut Program<GL33>, name: &str, value: UniformValue) {
  let accepts = program
    .uniform(name)
    .map_or(false, |u| u.ty() == value.ty());

  if accepts {
    let _ = program.set_uniform(name, value);
  }
}

fn print_program(ctx: &mut GL33Context, name: &str, program: &Program<GL33>) {
  let status = if program.is_linked() {
    "linked"
  } else {
    "invalid"
  };

  println!("{} ({}):", name, status);

  for uniform in program.uniforms() {
    let gpu = program
      .read_back(ctx, uniform.name())
      .map_or_else(|| "inactive".to_owned(), |value| value.to_string());

    println!(
      "  {} {} = {} (gpu: {})",
      uniform.ty(),
      uniform.name(),
      uniform.value(),
      gpu
    );
  }
}

/// Name following `current` in `names`, wrapping around.
fn next_name<'a>(names: &[&'a str], current: Option<&str>) -> Option<&'a str> {
  let next = current
    .and_then(|current| names.iter().position(|name| *name == current))
    .map_or(0, |i| (i + 1) % names.len().max(1));

  names.get(next).copied()
}

/// Shader to fall back to once the active one is gone.
fn fallback_name<'a>(names: &[&'a str]) -> Option<&'a str> {
  names
    .iter()
    .copied()
    .find(|name| *name == DEFAULT_SHADER_NAME)
    .or_else(|| names.first().copied())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cycling_wraps_around() {
    let names = ["default", "plasma", "waves"];

    assert_eq!(next_name(&names, Some("default")), Some("plasma"));
    assert_eq!(next_name(&names, Some("waves")), Some("default"));
    assert_eq!(next_name(&names, None), Some("default"));
    assert_eq!(next_name(&names, Some("gone")), Some("default"));
    assert_eq!(next_name(&[], Some("default")), None);
  }

  #[test]
  fn fallback_prefers_default() {
    assert_eq!(fallback_name(&["plasma", "default"]), Some("default"));
    assert_eq!(fallback_name(&["plasma", "waves"]), Some("plasma"));
    assert_eq!(fallback_name(&[]), None);
  }
}
