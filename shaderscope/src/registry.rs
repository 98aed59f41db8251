//! Shader registry.
//!
//! The [`Registry`] owns every loaded [`Program`], stored under a unique name. Consumers that need
//! to remember a program (the renderer’s “current shader”, an editor selection…) keep a
//! [`ShaderId`] rather than a reference. Ids are generation-checked: once the program they were
//! issued for is unloaded or replaced, they simply stop resolving.
//!
//! Loading a program under a name that is already taken is rejected. Replacing a program is an
//! explicit operation ([`Registry::reload_from_strings`], [`Registry::reload_from_files`]), which
//! carries the edited uniform values over to the new program.

use std::collections::HashMap;
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::backend::shader::Shader;
use crate::context::GraphicsContext;
use crate::shader::program::Program;

/// Name of the shader front-ends keep loaded at all times.
///
/// The registry itself treats it like any other name.
pub const DEFAULT_SHADER_NAME: &str = "default";

/// Handle to a program stored in a [`Registry`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ShaderId {
  slot: usize,
  generation: u64,
}

/// Errors that can occur when loading shaders.
#[derive(Debug)]
pub enum RegistryError {
  /// A shader source could not be read.
  Io {
    /// Path of the source.
    path: PathBuf,
    /// Underlying error.
    source: io::Error,
  },
  /// A shader is already loaded under that name.
  AlreadyLoaded(String),
  /// No shader is loaded under that name.
  NotLoaded(String),
  /// A vertex / fragment pair lacks one of its stages; the path is the one that was found.
  MissingStage(PathBuf),
  /// No shader name can be derived from that path.
  InvalidName(PathBuf),
}

impl fmt::Display for RegistryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      RegistryError::Io {
        ref path,
        ref source,
      } => write!(f, "cannot read {}: {}", path.display(), source),
      RegistryError::AlreadyLoaded(ref name) => write!(f, "shader {} is already loaded", name),
      RegistryError::NotLoaded(ref name) => write!(f, "shader {} is not loaded", name),
      RegistryError::MissingStage(ref path) => {
        write!(f, "no matching stage found for {}", path.display())
      }
      RegistryError::InvalidName(ref path) => {
        write!(f, "cannot name a shader after {}", path.display())
      }
    }
  }
}

impl error::Error for RegistryError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      RegistryError::Io { source, .. } => Some(source),
      _ => None,
    }
  }
}

struct Slot<B>
where
  B: ?Sized + Shader,
{
  generation: u64,
  entry: Option<Entry<B>>,
}

struct Entry<B>
where
  B: ?Sized + Shader,
{
  name: String,
  program: Program<B>,
}

/// Named store of shader programs.
pub struct Registry<B>
where
  B: ?Sized + Shader,
{
  slots: Vec<Slot<B>>,
  free_slots: Vec<usize>,
  names: HashMap<String, usize>,
}

impl<B> Default for Registry<B>
where
  B: ?Sized + Shader,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<B> Registry<B>
where
  B: ?Sized + Shader,
{
  /// Create an empty registry.
  pub fn new() -> Self {
    Registry {
      slots: Vec::new(),
      free_slots: Vec::new(),
      names: HashMap::new(),
    }
  }

  /// Read a vertex and a fragment source from disk and load them.
  ///
  /// The shader is named after the file stem of the vertex source.
  pub fn load_from_files<C, V, F>(
    &mut self,
    ctx: &mut C,
    vertex_path: V,
    fragment_path: F,
  ) -> Result<ShaderId, RegistryError>
  where
    C: GraphicsContext<Backend = B>,
    V: AsRef<Path>,
    F: AsRef<Path>,
  {
    let name = shader_name(vertex_path.as_ref())?;
    let (vertex, fragment) = read_sources(vertex_path.as_ref(), fragment_path.as_ref())?;

    self.load_from_strings(ctx, name, vertex, fragment)
  }

  /// Load a vertex / fragment pair found by [`pair_shader_paths`].
  pub fn load_pair<C>(&mut self, ctx: &mut C, pair: &ShaderSourcePair) -> Result<ShaderId, RegistryError>
  where
    C: GraphicsContext<Backend = B>,
  {
    let (vertex, fragment) = pair.paths()?;
    self.load_from_files(ctx, vertex, fragment)
  }

  /// Build a program out of sources and store it under `name`.
  pub fn load_from_strings<C, N, V, F>(
    &mut self,
    ctx: &mut C,
    name: N,
    vertex: V,
    fragment: F,
  ) -> Result<ShaderId, RegistryError>
  where
    C: GraphicsContext<Backend = B>,
    N: Into<String>,
    V: AsRef<str>,
    F: AsRef<str>,
  {
    let name = name.into();

    if self.names.contains_key(&name) {
      return Err(RegistryError::AlreadyLoaded(name));
    }

    let program = Program::from_strings(ctx, vertex, fragment).ignore_warnings();
    log::info!(
      "loaded shader {} ({} uniform(s))",
      name,
      program.uniforms().len()
    );

    Ok(self.insert(name, program))
  }

  /// Re-read the sources of a loaded shader and replace it.
  pub fn reload_from_files<C, V, F>(
    &mut self,
    ctx: &mut C,
    vertex_path: V,
    fragment_path: F,
  ) -> Result<ShaderId, RegistryError>
  where
    C: GraphicsContext<Backend = B>,
    V: AsRef<Path>,
    F: AsRef<Path>,
  {
    let name = shader_name(vertex_path.as_ref())?;
    let (vertex, fragment) = read_sources(vertex_path.as_ref(), fragment_path.as_ref())?;

    self.reload_from_strings(ctx, &name, vertex, fragment)
  }

  /// Replace the program loaded under `name` with a new one.
  ///
  /// Uniform values of the old program are copied to the new one whenever a uniform with the same
  /// name and type still exists. Every id issued for the old program gets invalidated.
  pub fn reload_from_strings<C, V, F>(
    &mut self,
    ctx: &mut C,
    name: &str,
    vertex: V,
    fragment: F,
  ) -> Result<ShaderId, RegistryError>
  where
    C: GraphicsContext<Backend = B>,
    V: AsRef<str>,
    F: AsRef<str>,
  {
    let slot_index = *self
      .names
      .get(name)
      .ok_or_else(|| RegistryError::NotLoaded(name.to_owned()))?;

    let mut program = Program::from_strings(ctx, vertex, fragment).ignore_warnings();

    let slot = &mut self.slots[slot_index];
    let entry = slot
      .entry
      .as_mut()
      .ok_or_else(|| RegistryError::NotLoaded(name.to_owned()))?;

    let carried = program.copy_values_from(&entry.program);
    log::info!(
      "reloaded shader {} ({} uniform value(s) carried over)",
      name,
      carried
    );

    // the old program is dropped here, releasing its GPU handle
    entry.program = program;
    slot.generation += 1;

    Ok(ShaderId {
      slot: slot_index,
      generation: slot.generation,
    })
  }

  fn insert(&mut self, name: String, program: Program<B>) -> ShaderId {
    let entry = Some(Entry {
      name: name.clone(),
      program,
    });

    let slot = match self.free_slots.pop() {
      Some(slot) => {
        self.slots[slot].entry = entry;
        slot
      }

      None => {
        self.slots.push(Slot {
          generation: 0,
          entry,
        });
        self.slots.len() - 1
      }
    };

    self.names.insert(name, slot);

    ShaderId {
      slot,
      generation: self.slots[slot].generation,
    }
  }

  /// Remove a program from the registry.
  ///
  /// Every id issued for it stops resolving. The program is handed back; dropping it releases its
  /// GPU resources.
  pub fn unload(&mut self, name: &str) -> Option<Program<B>> {
    let slot_index = self.names.remove(name)?;
    let slot = &mut self.slots[slot_index];
    let entry = slot.entry.take()?;

    slot.generation += 1;
    self.free_slots.push(slot_index);
    log::info!("unloaded shader {}", name);

    Some(entry.program)
  }

  /// Get the current id of a program.
  pub fn id_of(&self, name: &str) -> Option<ShaderId> {
    self.names.get(name).map(|&slot| ShaderId {
      slot,
      generation: self.slots[slot].generation,
    })
  }

  /// Get a program by name.
  pub fn get(&self, name: &str) -> Option<&Program<B>> {
    let slot = *self.names.get(name)?;
    self.slots[slot].entry.as_ref().map(|e| &e.program)
  }

  /// Get a program by name for edition.
  pub fn get_mut(&mut self, name: &str) -> Option<&mut Program<B>> {
    let slot = *self.names.get(name)?;
    self.slots[slot].entry.as_mut().map(|e| &mut e.program)
  }

  /// Get the program an id was issued for, if it’s still loaded.
  pub fn resolve(&self, id: ShaderId) -> Option<&Program<B>> {
    self.live_entry(id).map(|e| &e.program)
  }

  /// Get the program an id was issued for, if it’s still loaded, for edition.
  pub fn resolve_mut(&mut self, id: ShaderId) -> Option<&mut Program<B>> {
    match self.slots.get_mut(id.slot) {
      Some(slot) if slot.generation == id.generation => slot.entry.as_mut().map(|e| &mut e.program),
      _ => None,
    }
  }

  /// Get the name of the program an id was issued for, if it’s still loaded.
  pub fn name_of(&self, id: ShaderId) -> Option<&str> {
    self.live_entry(id).map(|e| e.name.as_str())
  }

  fn live_entry(&self, id: ShaderId) -> Option<&Entry<B>> {
    match self.slots.get(id.slot) {
      Some(slot) if slot.generation == id.generation => slot.entry.as_ref(),
      _ => None,
    }
  }

  /// Whether a program is loaded under `name`.
  pub fn contains(&self, name: &str) -> bool {
    self.names.contains_key(name)
  }

  /// Names of the loaded programs, in slot order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self
      .slots
      .iter()
      .filter_map(|slot| slot.entry.as_ref().map(|e| e.name.as_str()))
  }

  /// Number of loaded programs.
  pub fn len(&self) -> usize {
    self.names.len()
  }

  /// Whether no program is loaded.
  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

fn shader_name(path: &Path) -> Result<String, RegistryError> {
  path
    .file_stem()
    .and_then(|stem| stem.to_str())
    .filter(|stem| !stem.is_empty())
    .map(str::to_owned)
    .ok_or_else(|| RegistryError::InvalidName(path.to_owned()))
}

fn read_source(path: &Path) -> Result<String, RegistryError> {
  fs::read_to_string(path).map_err(|source| RegistryError::Io {
    path: path.to_owned(),
    source,
  })
}

fn read_sources(vertex: &Path, fragment: &Path) -> Result<(String, String), RegistryError> {
  Ok((read_source(vertex)?, read_source(fragment)?))
}

/// File extension of vertex shader sources.
pub const VERTEX_EXTENSION: &str = "vs";

/// File extension of fragment shader sources.
pub const FRAGMENT_EXTENSION: &str = "fs";

/// A vertex / fragment pair of source paths; either side may be missing.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ShaderSourcePair {
  /// Path of the vertex source.
  pub vertex: Option<PathBuf>,
  /// Path of the fragment source.
  pub fragment: Option<PathBuf>,
}

impl ShaderSourcePair {
  /// Both paths of a complete pair.
  pub fn paths(&self) -> Result<(&Path, &Path), RegistryError> {
    match (&self.vertex, &self.fragment) {
      (Some(vertex), Some(fragment)) => Ok((vertex, fragment)),
      (Some(found), None) | (None, Some(found)) => Err(RegistryError::MissingStage(found.clone())),
      (None, None) => Err(RegistryError::MissingStage(PathBuf::new())),
    }
  }
}

/// Pair a set of selected shader files.
///
/// A `.fs` file is a fragment source and is paired with the `.vs` file of the same stem, if it was
/// selected too; any other file is taken as a vertex source and paired with its `.fs` sibling.
/// Duplicate paths are ignored; pairs come out in the order their first file was given.
pub fn pair_shader_paths<P>(paths: &[P]) -> Vec<ShaderSourcePair>
where
  P: AsRef<Path>,
{
  let mut remaining: Vec<&Path> = Vec::new();
  for path in paths {
    let path: &Path = path.as_ref();
    if !remaining.contains(&path) {
      remaining.push(path);
    }
  }

  let mut pairs = Vec::new();

  while !remaining.is_empty() {
    let path = remaining.remove(0);
    let is_fragment = path.extension().map_or(false, |ext| ext == FRAGMENT_EXTENSION);
    let sibling_ext = if is_fragment {
      VERTEX_EXTENSION
    } else {
      FRAGMENT_EXTENSION
    };

    let sibling_path = path.with_extension(sibling_ext);
    let sibling = remaining
      .iter()
      .position(|p| *p == sibling_path)
      .map(|i| remaining.remove(i).to_owned());

    let pair = if is_fragment {
      ShaderSourcePair {
        vertex: sibling,
        fragment: Some(path.to_owned()),
      }
    } else {
      ShaderSourcePair {
        vertex: Some(path.to_owned()),
        fragment: sibling,
      }
    };

    pairs.push(pair);
  }

  pairs
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backend::mock::{MockBackend, MockContext};
  use crate::shader::uniform::UniformValue;

  const VS: &str = "uniform float time;\nvoid main() { gl_Position = vec4(time); }\n";
  const FS: &str = "uniform vec4 color;\nout vec4 frag;\nvoid main() { frag = color; }\n";

  fn registry_with(ctx: &mut MockContext, names: &[&str]) -> Registry<MockBackend> {
    let mut registry = Registry::new();

    for name in names {
      registry.load_from_strings(ctx, *name, VS, FS).unwrap();
    }

    registry
  }

  #[test]
  fn load_and_get() {
    let mut ctx = MockContext::new();
    let registry = registry_with(&mut ctx, &["default", "plasma"]);

    assert_eq!(registry.len(), 2);
    assert!(registry.contains("plasma"));
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["default", "plasma"]);
    assert_eq!(registry.get("plasma").unwrap().uniforms().len(), 2);
    assert!(registry.get("nope").is_none());
  }

  #[test]
  fn duplicate_load_rejected() {
    let mut ctx = MockContext::new();
    let mut registry = registry_with(&mut ctx, &["plasma"]);
    let id = registry.id_of("plasma").unwrap();

    let err = registry
      .load_from_strings(&mut ctx, "plasma", VS, FS)
      .unwrap_err();

    assert!(matches!(err, RegistryError::AlreadyLoaded(ref name) if name == "plasma"));
    assert!(registry.resolve(id).is_some());
    assert_eq!(ctx.backend.live_programs(), 1);
  }

  #[test]
  fn unload_invalidates_ids() {
    let mut ctx = MockContext::new();
    let mut registry = registry_with(&mut ctx, &["default", "plasma"]);
    let current = registry.id_of("plasma").unwrap();

    let program = registry.unload("plasma");
    assert!(program.is_some());
    drop(program);

    assert_eq!(ctx.backend.live_programs(), 1);
    assert!(registry.resolve(current).is_none());
    assert!(registry.resolve_mut(current).is_none());
    assert!(registry.name_of(current).is_none());
    assert!(registry.get("plasma").is_none());
    assert!(registry.unload("plasma").is_none());
  }

  #[test]
  fn reused_slot_does_not_resurrect_ids() {
    let mut ctx = MockContext::new();
    let mut registry = registry_with(&mut ctx, &["plasma"]);
    let stale = registry.id_of("plasma").unwrap();

    registry.unload("plasma");
    let fresh = registry
      .load_from_strings(&mut ctx, "waves", VS, FS)
      .unwrap();

    assert_ne!(stale, fresh);
    assert!(registry.resolve(stale).is_none());
    assert_eq!(registry.name_of(fresh), Some("waves"));
  }

  #[test]
  fn reload_carries_values_and_invalidates_ids() {
    let mut ctx = MockContext::new();
    let mut registry = registry_with(&mut ctx, &["plasma"]);
    let old_id = registry.id_of("plasma").unwrap();

    registry
      .get_mut("plasma")
      .unwrap()
      .set_uniform("color", UniformValue::Vec4([1., 0., 1., 1.]))
      .unwrap();

    let fs = "uniform vec4 color;\nuniform float gain;\nout vec4 frag;\nvoid main() { frag = color * gain; }\n";
    let new_id = registry
      .reload_from_strings(&mut ctx, "plasma", VS, fs)
      .unwrap();

    assert!(registry.resolve(old_id).is_none());

    let program = registry.resolve(new_id).unwrap();
    assert_eq!(
      program.uniform("color").unwrap().value(),
      &UniformValue::Vec4([1., 0., 1., 1.])
    );
    assert!(program.uniform("gain").is_some());
    assert_eq!(ctx.backend.live_programs(), 1);
  }

  #[test]
  fn reload_unknown_shader() {
    let mut ctx = MockContext::new();
    let mut registry: Registry<MockBackend> = Registry::new();

    let err = registry
      .reload_from_strings(&mut ctx, "plasma", VS, FS)
      .unwrap_err();

    assert!(matches!(err, RegistryError::NotLoaded(_)));
    assert_eq!(ctx.backend.live_programs(), 0);
  }

  #[test]
  fn load_from_files_names_after_stem() {
    let dir = std::env::temp_dir().join(format!("shaderscope-registry-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let vs_path = dir.join("plasma.vs");
    let fs_path = dir.join("plasma.fs");
    fs::write(&vs_path, VS).unwrap();
    fs::write(&fs_path, FS).unwrap();

    let mut ctx = MockContext::new();
    let mut registry = Registry::new();
    let id = registry.load_from_files(&mut ctx, &vs_path, &fs_path).unwrap();

    assert_eq!(registry.name_of(id), Some("plasma"));

    let missing = registry.load_from_files(&mut ctx, dir.join("nope.vs"), &fs_path);
    assert!(matches!(missing, Err(RegistryError::Io { .. })));

    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn pairing() {
    let paths = [
      "shaders/plasma.fs",
      "shaders/waves.vs",
      "shaders/plasma.vs",
      "shaders/lonely.fs",
      "shaders/waves.fs",
    ];

    let pairs = pair_shader_paths(&paths);

    assert_eq!(
      pairs,
      vec![
        ShaderSourcePair {
          vertex: Some("shaders/plasma.vs".into()),
          fragment: Some("shaders/plasma.fs".into()),
        },
        ShaderSourcePair {
          vertex: Some("shaders/waves.vs".into()),
          fragment: Some("shaders/waves.fs".into()),
        },
        ShaderSourcePair {
          vertex: None,
          fragment: Some("shaders/lonely.fs".into()),
        },
      ]
    );

    assert!(matches!(
      pairs[2].paths(),
      Err(RegistryError::MissingStage(ref p)) if p == Path::new("shaders/lonely.fs")
    ));
  }

  #[test]
  fn pairing_deduplicates() {
    let pairs = pair_shader_paths(&["a.vs", "a.vs", "a.fs"]);

    assert_eq!(
      pairs,
      vec![ShaderSourcePair {
        vertex: Some("a.vs".into()),
        fragment: Some("a.fs".into()),
      }]
    );
  }
}
