//! In-memory backend used by unit tests.
//!
//! It mimics what a driver does closely enough to test the core: a uniform is active only if its
//! name is used somewhere besides its declaration, uniform values are stored per program and
//! location, and every upload is recorded.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::backend::shader::Shader;
use crate::context::GraphicsContext;
use crate::shader::parser::parse_uniforms;
use crate::shader::uniform::{UniformType, UniformValue};
use crate::shader::{ProgramError, StageError, StageType};
use crate::texture::Texture2D;

#[derive(Debug)]
pub(crate) struct MockStage {
  src: String,
}

#[derive(Debug)]
pub(crate) struct MockProgram {
  id: u32,
  locations: HashMap<String, i32>,
  live: Rc<Cell<usize>>,
}

impl MockProgram {
  pub(crate) fn id(&self) -> u32 {
    self.id
  }
}

/// A recorded uniform upload.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Upload {
  pub(crate) program: u32,
  pub(crate) location: i32,
  pub(crate) value: UniformValue,
}

#[derive(Debug, Default)]
pub(crate) struct MockBackend {
  next_id: u32,
  live: Rc<Cell<usize>>,
  active: Option<u32>,
  failing_stages: Vec<StageType>,
  compiled: Vec<StageType>,
  failing_link: bool,
  presets: HashMap<String, UniformValue>,
  values: HashMap<(u32, i32), UniformValue>,
  uploads: Vec<Upload>,
}

impl MockBackend {
  /// Value every linked program reports for `name` until it gets uploaded.
  pub(crate) fn preset(&mut self, name: &str, value: UniformValue) {
    self.presets.insert(name.to_owned(), value);
  }

  pub(crate) fn fail_compile(&mut self, ty: StageType) {
    self.failing_stages.push(ty);
  }

  pub(crate) fn fail_link(&mut self) {
    self.failing_link = true;
  }

  pub(crate) fn active_program(&self) -> Option<u32> {
    self.active
  }

  /// Stages compilation was attempted for, successful or not.
  pub(crate) fn compiled_stages(&self) -> &[StageType] {
    &self.compiled
  }

  pub(crate) fn live_programs(&self) -> usize {
    self.live.get()
  }

  pub(crate) fn take_uploads(&mut self) -> Vec<Upload> {
    std::mem::take(&mut self.uploads)
  }
}

unsafe impl Shader for MockBackend {
  type StageRepr = MockStage;

  type ProgramRepr = MockProgram;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    self.compiled.push(ty);

    if self.failing_stages.contains(&ty) {
      return Err(StageError::compilation_failed(ty, "0:1: syntax error"));
    }

    Ok(MockStage {
      src: src.to_owned(),
    })
  }

  unsafe fn destroy_stage(_: &mut Self::StageRepr) {}

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    if self.failing_link {
      return Err(ProgramError::link_failed("error: undefined reference"));
    }

    self.next_id += 1;
    let id = self.next_id;

    // count identifier occurrences to find out which uniforms are actually used
    let mut occurrences = HashMap::new();
    for src in [&vertex.src, &fragment.src] {
      for word in src.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
        *occurrences.entry(word).or_insert(0) += 1;
      }
    }

    let mut locations = HashMap::new();
    for src in [&vertex.src, &fragment.src] {
      for decl in parse_uniforms(src) {
        let used = occurrences.get(decl.name.as_str()).copied().unwrap_or(0) >= 2;
        if used && !locations.contains_key(&decl.name) {
          let location = locations.len() as i32;

          if let Some(value) = self.presets.get(&decl.name) {
            self.values.insert((id, location), *value);
          }

          locations.insert(decl.name, location);
        }
      }
    }

    self.live.set(self.live.get() + 1);

    Ok(MockProgram {
      id,
      locations,
      live: self.live.clone(),
    })
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    program.live.set(program.live.get() - 1);
  }

  unsafe fn uniform_location(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<i32> {
    program.locations.get(name).copied()
  }

  unsafe fn read_uniform(
    &mut self,
    program: &Self::ProgramRepr,
    location: i32,
    ty: UniformType,
  ) -> UniformValue {
    match self.values.get(&(program.id, location)) {
      Some(UniformValue::Sampler2D(tex)) => UniformValue::Sampler2D(Texture2D::new(0, tex.unit())),
      Some(value) if value.ty() == ty => *value,
      _ => UniformValue::default_for(ty),
    }
  }

  unsafe fn use_program(&mut self, program: Option<&Self::ProgramRepr>) {
    self.active = program.map(|p| p.id);
  }

  unsafe fn update_uniform(
    &mut self,
    program: &Self::ProgramRepr,
    location: i32,
    value: &UniformValue,
  ) {
    assert_eq!(self.active, Some(program.id), "upload to an inactive program");

    self.values.insert((program.id, location), *value);
    self.uploads.push(Upload {
      program: program.id,
      location,
      value: *value,
    });
  }
}

#[derive(Debug, Default)]
pub(crate) struct MockContext {
  pub(crate) backend: MockBackend,
}

impl MockContext {
  pub(crate) fn new() -> Self {
    Self::default()
  }
}

unsafe impl GraphicsContext for MockContext {
  type Backend = MockBackend;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.backend
  }
}
