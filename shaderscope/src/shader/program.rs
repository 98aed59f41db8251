//! Shader programs.
//!
//! A [`Program`] is built out of a vertex and a fragment source. Building never fails hard: compile
//! and link errors are logged and leave the program [invalid](ProgramStatus::Invalid), so that an
//! editor can keep running with a broken shader loaded.
//!
//! Once built, a program exposes the uniforms declared in its sources, in declaration order
//! (vertex source first). Their values are initialized from the GPU and can be edited at will; every
//! call to [`Program::bind`] uploads all of them.

use std::collections::HashMap;

use crate::backend::shader::Shader;
use crate::context::GraphicsContext;
use crate::shader::parser::parse_uniform_line;
use crate::shader::uniform::{ShaderUniform, UniformError, UniformType, UniformValue};
use crate::shader::{ProgramError, ProgramWarning, Stage, StageType};

/// Link status of a program.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramStatus {
  /// The program is linked and can be used for drawing.
  Linked,
  /// The program failed to build.
  Invalid(ProgramError),
}

/// A built program with potential warnings.
///
/// The sole purpose of this type is to be destructured when a program is built.
pub struct BuiltProgram<B>
where
  B: ?Sized + Shader,
{
  /// Built program.
  pub program: Program<B>,
  /// Potential warnings.
  pub warnings: Vec<ProgramWarning>,
}

impl<B> BuiltProgram<B>
where
  B: ?Sized + Shader,
{
  /// Get the program and ignore the warnings.
  pub fn ignore_warnings(self) -> Program<B> {
    self.program
  }
}

/// A shader program and its uniforms.
///
/// Programs own their GPU handle, which is released when they are dropped. They cannot be cloned.
pub struct Program<B>
where
  B: ?Sized + Shader,
{
  repr: Option<B::ProgramRepr>,
  status: ProgramStatus,
  uniforms: Vec<ShaderUniform>,
  index: HashMap<String, usize>,
}

impl<B> Drop for Program<B>
where
  B: ?Sized + Shader,
{
  fn drop(&mut self) {
    if let Some(ref mut repr) = self.repr {
      unsafe { B::destroy_program(repr) }
    }
  }
}

impl<B> Program<B>
where
  B: ?Sized + Shader,
{
  /// Build a program out of a vertex and a fragment source.
  pub fn from_strings<C, V, F>(ctx: &mut C, vertex: V, fragment: F) -> BuiltProgram<B>
  where
    C: GraphicsContext<Backend = B>,
    V: AsRef<str>,
    F: AsRef<str>,
  {
    let vertex = vertex.as_ref();
    let fragment = fragment.as_ref();
    let mut warnings = Vec::new();

    let (repr, status) = match link(ctx, vertex, fragment, &mut warnings) {
      Ok(repr) => (Some(repr), ProgramStatus::Linked),
      Err(e) => (None, ProgramStatus::Invalid(e)),
    };

    let mut program = Program {
      repr,
      status,
      uniforms: Vec::new(),
      index: HashMap::new(),
    };

    program.reflect(ctx.backend(), &[vertex, fragment], &mut warnings);

    BuiltProgram { program, warnings }
  }

  // Walk the sources line by line and create a uniform for every declaration, in order.
  fn reflect(&mut self, backend: &mut B, sources: &[&str], warnings: &mut Vec<ProgramWarning>) {
    for src in sources {
      for line in src.lines() {
        let decl = match parse_uniform_line(line) {
          Ok(Some(decl)) => decl,
          Ok(None) => continue,
          Err(e) => {
            log::warn!("{}", e);
            warnings.push(e.into());
            continue;
          }
        };

        // the same uniform can be declared in both stages; the first declaration wins
        if let Some(&i) = self.index.get(&decl.name) {
          if self.uniforms[i].ty() != decl.ty {
            log::warn!(
              "uniform {} redeclared as {} (first declared as {}); ignoring",
              decl.name,
              decl.ty,
              self.uniforms[i].ty()
            );
            warnings.push(ProgramWarning::DuplicateUniform(decl.name));
          }

          continue;
        }

        let uniform = match self.repr {
          Some(ref repr) => unsafe { reflect_uniform(backend, repr, decl.name, decl.ty, warnings) },
          None => ShaderUniform::new(decl.name, None, UniformValue::default_for(decl.ty)),
        };

        self.index.insert(uniform.name().to_owned(), self.uniforms.len());
        self.uniforms.push(uniform);
      }
    }
  }

  /// Link status of the program.
  pub fn status(&self) -> &ProgramStatus {
    &self.status
  }

  /// Whether the program is linked and usable.
  pub fn is_linked(&self) -> bool {
    self.status == ProgramStatus::Linked
  }

  /// Uniforms of the program, in declaration order.
  pub fn uniforms(&self) -> &[ShaderUniform] {
    &self.uniforms
  }

  /// Mutable access to the uniforms of the program, in declaration order.
  pub fn uniforms_mut(&mut self) -> &mut [ShaderUniform] {
    &mut self.uniforms
  }

  /// Look a uniform up by name.
  pub fn uniform(&self, name: &str) -> Option<&ShaderUniform> {
    self.index.get(name).map(|&i| &self.uniforms[i])
  }

  /// Look a uniform up by name for edition.
  pub fn uniform_mut(&mut self, name: &str) -> Option<&mut ShaderUniform> {
    match self.index.get(name) {
      Some(&i) => Some(&mut self.uniforms[i]),
      None => None,
    }
  }

  /// Set the value of a uniform.
  ///
  /// The value is uploaded to the GPU the next time the program is bound.
  pub fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
    self
      .uniform_mut(name)
      .ok_or_else(|| UniformError::UnknownUniform(name.to_owned()))?
      .set(value)
  }

  /// Copy the values of `other`’s uniforms that also exist here with the same type.
  ///
  /// Returns the number of copied values.
  pub fn copy_values_from(&mut self, other: &Program<B>) -> usize {
    let mut copied = 0;

    for uniform in &other.uniforms {
      if let Some(ours) = self.uniform_mut(uniform.name()) {
        if ours.set(*uniform.value()).is_ok() {
          copied += 1;
        }
      }
    }

    copied
  }

  /// Make this program the active one and upload all of its uniforms.
  ///
  /// Uniforms are pushed on every call, whether they changed or not. Binding an invalid program
  /// deactivates any program instead.
  pub fn bind<C>(&self, ctx: &mut C)
  where
    C: GraphicsContext<Backend = B>,
  {
    let backend = ctx.backend();

    match self.repr {
      Some(ref repr) => unsafe {
        backend.use_program(Some(repr));
        self.update_uniforms(backend, repr);
      },

      None => {
        log::warn!("binding an invalid shader program; nothing will be drawn");
        unsafe { backend.use_program(None) };
      }
    }
  }

  /// Deactivate the program.
  ///
  /// Uniform values are left untouched.
  pub fn unbind<C>(&self, ctx: &mut C)
  where
    C: GraphicsContext<Backend = B>,
  {
    unsafe { ctx.backend().use_program(None) }
  }

  unsafe fn update_uniforms(&self, backend: &mut B, repr: &B::ProgramRepr) {
    for uniform in &self.uniforms {
      if let Some(location) = backend.uniform_location(repr, uniform.name()) {
        backend.update_uniform(repr, location, uniform.value());
      }
    }
  }

  /// Read the value the GPU currently holds for a uniform.
  ///
  /// Returns `None` if the program is invalid or if the uniform is unknown or inactive.
  pub fn read_back<C>(&self, ctx: &mut C, name: &str) -> Option<UniformValue>
  where
    C: GraphicsContext<Backend = B>,
  {
    let uniform = self.uniform(name)?;
    let repr = self.repr.as_ref()?;
    let backend = ctx.backend();

    unsafe {
      let location = backend.uniform_location(repr, name)?;
      Some(backend.read_uniform(repr, location, uniform.ty()))
    }
  }
}

// Compile both stages and link them; stages are released when leaving.
//
// Every error is logged and reported as a warning. The first one is returned.
fn link<B, C>(
  ctx: &mut C,
  vertex: &str,
  fragment: &str,
  warnings: &mut Vec<ProgramWarning>,
) -> Result<B::ProgramRepr, ProgramError>
where
  B: ?Sized + Shader,
  C: GraphicsContext<Backend = B>,
{
  let vs = Stage::new(ctx, StageType::VertexShader, vertex)
    .map_err(|e| report(e.into(), warnings));
  let fs = Stage::new(ctx, StageType::FragmentShader, fragment)
    .map_err(|e| report(e.into(), warnings));

  let (vs, fs) = match (vs, fs) {
    (Ok(vs), Ok(fs)) => (vs, fs),
    (Err(e), _) | (_, Err(e)) => return Err(e),
  };

  unsafe { ctx.backend().new_program(&vs.repr, &fs.repr) }.map_err(|e| report(e, warnings))
}

fn report(e: ProgramError, warnings: &mut Vec<ProgramWarning>) -> ProgramError {
  log::error!("{}", e);
  warnings.push(ProgramWarning::Program(e.clone()));
  e
}

unsafe fn reflect_uniform<B>(
  backend: &mut B,
  repr: &B::ProgramRepr,
  name: String,
  ty: UniformType,
  warnings: &mut Vec<ProgramWarning>,
) -> ShaderUniform
where
  B: ?Sized + Shader,
{
  let location = backend.uniform_location(repr, &name);

  let value = match location {
    // the GPU only knows the unit of a sampler, not which texture to feed it
    Some(_) if ty == UniformType::Sampler2D => UniformValue::default_for(ty),
    Some(location) => backend.read_uniform(repr, location, ty),
    None => {
      log::debug!("inactive {} uniform", name);
      warnings.push(ProgramWarning::InactiveUniform(name.clone()));
      UniformValue::default_for(ty)
    }
  };

  ShaderUniform::new(name, location, value)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backend::mock::{MockContext, Upload};
  use crate::shader::StageError;
  use crate::texture::Texture2D;

  const VS: &str = "#version 330 core
uniform int a;
uniform float b;
in vec2 position;

void main() {
  gl_Position = vec4(position * b, float(a), 1.);
}
";

  const FS: &str = "#version 330 core
uniform vec3 tint;
uniform sampler2D diffuse;
out vec4 frag;

void main() {
  frag = vec4(tint, 1.) * texture(diffuse, vec2(0.));
}
";

  fn build(ctx: &mut MockContext, vs: &str, fs: &str) -> Program<crate::backend::mock::MockBackend> {
    Program::from_strings(ctx, vs, fs).ignore_warnings()
  }

  #[test]
  fn declaration_order_across_stages() {
    let mut ctx = MockContext::new();
    let program = build(&mut ctx, VS, FS);

    let uniforms: Vec<_> = program
      .uniforms()
      .iter()
      .map(|u| (u.name(), u.ty()))
      .collect();

    assert!(program.is_linked());
    assert_eq!(
      uniforms,
      vec![
        ("a", UniformType::Int),
        ("b", UniformType::Float),
        ("tint", UniformType::Vec3),
        ("diffuse", UniformType::Sampler2D),
      ]
    );
  }

  #[test]
  fn values_are_read_back() {
    let mut ctx = MockContext::new();
    ctx.backend.preset("b", UniformValue::Float(4.));
    ctx.backend.preset("tint", UniformValue::Vec3([1., 0.5, 0.]));

    let program = build(&mut ctx, VS, FS);

    assert_eq!(program.uniform("a").unwrap().value(), &UniformValue::Int(0));
    assert_eq!(program.uniform("b").unwrap().value(), &UniformValue::Float(4.));
    assert_eq!(
      program.uniform("tint").unwrap().value(),
      &UniformValue::Vec3([1., 0.5, 0.])
    );
  }

  #[test]
  fn sampler_gets_placeholder() {
    let mut ctx = MockContext::new();
    ctx
      .backend
      .preset("diffuse", UniformValue::Sampler2D(Texture2D::new(0, 3)));

    let program = build(&mut ctx, VS, FS);
    let diffuse = program.uniform("diffuse").unwrap();

    assert_eq!(diffuse.ty(), UniformType::Sampler2D);
    assert_eq!(
      diffuse.value(),
      &UniformValue::Sampler2D(Texture2D::placeholder())
    );
  }

  #[test]
  fn inactive_uniform_is_kept() {
    let mut ctx = MockContext::new();
    let fs = "uniform float unused;\nout vec4 frag;\nvoid main() { frag = vec4(1.); }\n";
    let built = Program::from_strings(&mut ctx, VS, fs);

    let unused = built.program.uniform("unused").unwrap();
    assert_eq!(unused.location(), None);
    assert_eq!(unused.value(), &UniformValue::Float(0.));
    assert!(built
      .warnings
      .contains(&ProgramWarning::InactiveUniform("unused".to_owned())));
  }

  #[test]
  fn unknown_type_is_rejected() {
    let mut ctx = MockContext::new();
    let fs = "uniform samplerCube sky;\nuniform vec4 color;\nvoid main() { sky; color; }\n";
    let built = Program::from_strings(&mut ctx, VS, fs);

    assert!(built.program.uniform("sky").is_none());
    assert!(built.program.uniform("color").is_some());
    assert!(built
      .warnings
      .iter()
      .any(|w| matches!(w, ProgramWarning::Parse(_))));
  }

  #[test]
  fn duplicate_names_are_merged() {
    let mut ctx = MockContext::new();
    let fs = "uniform float b;\nuniform int b;\nvoid main() { b; }\n";
    let built = Program::from_strings(&mut ctx, VS, fs);
    let program = &built.program;

    let bs: Vec<_> = program.uniforms().iter().filter(|u| u.name() == "b").collect();
    assert_eq!(bs.len(), 1);
    assert_eq!(bs[0].ty(), UniformType::Float);
    assert_eq!(
      built.warnings,
      vec![ProgramWarning::DuplicateUniform("b".to_owned())]
    );
  }

  #[test]
  fn set_then_bind_uploads() {
    let mut ctx = MockContext::new();
    let mut program = build(&mut ctx, VS, FS);

    let values = [
      ("a", UniformValue::Int(-7)),
      ("b", UniformValue::Float(0.25)),
      ("tint", UniformValue::Vec3([0.1, 0.2, 0.3])),
      ("diffuse", UniformValue::Sampler2D(Texture2D::new(9, 2))),
    ];

    for (name, value) in &values {
      program.set_uniform(name, *value).unwrap();
    }

    program.bind(&mut ctx);

    for (name, value) in &values[..3] {
      assert_eq!(program.read_back(&mut ctx, name).as_ref(), Some(value));
    }

    // only the image unit of a sampler lives on the GPU side
    assert_eq!(
      program.read_back(&mut ctx, "diffuse"),
      Some(UniformValue::Sampler2D(Texture2D::new(0, 2)))
    );

    assert_eq!(ctx.backend.active_program(), Some(program.repr.as_ref().unwrap().id()));
  }

  #[test]
  fn set_uniform_errors() {
    let mut ctx = MockContext::new();
    let mut program = build(&mut ctx, VS, FS);

    assert_eq!(
      program.set_uniform("nope", UniformValue::Int(1)),
      Err(UniformError::UnknownUniform("nope".to_owned()))
    );
    assert_eq!(
      program.set_uniform("a", UniformValue::Float(1.)),
      Err(UniformError::TypeMismatch {
        name: "a".to_owned(),
        expected: UniformType::Int,
        found: UniformType::Float,
      })
    );
  }

  #[test]
  fn bind_pushes_every_time() {
    let mut ctx = MockContext::new();
    let mut program = build(&mut ctx, VS, FS);
    program.set_uniform("b", UniformValue::Float(2.)).unwrap();

    program.bind(&mut ctx);
    let first: Vec<Upload> = ctx.backend.take_uploads();
    program.bind(&mut ctx);
    let second: Vec<Upload> = ctx.backend.take_uploads();

    assert_eq!(first.len(), program.uniforms().len());
    assert_eq!(first, second);
  }

  #[test]
  fn unbind_keeps_values() {
    let mut ctx = MockContext::new();
    let mut program = build(&mut ctx, VS, FS);
    program.set_uniform("a", UniformValue::Int(3)).unwrap();

    program.bind(&mut ctx);
    program.unbind(&mut ctx);

    assert_eq!(ctx.backend.active_program(), None);
    assert_eq!(program.uniform("a").unwrap().value(), &UniformValue::Int(3));
  }

  #[test]
  fn compile_error_leaves_program_invalid() {
    let mut ctx = MockContext::new();
    ctx.backend.fail_compile(StageType::FragmentShader);

    let built = Program::from_strings(&mut ctx, VS, FS);
    let program = built.program;

    assert!(!program.is_linked());
    assert!(matches!(
      program.status(),
      ProgramStatus::Invalid(ProgramError::Stage(_))
    ));

    // uniforms are still listed so that an editor can show them
    assert_eq!(program.uniforms().len(), 4);
    assert!(program.uniforms().iter().all(|u| !u.is_active()));

    program.bind(&mut ctx);
    assert_eq!(ctx.backend.active_program(), None);
    assert!(ctx.backend.take_uploads().is_empty());
  }

  #[test]
  fn every_stage_error_is_reported() {
    let mut ctx = MockContext::new();
    ctx.backend.fail_compile(StageType::VertexShader);
    ctx.backend.fail_compile(StageType::FragmentShader);

    let built = Program::from_strings(&mut ctx, VS, FS);

    assert_eq!(
      ctx.backend.compiled_stages(),
      [StageType::VertexShader, StageType::FragmentShader]
    );

    let failed_stages: Vec<_> = built
      .warnings
      .iter()
      .filter_map(|w| match w {
        ProgramWarning::Program(ProgramError::Stage(StageError::CompilationFailed(ty, _))) => {
          Some(*ty)
        }
        _ => None,
      })
      .collect();
    assert_eq!(
      failed_stages,
      [StageType::VertexShader, StageType::FragmentShader]
    );

    // the first error is the one the program is invalid with
    assert!(matches!(
      built.program.status(),
      ProgramStatus::Invalid(ProgramError::Stage(StageError::CompilationFailed(
        StageType::VertexShader,
        _
      )))
    ));
  }

  #[test]
  fn link_error_leaves_program_invalid() {
    let mut ctx = MockContext::new();
    ctx.backend.fail_link();

    let program = build(&mut ctx, VS, FS);

    assert!(matches!(
      program.status(),
      ProgramStatus::Invalid(ProgramError::LinkFailed(_))
    ));
    assert_eq!(program.read_back(&mut ctx, "a"), None);
  }

  #[test]
  fn drop_releases_program() {
    let mut ctx = MockContext::new();
    let program = build(&mut ctx, VS, FS);

    assert_eq!(ctx.backend.live_programs(), 1);
    drop(program);
    assert_eq!(ctx.backend.live_programs(), 0);
  }

  #[test]
  fn copy_values_between_programs() {
    let mut ctx = MockContext::new();
    let mut old = build(&mut ctx, VS, FS);
    old.set_uniform("a", UniformValue::Int(5)).unwrap();
    old.set_uniform("tint", UniformValue::Vec3([1., 1., 0.])).unwrap();

    // tint changed type, a is gone
    let fs = "uniform vec4 tint;\nuniform float b;\nvoid main() { tint; b; }\n";
    let mut new = build(&mut ctx, "uniform float b;\nvoid main() { b; }\n", fs);
    new.copy_values_from(&old);

    assert_eq!(new.uniform("tint").unwrap().value(), &UniformValue::Vec4([0.; 4]));
    assert!(new.uniform("a").is_none());
    assert_eq!(new.copy_values_from(&old), 1); // b
  }
}
