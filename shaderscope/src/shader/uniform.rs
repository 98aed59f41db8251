//! Uniform model.
//!
//! A uniform is a named, typed input of a shader program. Each uniform discovered in a program’s
//! sources is represented by a [`ShaderUniform`], which embeds its typed host-side storage, a
//! [`UniformValue`].

use std::error;
use std::fmt;
use std::str::FromStr;

use crate::texture::Texture2D;

/// Type of a uniform.
///
/// This set is closed: only these types are recognized in shader sources.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UniformType {
  // scalars
  /// 32-bit signed integer.
  Int,
  /// 32-bit unsigned integer.
  UInt,
  /// Boolean.
  Bool,
  /// 32-bit floating-point number.
  Float,

  // vectors
  /// 2D floating-point vector.
  Vec2,
  /// 3D floating-point vector.
  Vec3,
  /// 4D floating-point vector.
  Vec4,

  // matrices
  /// 2×2 floating-point matrix.
  M22,
  /// 3×3 floating-point matrix.
  M33,
  /// 4×4 floating-point matrix.
  M44,

  // textures
  /// Floating-point 2D texture sampler.
  Sampler2D,
}

// GLSL keyword of every uniform type; the only place where keywords are spelled out.
const KEYWORDS: [(&str, UniformType); 11] = [
  ("int", UniformType::Int),
  ("uint", UniformType::UInt),
  ("bool", UniformType::Bool),
  ("float", UniformType::Float),
  ("vec2", UniformType::Vec2),
  ("vec3", UniformType::Vec3),
  ("vec4", UniformType::Vec4),
  ("mat2", UniformType::M22),
  ("mat3", UniformType::M33),
  ("mat4", UniformType::M44),
  ("sampler2D", UniformType::Sampler2D),
];

impl UniformType {
  /// Map a GLSL type keyword to its uniform type.
  ///
  /// The match is exact and case-sensitive.
  pub fn from_keyword(keyword: &str) -> Option<Self> {
    KEYWORDS
      .iter()
      .find(|(kw, _)| *kw == keyword)
      .map(|&(_, ty)| ty)
  }

  /// GLSL keyword of this type.
  pub fn keyword(self) -> &'static str {
    KEYWORDS
      .iter()
      .find(|(_, ty)| *ty == self)
      .map(|&(kw, _)| kw)
      .unwrap_or_default()
  }

  /// Number of scalar components the storage of this type holds.
  ///
  /// Samplers don’t hold scalar components and return `0`.
  pub fn component_count(self) -> usize {
    match self {
      UniformType::Int | UniformType::UInt | UniformType::Bool | UniformType::Float => 1,
      UniformType::Vec2 => 2,
      UniformType::Vec3 => 3,
      UniformType::Vec4 | UniformType::M22 => 4,
      UniformType::M33 => 9,
      UniformType::M44 => 16,
      UniformType::Sampler2D => 0,
    }
  }
}

impl fmt::Display for UniformType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.write_str(self.keyword())
  }
}

/// Host-side storage of a uniform.
///
/// Matrices are stored flattened, column-major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
  /// 32-bit signed integer.
  Int(i32),
  /// 32-bit unsigned integer.
  UInt(u32),
  /// Boolean.
  Bool(bool),
  /// 32-bit floating-point number.
  Float(f32),
  /// 2D floating-point vector.
  Vec2([f32; 2]),
  /// 3D floating-point vector.
  Vec3([f32; 3]),
  /// 4D floating-point vector.
  Vec4([f32; 4]),
  /// 2×2 floating-point matrix.
  M22([f32; 4]),
  /// 3×3 floating-point matrix.
  M33([f32; 9]),
  /// 4×4 floating-point matrix.
  M44([f32; 16]),
  /// 2D texture sampler.
  Sampler2D(Texture2D),
}

impl UniformValue {
  /// Zeroed storage for a given type.
  ///
  /// Samplers get the placeholder texture.
  pub fn default_for(ty: UniformType) -> Self {
    match ty {
      UniformType::Int => UniformValue::Int(0),
      UniformType::UInt => UniformValue::UInt(0),
      UniformType::Bool => UniformValue::Bool(false),
      UniformType::Float => UniformValue::Float(0.),
      UniformType::Vec2 => UniformValue::Vec2([0.; 2]),
      UniformType::Vec3 => UniformValue::Vec3([0.; 3]),
      UniformType::Vec4 => UniformValue::Vec4([0.; 4]),
      UniformType::M22 => UniformValue::M22([0.; 4]),
      UniformType::M33 => UniformValue::M33([0.; 9]),
      UniformType::M44 => UniformValue::M44([0.; 16]),
      UniformType::Sampler2D => UniformValue::Sampler2D(Texture2D::placeholder()),
    }
  }

  /// Build a floating-point value of type `ty` out of its components.
  ///
  /// This is what backends use to turn a read-back float array into a value. Missing components
  /// are zeroed and extra ones are ignored. Integral, boolean and sampler types get their default
  /// value.
  pub fn from_floats(ty: UniformType, components: &[f32]) -> Self {
    let mut value = UniformValue::default_for(ty);

    {
      let dst: &mut [f32] = match value {
        UniformValue::Float(ref mut x) => std::slice::from_mut(x),
        UniformValue::Vec2(ref mut v) => v,
        UniformValue::Vec3(ref mut v) => v,
        UniformValue::Vec4(ref mut v) => v,
        UniformValue::M22(ref mut m) => m,
        UniformValue::M33(ref mut m) => m,
        UniformValue::M44(ref mut m) => m,
        _ => &mut [],
      };

      for (d, s) in dst.iter_mut().zip(components) {
        *d = *s;
      }
    }

    value
  }

  /// Floating-point components of the value, in upload order (column-major for matrices).
  ///
  /// Empty for integral, boolean and sampler values.
  pub fn as_floats(&self) -> &[f32] {
    match self {
      UniformValue::Float(x) => std::slice::from_ref(x),
      UniformValue::Vec2(v) => v,
      UniformValue::Vec3(v) => v,
      UniformValue::Vec4(v) => v,
      UniformValue::M22(m) => m,
      UniformValue::M33(m) => m,
      UniformValue::M44(m) => m,
      _ => &[],
    }
  }

  /// Type of this value.
  pub fn ty(&self) -> UniformType {
    match *self {
      UniformValue::Int(_) => UniformType::Int,
      UniformValue::UInt(_) => UniformType::UInt,
      UniformValue::Bool(_) => UniformType::Bool,
      UniformValue::Float(_) => UniformType::Float,
      UniformValue::Vec2(_) => UniformType::Vec2,
      UniformValue::Vec3(_) => UniformType::Vec3,
      UniformValue::Vec4(_) => UniformType::Vec4,
      UniformValue::M22(_) => UniformType::M22,
      UniformValue::M33(_) => UniformType::M33,
      UniformValue::M44(_) => UniformType::M44,
      UniformValue::Sampler2D(_) => UniformType::Sampler2D,
    }
  }

  /// Parse a textual value of type `ty`.
  ///
  /// Components are separated by commas and / or whitespace. Booleans accept `true`, `false`, `1`
  /// and `0`. Matrices are given column-major. Samplers are written `unit` or `unit:handle`.
  pub fn parse(ty: UniformType, text: &str) -> Result<Self, ValueParseError> {
    let components: Vec<&str> = text
      .split(|c: char| c == ',' || c.is_whitespace())
      .filter(|s| !s.is_empty())
      .collect();

    match ty {
      UniformType::Int => Ok(UniformValue::Int(parse_single(ty, &components)?)),
      UniformType::UInt => Ok(UniformValue::UInt(parse_single(ty, &components)?)),

      UniformType::Bool => {
        let s = single_component(ty, &components)?;
        match s {
          "true" | "1" => Ok(UniformValue::Bool(true)),
          "false" | "0" => Ok(UniformValue::Bool(false)),
          _ => Err(ValueParseError::InvalidComponent(s.to_owned())),
        }
      }

      UniformType::Sampler2D => {
        let s = single_component(ty, &components)?;
        let (unit, handle) = match s.split_once(':') {
          Some((unit, handle)) => (parse_component(unit)?, parse_component(handle)?),
          None => (parse_component(s)?, 0),
        };

        Ok(UniformValue::Sampler2D(Texture2D::new(handle, unit)))
      }

      _ => {
        let expected = ty.component_count();
        if components.len() != expected {
          return Err(ValueParseError::ComponentCount {
            ty,
            expected,
            found: components.len(),
          });
        }

        let floats = components
          .iter()
          .map(|s| parse_component(s))
          .collect::<Result<Vec<f32>, _>>()?;

        Ok(UniformValue::from_floats(ty, &floats))
      }
    }
  }
}

fn single_component<'a>(ty: UniformType, components: &[&'a str]) -> Result<&'a str, ValueParseError> {
  match components {
    [s] => Ok(*s),
    _ => Err(ValueParseError::ComponentCount {
      ty,
      expected: 1,
      found: components.len(),
    }),
  }
}

fn parse_single<T>(ty: UniformType, components: &[&str]) -> Result<T, ValueParseError>
where
  T: FromStr,
{
  single_component(ty, components).and_then(parse_component)
}

fn parse_component<T>(s: &str) -> Result<T, ValueParseError>
where
  T: FromStr,
{
  s.parse()
    .map_err(|_| ValueParseError::InvalidComponent(s.to_owned()))
}

impl fmt::Display for UniformValue {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      UniformValue::Int(x) => write!(f, "{}", x),
      UniformValue::UInt(x) => write!(f, "{}", x),
      UniformValue::Bool(x) => write!(f, "{}", x),
      UniformValue::Sampler2D(ref tex) => write!(f, "{}:{}", tex.unit(), tex.handle()),
      _ => {
        for (i, x) in self.as_floats().iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }

          write!(f, "{}", x)?;
        }

        Ok(())
      }
    }
  }
}

/// Error that can occur when parsing a textual uniform value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValueParseError {
  /// The number of components doesn’t match the type.
  ComponentCount {
    /// Type being parsed.
    ty: UniformType,
    /// Expected number of components.
    expected: usize,
    /// Number of components found.
    found: usize,
  },
  /// A component could not be parsed.
  InvalidComponent(String),
}

impl fmt::Display for ValueParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ValueParseError::ComponentCount {
        ty,
        expected,
        found,
      } => write!(
        f,
        "{} expects {} component(s), found {}",
        ty, expected, found
      ),

      ValueParseError::InvalidComponent(ref s) => write!(f, "invalid component: {}", s),
    }
  }
}

impl error::Error for ValueParseError {}

/// Errors that can occur when editing uniforms.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UniformError {
  /// No uniform with that name exists in the program.
  UnknownUniform(String),
  /// The value doesn’t have the type of the uniform.
  TypeMismatch {
    /// Name of the uniform.
    name: String,
    /// Type of the uniform.
    expected: UniformType,
    /// Type of the rejected value.
    found: UniformType,
  },
}

impl fmt::Display for UniformError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      UniformError::UnknownUniform(ref name) => write!(f, "unknown uniform {}", name),
      UniformError::TypeMismatch {
        ref name,
        expected,
        found,
      } => write!(
        f,
        "type mismatch for uniform {}: expected {}, found {}",
        name, expected, found
      ),
    }
  }
}

impl error::Error for UniformError {}

/// A uniform declared in a shader program.
///
/// The value always has the type of the uniform.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderUniform {
  name: String,
  ty: UniformType,
  location: Option<i32>,
  value: UniformValue,
}

impl ShaderUniform {
  pub(crate) fn new(name: String, location: Option<i32>, value: UniformValue) -> Self {
    ShaderUniform {
      name,
      ty: value.ty(),
      location,
      value,
    }
  }

  /// Name of the uniform.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Type of the uniform.
  pub fn ty(&self) -> UniformType {
    self.ty
  }

  /// Location resolved when the program was built.
  ///
  /// `None` means the uniform is declared in the sources but inactive in the linked program.
  pub fn location(&self) -> Option<i32> {
    self.location
  }

  /// Whether the uniform is active in the linked program.
  pub fn is_active(&self) -> bool {
    self.location.is_some()
  }

  /// Current host-side value.
  pub fn value(&self) -> &UniformValue {
    &self.value
  }

  /// Replace the host-side value.
  ///
  /// The new value is uploaded the next time the owning program is bound.
  pub fn set(&mut self, value: UniformValue) -> Result<(), UniformError> {
    if value.ty() != self.ty {
      return Err(UniformError::TypeMismatch {
        name: self.name.clone(),
        expected: self.ty,
        found: value.ty(),
      });
    }

    self.value = value;
    Ok(())
  }

  /// Parse a textual value and store it.
  pub fn set_from_str(&mut self, text: &str) -> Result<(), ValueParseError> {
    self.value = UniformValue::parse(self.ty, text)?;
    Ok(())
  }
}
