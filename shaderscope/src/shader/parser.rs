//! Uniform declaration parser.
//!
//! Only lines of the form
//!
//! ```text
//! uniform <type> <identifier>[;] [= <default-expression>]
//! ```
//!
//! are recognized; the parser is not a GLSL parser. Qualifier or `layout(…)` prefixes make the line
//! unrecognized, and default-value expressions are ignored.

use std::error;
use std::fmt;

use crate::shader::uniform::UniformType;

/// A recognized uniform declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UniformDecl {
  /// Identifier of the uniform.
  pub name: String,
  /// Type of the uniform.
  pub ty: UniformType,
}

/// Error raised on a uniform declaration that cannot be accepted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
  /// The type keyword is not one of the supported uniform types.
  UnknownType {
    /// Identifier of the rejected uniform.
    name: String,
    /// Unrecognized type keyword.
    keyword: String,
  },
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ParseError::UnknownType {
        ref name,
        ref keyword,
      } => write!(f, "unsupported type {} for uniform {}", keyword, name),
    }
  }
}

impl error::Error for ParseError {}

/// Parse a single line of shader source.
///
/// Returns `Ok(None)` if the line is blank, a directive / comment line starting with `#`, or doesn’t
/// start with the `uniform` keyword.
pub fn parse_uniform_line(line: &str) -> Result<Option<UniformDecl>, ParseError> {
  let line = line.trim_start();

  if line.is_empty() || line.starts_with('#') {
    return Ok(None);
  }

  let mut tokens = line.split_whitespace();

  if tokens.next() != Some("uniform") {
    return Ok(None);
  }

  let (keyword, name) = match (tokens.next(), tokens.next()) {
    (Some(keyword), Some(name)) => (keyword, name),
    _ => return Ok(None),
  };

  // the identifier may be glued to its default value or terminator: `t=1.0;`
  let name = name.split('=').next().unwrap_or(name);
  let name = name.strip_suffix(';').unwrap_or(name);

  if name.is_empty() {
    return Ok(None);
  }

  match UniformType::from_keyword(keyword) {
    Some(ty) => Ok(Some(UniformDecl {
      name: name.to_owned(),
      ty,
    })),

    None => Err(ParseError::UnknownType {
      name: name.to_owned(),
      keyword: keyword.to_owned(),
    }),
  }
}

/// Parse every line of a shader source, in order.
///
/// Rejected declarations are logged and skipped.
pub fn parse_uniforms(src: &str) -> Vec<UniformDecl> {
  src
    .lines()
    .filter_map(|line| match parse_uniform_line(line) {
      Ok(decl) => decl,
      Err(e) => {
        log::warn!("{}", e);
        None
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn decl(name: &str, ty: UniformType) -> Option<UniformDecl> {
    Some(UniformDecl {
      name: name.to_owned(),
      ty,
    })
  }

  #[test]
  fn every_supported_type() {
    let cases = [
      ("int", UniformType::Int),
      ("uint", UniformType::UInt),
      ("float", UniformType::Float),
      ("bool", UniformType::Bool),
      ("vec2", UniformType::Vec2),
      ("vec3", UniformType::Vec3),
      ("vec4", UniformType::Vec4),
      ("mat2", UniformType::M22),
      ("mat3", UniformType::M33),
      ("mat4", UniformType::M44),
      ("sampler2D", UniformType::Sampler2D),
    ];

    for &(kw, ty) in &cases {
      let line = format!("uniform {} u_value;", kw);
      assert_eq!(parse_uniform_line(&line), Ok(decl("u_value", ty)), "{}", line);
    }
  }

  #[test]
  fn terminator_is_optional() {
    assert_eq!(
      parse_uniform_line("uniform float t"),
      Ok(decl("t", UniformType::Float))
    );
    assert_eq!(
      parse_uniform_line("  uniform vec3 color; // tint"),
      Ok(decl("color", UniformType::Vec3))
    );
  }

  #[test]
  fn default_expression_ignored() {
    assert_eq!(
      parse_uniform_line("uniform float scale = 2.0;"),
      Ok(decl("scale", UniformType::Float))
    );
  }

  #[test]
  fn default_glued_to_identifier() {
    assert_eq!(
      parse_uniform_line("uniform float t=1.0;"),
      Ok(decl("t", UniformType::Float))
    );
    assert_eq!(
      parse_uniform_line("uniform vec2 offset= vec2(0.);"),
      Ok(decl("offset", UniformType::Vec2))
    );
  }

  #[test]
  fn missing_identifier() {
    assert_eq!(parse_uniform_line("uniform float ;"), Ok(None));
    assert_eq!(parse_uniform_line("uniform float =1.0;"), Ok(None));
    assert_eq!(parse_uniform_line("uniform samplerCube ;"), Ok(None));
  }

  #[test]
  fn tabs_are_whitespace() {
    assert_eq!(
      parse_uniform_line("\tuniform\tmat4\tmodel;"),
      Ok(decl("model", UniformType::M44))
    );
  }

  #[test]
  fn non_declarations() {
    let lines = [
      "",
      "   ",
      "#version 330 core",
      "  # define UNIFORM 1",
      "in vec3 position;",
      "out vec4 frag;",
      "void main() {",
      "uniformity is nice",
      "layout(location = 0) uniform float t;",
      "const float uniform_scale = 1.;",
      "uniform",
      "uniform float",
    ];

    for line in &lines {
      assert_eq!(parse_uniform_line(line), Ok(None), "{:?}", line);
    }
  }

  #[test]
  fn unknown_type_rejected() {
    assert_eq!(
      parse_uniform_line("uniform dmat4 projection;"),
      Err(ParseError::UnknownType {
        name: "projection".to_owned(),
        keyword: "dmat4".to_owned(),
      })
    );
  }

  #[test]
  fn declaration_order() {
    let src = "#version 330 core\n\
               uniform int a;\n\
               in vec2 uv;\n\
               uniform samplerCube sky;\n\
               uniform float b;\n\
               void main() {}\n";

    assert_eq!(
      parse_uniforms(src),
      vec![
        UniformDecl {
          name: "a".to_owned(),
          ty: UniformType::Int
        },
        UniformDecl {
          name: "b".to_owned(),
          ty: UniformType::Float
        },
      ]
    );
  }
}
