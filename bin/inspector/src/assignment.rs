//! `name=value` command-line assignments.

use std::{error::Error, fmt, str::FromStr};

/// A `name=value` pair given on the command line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
  pub name: String,
  pub value: String,
}

#[derive(Debug, Eq, PartialEq)]
pub enum AssignmentError {
  MissingEqualSign(String),
  EmptyName(String),
}

impl fmt::Display for AssignmentError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      AssignmentError::MissingEqualSign(ref s) => write!(f, "expected name=value, got {}", s),
      AssignmentError::EmptyName(ref s) => write!(f, "missing uniform name in {}", s),
    }
  }
}

impl Error for AssignmentError {}

impl FromStr for Assignment {
  type Err = AssignmentError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (name, value) = s
      .split_once('=')
      .ok_or_else(|| AssignmentError::MissingEqualSign(s.to_owned()))?;
    let name = name.trim();

    if name.is_empty() {
      return Err(AssignmentError::EmptyName(s.to_owned()));
    }

    Ok(Assignment {
      name: name.to_owned(),
      value: value.trim().to_owned(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse() {
    assert_eq!(
      "tint = 1, 0.5, 0".parse(),
      Ok(Assignment {
        name: "tint".to_owned(),
        value: "1, 0.5, 0".to_owned()
      })
    );

    // only the first sign splits
    assert_eq!(
      "a=b=c".parse::<Assignment>().map(|a| a.value),
      Ok("b=c".to_owned())
    );
  }

  #[test]
  fn errors() {
    assert_eq!(
      "tint".parse::<Assignment>(),
      Err(AssignmentError::MissingEqualSign("tint".to_owned()))
    );
    assert_eq!(
      " =1".parse::<Assignment>(),
      Err(AssignmentError::EmptyName(" =1".to_owned()))
    );
  }
}
