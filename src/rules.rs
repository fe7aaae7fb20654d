use std::fmt;

/// Whether a rule rewrites to a terminal or to a pair of nonterminals.
/// Anything else isn't CNF and is rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
  Lexical,
  Binary,
  Invalid(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
  pub lhs: String,
  pub rhs: Vec<String>,
  pub probability: f64,
}

impl Rule {
  pub fn new(lhs: impl Into<String>, rhs: Vec<String>, probability: f64) -> Self {
    Self {
      lhs: lhs.into(),
      rhs,
      probability,
    }
  }

  pub fn lexical(lhs: impl Into<String>, word: impl Into<String>, probability: f64) -> Self {
    Self::new(lhs, vec![word.into()], probability)
  }

  pub fn binary(
    lhs: impl Into<String>,
    left: impl Into<String>,
    right: impl Into<String>,
    probability: f64,
  ) -> Self {
    Self::new(lhs, vec![left.into(), right.into()], probability)
  }

  pub fn len(&self) -> usize {
    self.rhs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn arity(&self) -> Arity {
    match self.len() {
      1 => Arity::Lexical,
      2 => Arity::Binary,
      n => Arity::Invalid(n),
    }
  }

  pub fn is_lexical(&self) -> bool {
    self.arity() == Arity::Lexical
  }

  pub fn is_binary(&self) -> bool {
    self.arity() == Arity::Binary
  }

  /// Natural log of the rule probability. Always <= 0 for a valid rule.
  pub fn log_probability(&self) -> f64 {
    self.probability.ln()
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ->", self.lhs)?;
    for s in self.rhs.iter() {
      write!(f, " {}", s)?;
    }
    write!(f, " ; {}", self.probability)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_arity() {
    assert_eq!(Rule::lexical("NP", "she", 0.5).arity(), Arity::Lexical);
    assert_eq!(Rule::binary("S", "NP", "VP", 1.0).arity(), Arity::Binary);
    assert_eq!(
      Rule::new("S", vec!["a".into(), "b".into(), "c".into()], 1.0).arity(),
      Arity::Invalid(3)
    );
    assert!(Rule::new("S", Vec::new(), 1.0).is_empty());
  }

  #[test]
  fn test_display() {
    assert_eq!(
      Rule::binary("S", "NP", "VP", 0.25).to_string(),
      "S -> NP VP ; 0.25"
    );
    assert_eq!(Rule::lexical("VP", "runs", 1.0).to_string(), "VP -> runs ; 1");
  }
}
