//! Line-oriented reading of grammar files.
//!
//! ```text
//! # comment
//! S ; 1.0
//! S -> NP VP ; 1.0
//! NP -> she ; 1.0
//! VP -> runs ; 1.0
//! ```
//!
//! The start symbol line is the one without an arrow. If there are several,
//! the last one wins.

use regex::Regex;
use std::str::FromStr;

use tracing::debug;

use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::rules::Rule;

impl FromStr for Grammar {
  type Err = GrammarError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    load_grammar(s.lines())
  }
}

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

enum Line {
  Blank,
  Start(String),
  Rule(Rule),
}

fn parse_probability(s: &str, line: usize) -> Result<f64, GrammarError> {
  let s = s.trim();
  s.parse::<f64>().map_err(|_| GrammarError::BadProbability {
    line,
    value: s.to_string(),
  })
}

/// LHS -> SYMBOL... ; PROBABILITY
///
/// The probability follows the last `;`, so terminals may contain `;` themselves.
fn parse_rule(s: &str, line: usize) -> Result<Rule, GrammarError> {
  regex_static!(RULE, r"^(?P<lhs>[^\s;]+)\s*->(?P<rhs>.*);(?P<prob>[^;]*)$");

  let caps = RULE.captures(s).ok_or_else(|| GrammarError::Malformed {
    line,
    message: format!("expected 'LHS -> SYMBOLS ; PROBABILITY', got '{}'", s),
  })?;

  let rhs = caps["rhs"]
    .split_whitespace()
    .map(str::to_string)
    .collect::<Vec<_>>();
  if rhs.is_empty() {
    return Err(GrammarError::Malformed {
      line,
      message: format!("rule for {} has an empty right-hand side", &caps["lhs"]),
    });
  }

  let probability = parse_probability(&caps["prob"], line)?;
  Ok(Rule::new(&caps["lhs"], rhs, probability))
}

/// SYMBOL ; PROBABILITY
fn parse_start(s: &str, line: usize) -> Result<String, GrammarError> {
  regex_static!(START, r"^(?P<symbol>[^\s;]+)\s*;(?P<prob>[^;]*)$");

  let caps = START.captures(s).ok_or_else(|| GrammarError::Malformed {
    line,
    message: format!("expected 'SYMBOL ; PROBABILITY', got '{}'", s),
  })?;

  // the probability is checked for shape but otherwise unused
  parse_probability(&caps["prob"], line)?;
  Ok(caps["symbol"].to_string())
}

fn parse_line(s: &str, line: usize) -> Result<Line, GrammarError> {
  let s = s.trim();
  if s.is_empty() || s.starts_with('#') {
    Ok(Line::Blank)
  } else if s.contains("->") {
    parse_rule(s, line).map(Line::Rule)
  } else {
    parse_start(s, line).map(Line::Start)
  }
}

/// Builds a grammar from source lines, failing on the first malformed one.
/// Doesn't validate: call [`Grammar::validate`] before parsing with it.
pub fn load_grammar<I, S>(lines: I) -> Result<Grammar, GrammarError>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut rules = Vec::new();
  let mut start = None;

  for (idx, s) in lines.into_iter().enumerate() {
    match parse_line(s.as_ref(), idx + 1)? {
      Line::Blank => {}
      Line::Start(symbol) => start = Some(symbol),
      Line::Rule(rule) => rules.push(rule),
    }
  }

  if rules.is_empty() {
    return Err(GrammarError::Empty);
  }
  let start = start.ok_or(GrammarError::MissingStart)?;

  debug!(rules = rules.len(), start = %start, "loaded grammar");
  Ok(Grammar::new(rules, start))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_grammar() {
    let g: Grammar = r#"
      # a tiny grammar
      S;1.0
      S -> NP VP;1.0

      NP -> the ; 0.5
      NP -> a;0.5
      VP -> runs ; 1.0
    "#
    .parse()
    .unwrap();

    assert_eq!(g.start, "S");
    assert_eq!(g.rules().len(), 4);
    assert_eq!(g.rules()[0], std::sync::Arc::new(Rule::binary("S", "NP", "VP", 1.0)));
    assert_eq!(g.rules()[2].probability, 0.5);
    assert!(g.verify());
  }

  #[test]
  fn test_last_start_wins() {
    let g: Grammar = "S ; 1.0\nTOP ; 1.0\nTOP -> x ; 1.0".parse().unwrap();
    assert_eq!(g.start, "TOP");
  }

  #[test]
  fn test_terminals_are_opaque() {
    let g: Grammar = "S ; 1\nS -> 's ; 0.5\nS -> , ; 0.5".parse().unwrap();
    assert_eq!(g.lexical_rules("'s").len(), 1);
    assert_eq!(g.lexical_rules(",").len(), 1);
  }

  #[test]
  fn test_semicolon_terminal() {
    let g: Grammar = "S ; 1.0\nS -> A B ; 1.0\nA -> x ; 1.0\nB -> ; ; 1.0"
      .parse()
      .unwrap();
    assert_eq!(g.lexical_rules(";")[0].lhs, "B");
    assert_eq!(g.lexical_rules(";")[0].probability, 1.0);
    assert!(g.verify());
    assert!(g.is_in_language(&["x", ";"]));

    let g: Grammar = "S ; 1.0\nS -> a;b ; 1.0".parse().unwrap();
    assert_eq!(g.rules()[0].rhs, vec!["a;b".to_string()]);
  }

  #[test]
  fn test_bad_probability() {
    let err = "S ; 1.0\nS -> x ; lots".parse::<Grammar>().unwrap_err();
    match err {
      GrammarError::BadProbability { line, value } => {
        assert_eq!(line, 2);
        assert_eq!(value, "lots");
      }
      other => panic!("unexpected error {:?}", other),
    }

    assert!(matches!(
      "S ; high\nS -> x ; 1.0".parse::<Grammar>(),
      Err(GrammarError::BadProbability { line: 1, .. })
    ));
  }

  #[test]
  fn test_malformed() {
    assert!(matches!(
      "S ; 1.0\n\nS -> x".parse::<Grammar>(),
      Err(GrammarError::Malformed { line: 3, .. })
    ));
    assert!(matches!(
      "S ; 1.0\nS -> ; 1.0".parse::<Grammar>(),
      Err(GrammarError::Malformed { line: 2, .. })
    ));
    assert!(matches!(
      "S 1.0\nS -> x ; 1.0".parse::<Grammar>(),
      Err(GrammarError::Malformed { line: 1, .. })
    ));
  }

  #[test]
  fn test_missing_pieces() {
    assert!(matches!(
      "S -> x ; 1.0".parse::<Grammar>(),
      Err(GrammarError::MissingStart)
    ));
    assert!(matches!(
      "# nothing\nS ; 1.0\n".parse::<Grammar>(),
      Err(GrammarError::Empty)
    ));
  }

  #[test]
  fn test_load_from_lines() {
    let lines = vec!["S ; 1.0".to_string(), "S -> x ; 1.0".to_string()];
    let g = load_grammar(&lines).unwrap();
    assert_eq!(g.lexical_rules("x")[0].lhs, "S");
  }
}
