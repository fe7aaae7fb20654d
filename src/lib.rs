//! Probabilistic CKY parsing for grammars in Chomsky Normal Form.
//!
//! ```
//! use pcfg_cky::Grammar;
//!
//! let g: Grammar = r#"
//!   S ; 1.0
//!   S -> NP VP ; 1.0
//!   NP -> she ; 1.0
//!   VP -> runs ; 1.0
//! "#
//! .parse()
//! .unwrap();
//! g.validate().unwrap();
//!
//! assert!(g.is_in_language(&["she", "runs"]));
//! let (tree, log_prob) = g.best_parse(&["she", "runs"]).unwrap();
//! assert_eq!(tree.bracketed(), "(S (NP she) (VP runs))");
//! assert_eq!(log_prob, 0.0);
//! ```

#[macro_use]
extern crate lazy_static;

pub mod chart;
pub mod cyk;
pub mod error;
pub mod format;
pub mod grammar;
pub mod parse_grammar;
pub mod rules;
pub mod syntree;
pub mod tree;
pub mod utils;

pub use crate::chart::{Backpointer, Chart, Entry, ProbTable};
pub use crate::error::{FormatError, GrammarError, LookupError, ValidationIssue};
pub use crate::grammar::Grammar;
pub use crate::parse_grammar::load_grammar;
pub use crate::rules::Rule;
pub use crate::syntree::ParseTree;
pub use crate::tree::extract_tree;
pub use crate::utils::Err;

impl Grammar {
  pub fn is_in_language<S: AsRef<str>>(&self, input: &[S]) -> bool {
    cyk::recognize(self, input)
  }

  pub fn parse_chart<S: AsRef<str>>(&self, input: &[S]) -> (Chart, ProbTable) {
    cyk::parse_chart(self, input)
  }

  /// The most likely tree for the whole input, rooted at the start symbol,
  /// with its log probability. None if the input isn't in the language.
  pub fn best_parse<S: AsRef<str>>(&self, input: &[S]) -> Option<(ParseTree, f64)> {
    let n = input.len();
    let (chart, probs) = self.parse_chart(input);
    let log_prob = *probs.entry(0, n, &self.start)?;
    let tree = extract_tree(&chart, 0, n, &self.start).ok()?;
    Some((tree, log_prob))
  }
}

/// Membership check, see [`cyk::recognize`]
pub fn is_in_language<S: AsRef<str>>(g: &Grammar, input: &[S]) -> bool {
  cyk::recognize(g, input)
}

/// Viterbi chart and probability table, see [`cyk::parse_chart`]
pub fn parse<S: AsRef<str>>(g: &Grammar, input: &[S]) -> (Chart, ProbTable) {
  cyk::parse_chart(g, input)
}

/// Checks a grammar is a normalized PCFG in CNF
pub fn validate(g: &Grammar) -> bool {
  g.verify()
}

#[test]
fn test_end_to_end() {
  let g: Grammar = r#"
    S ; 1.0
    S -> NP VP ; 1.0
    NP -> the ; 0.5
    NP -> a ; 0.5
    VP -> runs ; 1.0
  "#
  .parse()
  .unwrap();
  assert!(validate(&g));

  assert!(!is_in_language(&g, &["runs", "the"]));
  assert!(g.best_parse(&["runs", "the"]).is_none());

  let tokens = ["the", "runs"];
  assert!(is_in_language(&g, &tokens));
  let (chart, probs) = parse(&g, &tokens);
  let tree = extract_tree(&chart, 0, 2, "S").unwrap();
  assert_eq!(tree.bracketed(), "(S (NP the) (VP runs))");
  assert_eq!(
    probs.entry(0, 2, "S"),
    Some(&(0.5f64.ln() + 1.0f64.ln() + 1.0f64.ln()))
  );

  let (best, log_prob) = g.best_parse(&tokens).unwrap();
  assert_eq!(best, tree);
  assert_eq!(log_prob, 0.5f64.ln());
}

#[test]
fn test_single_token_tree() {
  let g: Grammar = "S ; 1.0\nS -> hi ; 1.0".parse().unwrap();
  let (tree, log_prob) = g.best_parse(&["hi"]).unwrap();
  assert!(tree.is_leaf());
  assert_eq!(tree.bracketed(), "(S hi)");
  assert_eq!(log_prob, 0.0);

  let empty: Vec<String> = Vec::new();
  assert!(g.best_parse(&empty).is_none());
}
