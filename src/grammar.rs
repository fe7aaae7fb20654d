use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{GrammarError, ValidationIssue};
use crate::rules::{Arity, Rule};
use crate::utils::{is_close, Tolerance};

/// A probabilistic context-free grammar in Chomsky Normal Form.
///
/// Built once from its rules and never mutated afterwards, so a `&Grammar`
/// can be shared freely between threads parsing different inputs.
#[derive(Debug, Clone)]
pub struct Grammar {
  pub start: String,
  rules: Vec<Arc<Rule>>,
  rules_by_rhs: HashMap<Vec<String>, Vec<Arc<Rule>>>,
  rules_by_lhs: HashMap<String, Vec<Arc<Rule>>>,
  // parser lookups: by word, and by left then right child
  lexical: HashMap<String, Vec<Arc<Rule>>>,
  binary: HashMap<String, HashMap<String, Vec<Arc<Rule>>>>,
}

impl Grammar {
  /// Indexes `rules` by both sides. Rules are kept in the order given,
  /// duplicates included.
  pub fn new(rules: Vec<Rule>, start: impl Into<String>) -> Self {
    let rules = rules.into_iter().map(Arc::new).collect::<Vec<_>>();

    let mut rules_by_rhs: HashMap<Vec<String>, Vec<Arc<Rule>>> = HashMap::new();
    let mut rules_by_lhs: HashMap<String, Vec<Arc<Rule>>> = HashMap::new();
    let mut lexical: HashMap<String, Vec<Arc<Rule>>> = HashMap::new();
    let mut binary: HashMap<String, HashMap<String, Vec<Arc<Rule>>>> = HashMap::new();
    for rule in rules.iter() {
      rules_by_rhs
        .entry(rule.rhs.clone())
        .or_default()
        .push(rule.clone());
      rules_by_lhs
        .entry(rule.lhs.clone())
        .or_default()
        .push(rule.clone());

      match rule.rhs.as_slice() {
        [word] => lexical.entry(word.clone()).or_default().push(rule.clone()),
        [left, right] => binary
          .entry(left.clone())
          .or_default()
          .entry(right.clone())
          .or_default()
          .push(rule.clone()),
        _ => {}
      }
    }

    Self {
      start: start.into(),
      rules,
      rules_by_rhs,
      rules_by_lhs,
      lexical,
      binary,
    }
  }

  pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
    let src = fs::read_to_string(path.as_ref())?;
    debug!(path = %path.as_ref().display(), "read grammar file");
    src.parse()
  }

  pub fn rules(&self) -> &[Arc<Rule>] {
    &self.rules
  }

  /// All rules whose right-hand side is exactly `rhs`
  pub fn rules_for_rhs(&self, rhs: &[String]) -> &[Arc<Rule>] {
    self
      .rules_by_rhs
      .get(rhs)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  /// All rules expanding `lhs`
  pub fn rules_for_lhs(&self, lhs: &str) -> &[Arc<Rule>] {
    self
      .rules_by_lhs
      .get(lhs)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  pub fn lexical_rules(&self, word: &str) -> &[Arc<Rule>] {
    self
      .lexical
      .get(word)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  pub fn binary_rules(&self, left: &str, right: &str) -> &[Arc<Rule>] {
    self
      .binary
      .get(left)
      .and_then(|by_right| by_right.get(right))
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  pub fn is_nonterminal(&self, symbol: &str) -> bool {
    self.rules_by_lhs.contains_key(symbol)
  }

  /// Nonterminals in sorted order
  pub fn nonterminals(&self) -> Vec<&str> {
    let mut nts = self
      .rules_by_lhs
      .keys()
      .map(String::as_str)
      .collect::<Vec<_>>();
    nts.sort_unstable();
    nts
  }

  /// Collects every reason this grammar isn't a normalized PCFG in CNF.
  /// An empty vec means the grammar is valid.
  pub fn diagnostics(&self, tol: Tolerance) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !self.is_nonterminal(&self.start) {
      issues.push(ValidationIssue::UnknownStartSymbol {
        symbol: self.start.clone(),
      });
    }

    let mut seen: HashSet<(&str, &[String])> = HashSet::new();
    for rule in self.rules.iter() {
      if !seen.insert((rule.lhs.as_str(), rule.rhs.as_slice())) {
        debug!(rule = %rule, "duplicate rule, probabilities will be summed");
      }

      if !(rule.probability > 0.0 && rule.probability <= 1.0) {
        issues.push(ValidationIssue::ProbabilityOutOfRange {
          rule: rule.to_string(),
          probability: rule.probability,
        });
      }

      match rule.arity() {
        Arity::Lexical => {
          if self.is_nonterminal(&rule.rhs[0]) {
            issues.push(ValidationIssue::LexicalRhsIsNonterminal {
              rule: rule.to_string(),
              symbol: rule.rhs[0].clone(),
            });
          }
        }
        Arity::Binary => {
          for symbol in rule.rhs.iter().filter(|s| !self.is_nonterminal(s)) {
            issues.push(ValidationIssue::BinaryRhsNotNonterminal {
              rule: rule.to_string(),
              symbol: symbol.clone(),
            });
          }
        }
        Arity::Invalid(arity) => issues.push(ValidationIssue::BadArity {
          rule: rule.to_string(),
          arity,
        }),
      }
    }

    for lhs in self.nonterminals() {
      let sum = self
        .rules_for_lhs(lhs)
        .iter()
        .map(|r| r.probability)
        .sum::<f64>();
      if !is_close(sum, 1.0, tol) {
        issues.push(ValidationIssue::Unnormalized {
          lhs: lhs.to_string(),
          sum,
        });
      }
    }

    issues
  }

  pub fn validate_with(&self, tol: Tolerance) -> Result<(), GrammarError> {
    let issues = self.diagnostics(tol);
    if issues.is_empty() {
      Ok(())
    } else {
      for issue in issues.iter() {
        warn!(%issue, "grammar validation failed");
      }
      Err(GrammarError::Invalid(issues))
    }
  }

  /// Checks the grammar once before parsing. The parser itself never re-validates.
  pub fn validate(&self) -> Result<(), GrammarError> {
    self.validate_with(Tolerance::default())
  }

  pub fn verify(&self) -> bool {
    self.validate().is_ok()
  }
}

impl fmt::Display for Grammar {
  /// Writes the grammar back out in the line format it's read from
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{} ; 1.0", self.start)?;

    let mut by_lhs: BTreeMap<&str, Vec<&Rule>> = BTreeMap::new();
    for rule in self.rules.iter() {
      by_lhs.entry(rule.lhs.as_str()).or_default().push(rule);
    }
    for rule in by_lhs.values().flatten() {
      writeln!(f, "{}", rule)?;
    }

    Ok(())
  }
}
