//! Error types for grammar loading, validation, and chart inspection.

use thiserror::Error;

/// Errors that can occur while reading or validating a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
  /// A line that is neither a rule nor a start-symbol declaration.
  #[error("line {line}: {message}")]
  Malformed { line: usize, message: String },

  /// Probability text that isn't a float.
  #[error("line {line}: bad probability '{value}'")]
  BadProbability { line: usize, value: String },

  #[error("no start symbol declared")]
  MissingStart,

  #[error("empty ruleset")]
  Empty,

  #[error("couldn't read grammar file: {0}")]
  Io(#[from] std::io::Error),

  /// The grammar loaded, but isn't a normalized PCFG in CNF.
  #[error("invalid grammar: {}", join_issues(.0))]
  Invalid(Vec<ValidationIssue>),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
  issues
    .iter()
    .map(|i| i.to_string())
    .collect::<Vec<_>>()
    .join("; ")
}

/// A single reason a grammar fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
  #[error("rule {rule} has {arity} right-hand symbols, expected 1 or 2")]
  BadArity { rule: String, arity: usize },

  #[error("lexical rule {rule} rewrites to nonterminal {symbol}")]
  LexicalRhsIsNonterminal { rule: String, symbol: String },

  #[error("binary rule {rule} uses {symbol}, which has no rules")]
  BinaryRhsNotNonterminal { rule: String, symbol: String },

  #[error("rule {rule} has probability {probability} outside (0, 1]")]
  ProbabilityOutOfRange { rule: String, probability: f64 },

  #[error("rules for {lhs} sum to {sum}, not 1")]
  Unnormalized { lhs: String, sum: f64 },

  #[error("start symbol {symbol} has no rules")]
  UnknownStartSymbol { symbol: String },
}

/// Tree extraction couldn't follow the chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
  /// The chart holds nothing for this (span, nonterminal).
  #[error("no entry for {symbol} over {}..{}", .span.0, .span.1)]
  Missing { span: (usize, usize), symbol: String },

  /// A split whose children don't strictly divide its span.
  #[error("backpointers for {symbol} over {}..{} don't split the span", .span.0, .span.1)]
  BadSplit { span: (usize, usize), symbol: String },
}

/// Structural problems found by the chart and probability table checkers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
  #[error("leaf for {symbol} at {}..{} must cover exactly one token", .span.0, .span.1)]
  WideLeaf { span: (usize, usize), symbol: String },

  #[error("backpointers for {symbol} at {}..{} don't split the span", .span.0, .span.1)]
  BadSplit { span: (usize, usize), symbol: String },

  #[error("backpointer {child} from {symbol} at {}..{} points at an empty entry", .span.0, .span.1)]
  DanglingBackpointer {
    span: (usize, usize),
    symbol: String,
    child: String,
  },

  #[error("log probability {value} for {symbol} at {}..{} is positive or NaN", .span.0, .span.1)]
  BadLogProbability {
    span: (usize, usize),
    symbol: String,
    value: f64,
  },

  #[error("chart and probability table disagree on {symbol} at {}..{}", .span.0, .span.1)]
  Unsynchronized { span: (usize, usize), symbol: String },
}
