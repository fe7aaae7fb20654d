use tracing::{debug, trace};

use crate::chart::{Backpointer, Cell, Chart, Entry, ProbTable, SpanTable};
use crate::grammar::Grammar;

/// Membership check: true iff the start symbol derives the whole input.
///
/// Tokens no lexical rule covers leave their cell empty, so the input is
/// rejected at the end rather than erroring. Empty input is rejected.
pub fn recognize<S: AsRef<str>>(g: &Grammar, input: &[S]) -> bool {
  let n = input.len();
  if n == 0 {
    debug!("empty input is never in the language");
    return false;
  }

  // only presence matters here, so cells are sets of nonterminals
  let mut table: SpanTable<()> = SpanTable::new(n);

  for (i, token) in input.iter().enumerate() {
    let token = token.as_ref();
    let rules = g.lexical_rules(token);
    if rules.is_empty() {
      debug!(token, position = i, "token not covered by any lexical rule");
    }
    for rule in rules {
      table.insert(i, i + 1, rule.lhs.as_str(), ());
    }
  }

  for length in 2..=n {
    for i in 0..=(n - length) {
      let j = i + length;
      let mut found: Cell<()> = Cell::new();
      for k in (i + 1)..j {
        for left in table[(i, k)].keys() {
          for right in table[(k, j)].keys() {
            for rule in g.binary_rules(left, right) {
              found.insert(rule.lhs.clone(), ());
            }
          }
        }
      }
      table.set_cell(i, j, found);
    }
  }

  table.entry(0, n, &g.start).is_some()
}

/// Best derivation so far for each nonterminal of a single cell
#[derive(Debug, Default)]
struct BestCell(Cell<(f64, Entry)>);

impl BestCell {
  /// Keeps `candidate` for `symbol` if nothing is stored yet or it beats what is.
  /// Ties keep the earlier derivation.
  fn relax(&mut self, symbol: &str, candidate: f64, entry: impl FnOnce() -> Entry) {
    match self.0.get_mut(symbol) {
      Some(best) => {
        if candidate > best.0 {
          *best = (candidate, entry());
        }
      }
      None => {
        self.0.insert(symbol.to_string(), (candidate, entry()));
      }
    }
  }

  fn store(self, chart: &mut Chart, probs: &mut ProbTable, i: usize, j: usize) {
    let mut entries = Cell::new();
    let mut log_probs = Cell::new();
    for (symbol, (log_prob, entry)) in self.0 {
      log_probs.insert(symbol.clone(), log_prob);
      entries.insert(symbol, entry);
    }
    chart.set_cell(i, j, entries);
    probs.set_cell(i, j, log_probs);
  }
}

/// Viterbi CKY: fills a backpointer chart and a log probability table over
/// every span of the input, bottom-up by span length.
///
/// Each (span, nonterminal) keeps only its highest-probability derivation, for
/// lexical and binary rules alike. Spans nothing derives get an empty cell.
/// Empty input gives tables with no spans.
pub fn parse_chart<S: AsRef<str>>(g: &Grammar, input: &[S]) -> (Chart, ProbTable) {
  let n = input.len();
  let mut chart = Chart::new(n);
  let mut probs = ProbTable::new(n);

  for (i, token) in input.iter().enumerate() {
    let token = token.as_ref();
    let rules = g.lexical_rules(token);
    if rules.is_empty() {
      debug!(token, position = i, "token not covered by any lexical rule");
    }

    let mut best = BestCell::default();
    for rule in rules {
      best.relax(&rule.lhs, rule.log_probability(), || {
        Entry::Leaf(token.to_string())
      });
    }
    best.store(&mut chart, &mut probs, i, i + 1);
  }

  for length in 2..=n {
    for i in 0..=(n - length) {
      let j = i + length;
      let mut best = BestCell::default();

      for k in (i + 1)..j {
        for (left, left_prob) in probs[(i, k)].iter() {
          for (right, right_prob) in probs[(k, j)].iter() {
            for rule in g.binary_rules(left, right) {
              let candidate = rule.log_probability() + left_prob + right_prob;
              best.relax(&rule.lhs, candidate, || {
                Entry::Split(Backpointer::new(left, i, k), Backpointer::new(right, k, j))
              });
            }
          }
        }
      }

      trace!(i, j, found = best.0.len(), "filled span");
      best.store(&mut chart, &mut probs, i, j);
    }
  }

  debug!(tokens = n, entries = chart.num_entries(), "filled chart");
  (chart, probs)
}

#[cfg(test)]
mod tests {
  use super::*;

  const GRAMMAR: &str = r#"
    S ; 1.0
    S -> NP VP ; 1.0
    NP -> the ; 0.5
    NP -> a ; 0.5
    VP -> runs ; 1.0
  "#;

  fn ln(p: f64) -> f64 {
    p.ln()
  }

  #[test]
  fn test_recognize() {
    let g: Grammar = GRAMMAR.parse().unwrap();
    assert!(recognize(&g, &["the", "runs"]));
    assert!(recognize(&g, &["a", "runs"]));
    assert!(!recognize(&g, &["runs", "the"]));
    assert!(!recognize(&g, &["the"]));
    assert!(!recognize(&g, &["the", "runs", "runs"]));
  }

  #[test]
  fn test_unknown_token_rejects() {
    let g: Grammar = GRAMMAR.parse().unwrap();
    assert!(!recognize(&g, &["the", "walks"]));

    let (chart, probs) = parse_chart(&g, &["the", "walks"]);
    assert!(chart[(1, 2)].is_empty());
    assert!(chart[(0, 2)].is_empty());
    assert!(probs[(0, 2)].is_empty());
  }

  #[test]
  fn test_empty_input() {
    let g: Grammar = GRAMMAR.parse().unwrap();
    let empty: [&str; 0] = [];
    assert!(!recognize(&g, &empty));

    let (chart, probs) = parse_chart(&g, &empty);
    assert!(chart.is_empty());
    assert!(probs.is_empty());
  }

  #[test]
  fn test_parse_chart() {
    let g: Grammar = GRAMMAR.parse().unwrap();
    let (chart, probs) = parse_chart(&g, &["the", "runs"]);

    assert_eq!(chart.entry(0, 1, "NP"), Some(&Entry::Leaf("the".to_string())));
    assert_eq!(chart.entry(1, 2, "VP"), Some(&Entry::Leaf("runs".to_string())));
    assert_eq!(
      chart.entry(0, 2, "S"),
      Some(&Entry::Split(
        Backpointer::new("NP", 0, 1),
        Backpointer::new("VP", 1, 2)
      ))
    );
    assert_eq!(probs.entry(0, 2, "S"), Some(&(ln(0.5) + ln(1.0) + ln(1.0))));
    assert_eq!(chart.num_entries(), probs.num_entries());
  }

  #[test]
  fn test_single_token_start() {
    let g: Grammar = "S ; 1.0\nS -> hi ; 1.0".parse().unwrap();
    assert!(recognize(&g, &["hi"]));
    let (chart, probs) = parse_chart(&g, &["hi"]);
    assert_eq!(chart.entry(0, 1, "S"), Some(&Entry::Leaf("hi".to_string())));
    assert_eq!(probs.entry(0, 1, "S"), Some(&0.0));
  }

  #[test]
  fn test_lexical_keeps_maximum() {
    // both orders must agree on the better lexical rule
    for src in [
      "S ; 1\nS -> x ; 0.2\nS -> x ; 0.8",
      "S ; 1\nS -> x ; 0.8\nS -> x ; 0.2",
    ] {
      let g: Grammar = src.parse().unwrap();
      let (_, probs) = parse_chart(&g, &["x"]);
      assert_eq!(probs.entry(0, 1, "S"), Some(&ln(0.8)));
    }
  }

  #[test]
  fn test_binary_keeps_maximum() {
    // S -> B A outscores S -> A B whichever way x x x is split
    let g: Grammar = r#"
      S ; 1.0
      S -> A B ; 0.4
      S -> B A ; 0.6
      A -> x ; 0.5
      A -> A A ; 0.5
      B -> x ; 0.5
      B -> B B ; 0.5
    "#
    .parse()
    .unwrap();
    assert!(g.verify());

    let (chart, probs) = parse_chart(&g, &["x", "x", "x"]);
    // A over x x: 0.5 * 0.5 * 0.5
    assert_eq!(probs.entry(0, 2, "A"), Some(&(ln(0.5) + ln(0.5) + ln(0.5))));
    // S via B A: 0.6 * 0.5 * (0.5^3) beats A B: 0.4 * 0.5 * (0.5^3)
    let s = probs.entry(0, 3, "S").unwrap();
    assert!((s - (ln(0.6) + ln(0.5) + 3.0 * ln(0.5))).abs() < 1e-12);
    match chart.entry(0, 3, "S").unwrap() {
      Entry::Split(l, r) => {
        assert_eq!(l.symbol, "B");
        assert_eq!(r.symbol, "A");
        assert_eq!((l.start, r.end), (0, 3));
        assert_eq!(l.end, r.start);
      }
      other => panic!("expected split, got {:?}", other),
    }
  }

  #[test]
  fn test_duplicate_binary_keeps_maximum() {
    for src in [
      "S ; 1\nS -> A A ; 0.3\nS -> A A ; 0.7\nA -> x ; 1",
      "S ; 1\nS -> A A ; 0.7\nS -> A A ; 0.3\nA -> x ; 1",
    ] {
      let g: Grammar = src.parse().unwrap();
      assert!(g.verify());
      assert_eq!(g.binary_rules("A", "A").len(), 2);

      let (chart, probs) = parse_chart(&g, &["x", "x"]);
      assert_eq!(probs.entry(0, 2, "S"), Some(&ln(0.7)));
      assert_eq!(
        chart.entry(0, 2, "S"),
        Some(&Entry::Split(
          Backpointer::new("A", 0, 1),
          Backpointer::new("A", 1, 2)
        ))
      );
    }
  }

  #[test]
  fn test_every_span_materialized() {
    let g: Grammar = GRAMMAR.parse().unwrap();
    let (chart, probs) = parse_chart(&g, &["runs", "the", "a"]);
    assert_eq!(chart.spans().count(), 6);
    for (i, j) in chart.spans() {
      assert!(chart.get(i, j).is_some());
      assert!(probs.get(i, j).is_some());
    }
    assert!(chart[(0, 3)].is_empty());
  }
}
