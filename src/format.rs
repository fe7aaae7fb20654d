//! Shape checks for charts and probability tables.
//!
//! The parser never calls these. They're for test harnesses and tooling that
//! want to confirm a table has the documented layout: leaves over single
//! tokens, splits that divide their span and point at filled entries, and log
//! probabilities that are never positive.

use tracing::warn;

use crate::chart::{Chart, Entry, ProbTable, SpanTable};
use crate::error::FormatError;

pub fn check_chart(chart: &Chart) -> Result<(), FormatError> {
  for ((i, j), cell) in chart.iter() {
    for (symbol, entry) in cell.iter() {
      if entry.fits(i, j) {
        if let Entry::Split(l, r) = entry {
          for child in [l, r] {
            if chart.entry(child.start, child.end, &child.symbol).is_none() {
              return Err(FormatError::DanglingBackpointer {
                span: (i, j),
                symbol: symbol.clone(),
                child: child.to_string(),
              });
            }
          }
        }
      } else if entry.is_leaf() {
        return Err(FormatError::WideLeaf {
          span: (i, j),
          symbol: symbol.clone(),
        });
      } else {
        return Err(FormatError::BadSplit {
          span: (i, j),
          symbol: symbol.clone(),
        });
      }
    }
  }
  Ok(())
}

pub fn check_probs(probs: &ProbTable) -> Result<(), FormatError> {
  for ((i, j), cell) in probs.iter() {
    for (symbol, &value) in cell.iter() {
      if value > 0.0 || value.is_nan() {
        return Err(FormatError::BadLogProbability {
          span: (i, j),
          symbol: symbol.clone(),
          value,
        });
      }
    }
  }
  Ok(())
}

/// Both tables cover the same input and hold the same nonterminals in every cell
pub fn check_synchronized<T, U>(
  chart: &SpanTable<T>,
  probs: &SpanTable<U>,
) -> Result<(), FormatError> {
  for ((i, j), cell) in chart.iter() {
    let other = probs.get(i, j);
    for symbol in cell.keys() {
      if other.is_none_or(|c| !c.contains_key(symbol)) {
        return Err(FormatError::Unsynchronized {
          span: (i, j),
          symbol: symbol.clone(),
        });
      }
    }
  }
  for ((i, j), cell) in probs.iter() {
    let other = chart.get(i, j);
    for symbol in cell.keys() {
      if other.is_none_or(|c| !c.contains_key(symbol)) {
        return Err(FormatError::Unsynchronized {
          span: (i, j),
          symbol: symbol.clone(),
        });
      }
    }
  }
  Ok(())
}

/// Like [`check_chart`], logging the problem instead of returning it
pub fn check_table_format(chart: &Chart) -> bool {
  match check_chart(chart) {
    Ok(()) => true,
    Err(error) => {
      warn!(%error, "bad backpointer table");
      false
    }
  }
}

/// Like [`check_probs`], logging the problem instead of returning it
pub fn check_probs_format(probs: &ProbTable) -> bool {
  match check_probs(probs) {
    Ok(()) => true,
    Err(error) => {
      warn!(%error, "bad probability table");
      false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::chart::Backpointer;

  fn she_runs() -> (Chart, ProbTable) {
    let mut chart: Chart = SpanTable::new(2);
    let mut probs: ProbTable = SpanTable::new(2);
    chart.insert(0, 1, "NP", Entry::Leaf("she".to_string()));
    chart.insert(1, 2, "VP", Entry::Leaf("runs".to_string()));
    chart.insert(
      0,
      2,
      "S",
      Entry::Split(Backpointer::new("NP", 0, 1), Backpointer::new("VP", 1, 2)),
    );
    probs.insert(0, 1, "NP", 0.5f64.ln());
    probs.insert(1, 2, "VP", 0.0);
    probs.insert(0, 2, "S", 0.5f64.ln());
    (chart, probs)
  }

  #[test]
  fn test_well_formed() {
    let (chart, probs) = she_runs();
    assert!(check_chart(&chart).is_ok());
    assert!(check_probs(&probs).is_ok());
    assert!(check_synchronized(&chart, &probs).is_ok());
    assert!(check_table_format(&chart));
    assert!(check_probs_format(&probs));
  }

  #[test]
  fn test_wide_leaf() {
    let (mut chart, _) = she_runs();
    chart.insert(0, 2, "NP", Entry::Leaf("she runs".to_string()));
    assert_eq!(
      check_chart(&chart),
      Err(FormatError::WideLeaf {
        span: (0, 2),
        symbol: "NP".to_string()
      })
    );
    assert!(!check_table_format(&chart));
  }

  #[test]
  fn test_bad_split() {
    let (mut chart, _) = she_runs();
    chart.insert(
      0,
      2,
      "S",
      Entry::Split(Backpointer::new("NP", 0, 1), Backpointer::new("VP", 0, 2)),
    );
    assert!(matches!(
      check_chart(&chart),
      Err(FormatError::BadSplit { .. })
    ));
  }

  #[test]
  fn test_dangling() {
    let (mut chart, _) = she_runs();
    chart.get_mut(0, 1).unwrap().clear();
    assert!(matches!(
      check_chart(&chart),
      Err(FormatError::DanglingBackpointer { .. })
    ));
  }

  #[test]
  fn test_positive_log_probability() {
    let (_, mut probs) = she_runs();
    probs.insert(0, 1, "NP", 0.1);
    assert!(matches!(
      check_probs(&probs),
      Err(FormatError::BadLogProbability { .. })
    ));
    probs.insert(0, 1, "NP", f64::NAN);
    assert!(!check_probs_format(&probs));
  }

  #[test]
  fn test_unsynchronized() {
    let (chart, mut probs) = she_runs();
    probs.get_mut(0, 2).unwrap().clear();
    assert_eq!(
      check_synchronized(&chart, &probs),
      Err(FormatError::Unsynchronized {
        span: (0, 2),
        symbol: "S".to_string()
      })
    );

    let (chart, mut probs) = she_runs();
    probs.insert(1, 2, "NP", -1.0);
    assert!(check_synchronized(&chart, &probs).is_err());
  }
}
