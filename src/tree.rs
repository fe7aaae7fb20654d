use crate::chart::{Chart, Entry};
use crate::error::LookupError;
use crate::syntree::{ParseTree, SynTree};

/// Rebuilds the best tree for `symbol` over `i..j` by following backpointers.
///
/// The tree owns its strings and doesn't borrow from the chart, so the chart
/// can be dropped or used for more extractions afterwards. Recursion depth is
/// bounded by the span length since every split strictly shrinks the span.
pub fn extract_tree(
  chart: &Chart,
  i: usize,
  j: usize,
  symbol: &str,
) -> Result<ParseTree, LookupError> {
  let entry = chart.entry(i, j, symbol).ok_or_else(|| LookupError::Missing {
    span: (i, j),
    symbol: symbol.to_string(),
  })?;

  match entry {
    Entry::Leaf(word) => Ok(SynTree::leaf(symbol.to_string(), (i, j), word.clone())),
    Entry::Split(l, r) => {
      if !entry.fits(i, j) {
        return Err(LookupError::BadSplit {
          span: (i, j),
          symbol: symbol.to_string(),
        });
      }
      let left = extract_tree(chart, l.start, l.end, &l.symbol)?;
      let right = extract_tree(chart, r.start, r.end, &r.symbol)?;
      Ok(SynTree::branch(symbol.to_string(), left, right))
    }
  }
}
