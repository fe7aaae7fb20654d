use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// Per-span map from nonterminal to whatever the table stores for it.
/// Ordered, so iteration (and tie-breaking in the parser) is deterministic.
pub type Cell<T> = BTreeMap<String, T>;

/// Reference to the best derivation of `symbol` over `start..end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backpointer {
  pub symbol: String,
  pub start: usize,
  pub end: usize,
}

impl Backpointer {
  pub fn new(symbol: impl Into<String>, start: usize, end: usize) -> Self {
    Self {
      symbol: symbol.into(),
      start,
      end,
    }
  }

  pub fn span(&self) -> (usize, usize) {
    (self.start, self.end)
  }
}

impl fmt::Display for Backpointer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {}, {})", self.symbol, self.start, self.end)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
  /// The token a lexical rule rewrote to. Only on spans of length 1.
  Leaf(String),
  /// Left child over `i..k`, right child over `k..j`
  Split(Backpointer, Backpointer),
}

impl Entry {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_split(&self) -> bool {
    matches!(self, Self::Split(_, _))
  }

  /// Whether this entry can sit at `i..j`: leaves cover one token, and
  /// splits divide the span at a point strictly inside it.
  pub fn fits(&self, i: usize, j: usize) -> bool {
    match self {
      Self::Leaf(_) => j == i + 1,
      Self::Split(l, r) => {
        l.start == i && l.end == r.start && r.end == j && i < l.end && l.end < j
      }
    }
  }
}

impl fmt::Display for Entry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(w) => write!(f, "{:?}", w),
      Self::Split(l, r) => write!(f, "{} {}", l, r),
    }
  }
}

/// A triangular table with one cell for every span `i..j`, `0 <= i < j <= len`.
///
/// Every cell is allocated up front, so an empty cell ("nothing derives this
/// span") is distinguishable from a span that's out of range (`get` returns None).
/// Cells are stored row by row: all spans starting at 0, then at 1, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanTable<T> {
  len: usize,
  cells: Vec<Cell<T>>,
}

/// Backpointer table
pub type Chart = SpanTable<Entry>;

/// Log probability of the best derivation for each (span, nonterminal)
pub type ProbTable = SpanTable<f64>;

impl<T> SpanTable<T> {
  /// Allocates an empty cell for every span over `len` tokens
  pub fn new(len: usize) -> Self {
    let cells = (0..len * (len + 1) / 2).map(|_| Cell::new()).collect();
    Self { len, cells }
  }

  /// The number of tokens the table covers
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn contains_span(&self, i: usize, j: usize) -> bool {
    i < j && j <= self.len
  }

  fn index_of(&self, i: usize, j: usize) -> Option<usize> {
    if self.contains_span(i, j) {
      // row i starts after the n + (n-1) + ... + (n-i+1) cells of earlier rows
      Some(i * (2 * self.len - i + 1) / 2 + (j - i - 1))
    } else {
      None
    }
  }

  pub fn get(&self, i: usize, j: usize) -> Option<&Cell<T>> {
    self.index_of(i, j).map(|idx| &self.cells[idx])
  }

  pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut Cell<T>> {
    self.index_of(i, j).map(move |idx| &mut self.cells[idx])
  }

  /// The value stored for `symbol` over `i..j`, if any
  pub fn entry(&self, i: usize, j: usize, symbol: &str) -> Option<&T> {
    self.get(i, j).and_then(|cell| cell.get(symbol))
  }

  /// Sets the value for `symbol` over `i..j`, returning the previous one.
  ///
  /// # Panics
  /// If `i..j` isn't a span of this table.
  pub fn insert(&mut self, i: usize, j: usize, symbol: impl Into<String>, value: T) -> Option<T> {
    let len = self.len;
    self
      .get_mut(i, j)
      .unwrap_or_else(|| panic!("span {}..{} out of range for length {}", i, j, len))
      .insert(symbol.into(), value)
  }

  /// Replaces the whole cell for `i..j`.
  ///
  /// # Panics
  /// If `i..j` isn't a span of this table.
  pub fn set_cell(&mut self, i: usize, j: usize, cell: Cell<T>) {
    let len = self.len;
    *self
      .get_mut(i, j)
      .unwrap_or_else(|| panic!("span {}..{} out of range for length {}", i, j, len)) = cell;
  }

  /// All spans, in storage order
  pub fn spans(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
    (0..self.len).flat_map(move |i| (i + 1..=self.len).map(move |j| (i, j)))
  }

  pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Cell<T>)> + '_ {
    self.spans().zip(self.cells.iter())
  }

  /// Total number of (span, nonterminal) entries
  pub fn num_entries(&self) -> usize {
    self.cells.iter().map(|c| c.len()).sum()
  }
}

impl<T> Index<(usize, usize)> for SpanTable<T> {
  type Output = Cell<T>;

  fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
    self
      .get(i, j)
      .unwrap_or_else(|| panic!("span {}..{} out of range for length {}", i, j, self.len))
  }
}

impl<T> fmt::Display for SpanTable<T>
where
  T: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for ((i, j), cell) in self.iter() {
      if cell.is_empty() {
        continue;
      }
      writeln!(f, "{}..{}:", i, j)?;
      for (symbol, value) in cell.iter() {
        writeln!(f, "  {}: {}", symbol, value)?;
      }
    }
    Ok(())
  }
}
