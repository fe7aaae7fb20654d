use std::fmt;

/// A nonterminal node and the token span `start..end` it covers
#[derive(Debug, PartialEq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

impl<T: fmt::Display> fmt::Display for Constituent<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (start, end) = self.span;
    write!(f, "{}..{}: {}", start, end, self.value)
  }
}

/// An input token under a preterminal, always spanning `i..i + 1`
#[derive(Debug, PartialEq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

/// A binary parse tree: every branch has exactly two children, and every
/// leaf is a preterminal over a single word.
#[derive(Debug, PartialEq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Box<SynTree<T, U>>, Box<SynTree<T, U>>),
  Leaf(Constituent<T>, Word<U>),
}

/// Parse tree over nonterminal and token strings
pub type ParseTree = SynTree<String, String>;

impl<T, U> SynTree<T, U> {
  pub fn leaf(value: T, span: (usize, usize), word: U) -> Self {
    Self::Leaf(Constituent { value, span }, Word { value: word, span })
  }

  pub fn branch(value: T, left: Self, right: Self) -> Self {
    let span = (left.span().0, right.span().1);
    Self::Branch(Constituent { value, span }, Box::new(left), Box::new(right))
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_, _))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _, _))
  }

  pub fn constituent(&self) -> &Constituent<T> {
    match self {
      Self::Branch(c, _, _) | Self::Leaf(c, _) => c,
    }
  }

  /// The nonterminal at the root
  pub fn value(&self) -> &T {
    &self.constituent().value
  }

  pub fn span(&self) -> (usize, usize) {
    self.constituent().span
  }

  pub fn get_leaf(&self) -> Option<&Word<U>> {
    match self {
      Self::Leaf(_, w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &SynTree<T, U>, &SynTree<T, U>)> {
    match self {
      Self::Branch(c, l, r) => Some((c, &**l, &**r)),
      _ => None,
    }
  }

  /// The words under this tree, left to right
  pub fn words(&self) -> Vec<&U> {
    let mut words = Vec::new();
    self.collect_words(&mut words);
    words
  }

  fn collect_words<'a>(&'a self, words: &mut Vec<&'a U>) {
    match self {
      Self::Leaf(_, w) => words.push(&w.value),
      Self::Branch(_, l, r) => {
        l.collect_words(words);
        r.collect_words(words);
      }
    }
  }

  /// Number of nodes on the longest root-to-word path, counting preterminals
  pub fn height(&self) -> usize {
    match self {
      Self::Leaf(_, _) => 1,
      Self::Branch(_, l, r) => 1 + l.height().max(r.height()),
    }
  }
}

impl<T, U> SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  /// Single-line bracketed form without spans, e.g. `(S (NP she) (VP runs))`
  pub fn bracketed(&self) -> String {
    match self {
      Self::Leaf(c, w) => format!("({} {})", c.value, w.value),
      Self::Branch(c, l, r) => format!("({} {} {})", c.value, l.bracketed(), r.bracketed()),
    }
  }
}

impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(c, w) => write!(f, "({} {})", c, w.value),
      Self::Branch(c, l, r) => {
        write!(f, "({}", c)?;
        for t in [l, r] {
          let fmt = format!("{}", t);
          for line in fmt.lines() {
            write!(f, "\n  {}", line)?;
          }
        }
        write!(f, ")")
      }
    }
  }
}
