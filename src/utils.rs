use std::error::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// Relative and absolute tolerance used when comparing probability sums.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
  pub rel: f64,
  pub abs: f64,
}

impl Default for Tolerance {
  fn default() -> Self {
    Self {
      rel: 1e-9,
      abs: 1e-9,
    }
  }
}

/// Checks if two floats are close, the same way as python's `math.isclose`:
/// `|a - b| <= max(rel * max(|a|, |b|), abs)`
///
/// ```
/// use pcfg_cky::utils::{is_close, Tolerance};
///
/// assert!(is_close(0.1 + 0.2, 0.3, Tolerance::default()));
/// assert!(!is_close(0.9, 1.0, Tolerance::default()));
/// ```
pub fn is_close(a: f64, b: f64, tol: Tolerance) -> bool {
  if a == b {
    return true;
  }
  if !a.is_finite() || !b.is_finite() {
    return false;
  }
  let diff = (a - b).abs();
  diff <= (tol.rel * a.abs().max(b.abs())).max(tol.abs)
}

#[test]
fn test_is_close() {
  let tol = Tolerance::default();
  assert!(is_close(1.0, 1.0, tol));
  assert!(is_close(0.3 + 0.3 + 0.4, 1.0, tol));
  assert!(is_close(0.0, 1e-10, tol));
  assert!(!is_close(1.0, 1.0 + 1e-6, tol));
  assert!(!is_close(f64::NAN, f64::NAN, tol));
  assert!(!is_close(f64::INFINITY, 1.0, tol));

  let loose = Tolerance { rel: 0.01, abs: 0.0 };
  assert!(is_close(0.995, 1.0, loose));
}
