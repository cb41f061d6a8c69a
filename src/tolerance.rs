//! Approximate comparison of time values.
//!
//! Independently produced tiers rarely agree to the last bit on shared boundaries (a word
//! boundary written by one tool at `1.0` may come back from another at `0.99999999`). Every
//! time-based query routes its "is this the same instant?" decision through here.

/// Seconds.
pub type Time = f64;

/// Whether `a` and `b` lie within `tol` of each other.
///
/// A negative `tol` is treated as zero, so the comparison degrades to exact equality.
/// NaN input compares unequal to everything and never panics.
pub fn approx_eq(a: Time, b: Time, tol: Time) -> bool {
    (a - b).abs() <= clamp(tol)
}

/// A symmetric tolerance with independent left/right adjustments.
///
/// The effective window on each side is `tol + ltol` (left) and `tol + rtol` (right).
/// Adjustments may be negative to tighten `tol`; a window that would end up negative is
/// clamped to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tolerance {
    pub tol: Time,
    pub ltol: Time,
    pub rtol: Time,
}

impl Tolerance {
    /// A symmetric tolerance with no per-side adjustment.
    pub fn new(tol: Time) -> Self {
        Self {
            tol,
            ..Self::default()
        }
    }

    /// Effective tolerance applied at the left (start) edge of a range.
    pub fn left(&self) -> Time {
        clamp(self.tol + self.ltol)
    }

    /// Effective tolerance applied at the right (end) edge of a range.
    pub fn right(&self) -> Time {
        clamp(self.tol + self.rtol)
    }

    /// Whether `time` coincides with the left edge `edge`.
    pub fn at_left(&self, time: Time, edge: Time) -> bool {
        approx_eq(time, edge, self.left())
    }

    /// Whether `time` coincides with the right edge `edge`.
    pub fn at_right(&self, time: Time, edge: Time) -> bool {
        approx_eq(time, edge, self.right())
    }
}

// NaN falls through to zero as well: `f64::max` returns the non-NaN operand.
fn clamp(tol: Time) -> Time {
    tol.max(0.0)
}
