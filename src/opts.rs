use crate::tolerance::{Time, Tolerance};

/// Options that control how a time slice resolves boundary ambiguity.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that other
/// frontends (scripts, tests, batch jobs) can construct options programmatically.
///
/// `SliceOpts::default()` includes partially overlapping labels and labels that only touch
/// a boundary, with exact (zero-tolerance) boundary comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceOpts {
    /// Drop a label that starts before the query start.
    pub lstrip: bool,

    /// Drop a label that ends after the query end.
    pub rstrip: bool,

    /// Keep a label whose end coincides with the query start.
    ///
    /// When the query start falls exactly on a boundary shared by two adjacent labels, both
    /// match by default. Setting this to `false` keeps only the label on the inside.
    pub lincl: bool,

    /// Keep a label whose start coincides with the query end.
    pub rincl: bool,

    /// Window used to decide boundary coincidence.
    pub tolerance: Tolerance,
}

impl Default for SliceOpts {
    fn default() -> Self {
        Self {
            lstrip: false,
            rstrip: false,
            lincl: true,
            rincl: true,
            tolerance: Tolerance::default(),
        }
    }
}

impl SliceOpts {
    /// Exclude labels that only partially overlap the query range.
    pub fn strip(mut self, lstrip: bool, rstrip: bool) -> Self {
        self.lstrip = lstrip;
        self.rstrip = rstrip;
        self
    }

    /// Whether labels that only touch the query boundaries are kept.
    pub fn inclusive(mut self, lincl: bool, rincl: bool) -> Self {
        self.lincl = lincl;
        self.rincl = rincl;
        self
    }

    pub fn tol(mut self, tol: Time) -> Self {
        self.tolerance.tol = tol;
        self
    }

    pub fn ltol(mut self, ltol: Time) -> Self {
        self.tolerance.ltol = ltol;
        self
    }

    pub fn rtol(mut self, rtol: Time) -> Self {
        self.tolerance.rtol = rtol;
        self
    }
}
