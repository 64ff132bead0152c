use itertools::Itertools;

/// Prevent the inner value from being verbosely / pretty printed during a debug.
pub(crate) struct NoPrettyPrint<T: std::fmt::Debug>(pub T);

impl<T: std::fmt::Debug> NoPrettyPrint<T> {
    pub const fn new(t: T) -> Self {
        Self(t)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for NoPrettyPrint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Prevent "{:#?}" from being used.
        write!(f, "{:?}", self.0)
    }
}

/// Compact rendering of per-datum assignments, `X` for unassigned.
pub(crate) fn assignment_string(assn: &[Option<usize>]) -> String {
    assn.iter()
        .map(|x| x.map_or_else(|| "X".to_string(), |x| x.to_string()))
        .join(",")
}

/// Log probabilities of choosing each of two options with unnormalized log
/// weights `a` and `b`, or `None` when neither carries finite mass.
pub(crate) fn ln_normalize_pair(a: f64, b: f64) -> Option<(f64, f64)> {
    if a.is_nan() || b.is_nan() {
        return None;
    }
    let max = a.max(b);
    if !max.is_finite() {
        return None;
    }
    let ln_total = max + ((a - max).exp() + (b - max).exp()).ln();
    Some((a - ln_total, b - ln_total))
}
