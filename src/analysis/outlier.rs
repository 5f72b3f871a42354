/// Default k for the k-sigma rule
pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;

/// True when `value` lies more than `k` standard deviations from `baseline`.
///
/// A zero (or non-finite) deviation carries no dispersion information, so
/// every value is accepted.
pub fn is_outlier(value: f64, baseline: f64, std_dev: f64, k: f64) -> bool {
    if std_dev == 0.0 || !std_dev.is_finite() {
        return false;
    }
    (value - baseline).abs() > k * std_dev
}

/// k-sigma rejection bound to a fixed multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierGuard {
    k: f64,
}

impl OutlierGuard {
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    pub fn is_outlier(&self, value: f64, baseline: f64, std_dev: f64) -> bool {
        is_outlier(value, baseline, std_dev, self.k)
    }
}

impl Default for OutlierGuard {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLIER_SIGMA)
    }
}
