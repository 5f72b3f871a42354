// SmoothingFilter - single-value exponential smoothing
//
// Recursive low-pass filter: the newest sample is weighted by `alpha`
// against the previous smoothed value. State is unset until the first sample,
// which seeds the filter directly so a reset never produces a transient
// towards zero.

use crate::error::PipelineError;

/// Exponential smoothing accumulator for one scalar signal
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingFilter {
    alpha: f64,
    current: Option<f64>,
}

impl SmoothingFilter {
    /// Create a filter with a fixed smoothing coefficient
    ///
    /// # Arguments
    /// * `alpha` - Weight of the newest sample, in (0, 1]; 1 disables smoothing
    ///
    /// # Returns
    /// * `Err(PipelineError::InvalidParameter)` - alpha outside (0, 1]
    pub fn new(alpha: f64) -> Result<Self, PipelineError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(PipelineError::InvalidParameter {
                name: "alpha".to_string(),
                value: alpha,
            });
        }
        Ok(Self {
            alpha,
            current: None,
        })
    }

    /// Feed one raw value and return the smoothed estimate
    pub fn filter(&mut self, raw: f64) -> f64 {
        let next = match self.current {
            None => raw,
            Some(previous) => self.alpha * raw + (1.0 - self.alpha) * previous,
        };
        self.current = Some(next);
        next
    }

    /// Clear the accumulator; the next sample seeds the filter
    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_passes_through() {
        let mut filter = SmoothingFilter::new(0.3).unwrap();
        assert_eq!(filter.filter(42.0), 42.0);
        assert_eq!(filter.current, Some(42.0));
    }

    #[test]
    fn test_weighted_update() {
        let mut filter = SmoothingFilter::new(0.3).unwrap();
        filter.filter(10.0);
        // 0.3 * 20 + 0.7 * 10 = 13
        assert!((filter.filter(20.0) - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_reset_then_filter_returns_input() {
        let mut filter = SmoothingFilter::new(0.4).unwrap();
        for value in [1.0, 50.0, -7.5, 1e6] {
            filter.filter(value);
        }
        filter.reset();
        assert_eq!(filter.current, None);
        assert_eq!(filter.filter(-3.25), -3.25);
    }

    #[test]
    fn test_constant_input_converges_monotonically() {
        for alpha in [0.05, 0.3, 0.5, 0.99, 1.0] {
            let mut filter = SmoothingFilter::new(alpha).unwrap();
            filter.filter(0.0);
            let mut last_gap = f64::INFINITY;
            for _ in 0..500 {
                let gap = (100.0 - filter.filter(100.0)).abs();
                assert!(gap <= last_gap, "alpha {} diverged", alpha);
                last_gap = gap;
            }
            assert!(last_gap < 1e-6, "alpha {} did not converge: {}", alpha, last_gap);
        }
    }

    #[test]
    fn test_output_stays_within_input_range() {
        let inputs = [12.0, 80.0, 3.0, 55.0, 41.0, 79.0, 5.0];
        let mut filter = SmoothingFilter::new(0.3).unwrap();
        for value in inputs {
            let out = filter.filter(value);
            assert!((3.0..=80.0).contains(&out));
        }
    }

    #[test]
    fn test_alpha_one_tracks_input() {
        let mut filter = SmoothingFilter::new(1.0).unwrap();
        filter.filter(5.0);
        assert_eq!(filter.filter(9.0), 9.0);
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        assert!(SmoothingFilter::new(0.0).is_err());
        assert!(SmoothingFilter::new(-0.1).is_err());
        assert!(SmoothingFilter::new(1.01).is_err());
        assert!(SmoothingFilter::new(f64::NAN).is_err());
    }
}
