// Calibration profiles - baseline statistics and classification thresholds
//
// A profile is computed once per calibration pass from a filled sample
// window and replaces the previous profile as a whole.
//
// Scalar thresholds are `baseline + max(k * stddev, floor)` with
// k = 3 / 5 / 7 and floors 15 / 35 / 60. The floors keep the three bands
// apart when the sensor is perfectly steady (zero deviation). An empty window
// falls back to fixed thresholds {25, 50, 75} flagged as uncalibrated.

use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;
use crate::sensors::{ChannelId, Vector3};

/// Sigma multipliers for the normal / elevated / anomaly thresholds
pub const SIGMA_MULTIPLIERS: [f64; 3] = [3.0, 5.0, 7.0];

/// Minimum offsets above baseline for the normal / elevated / anomaly thresholds
pub const THRESHOLD_FLOORS: [f64; 3] = [15.0, 35.0, 60.0];

/// Thresholds used when the field sensor never reported
pub const FALLBACK_THRESHOLDS: TierThresholds = TierThresholds {
    normal: 25.0,
    elevated: 50.0,
    anomaly: 75.0,
};

/// Deviation threshold used when the configured one is unusable
pub const FALLBACK_DEVIATION_THRESHOLD: f64 = 5.0;

/// Ordered scalar thresholds; `normal < elevated < anomaly` always holds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub normal: f64,
    pub elevated: f64,
    pub anomaly: f64,
}

impl TierThresholds {
    /// Derive the three thresholds from baseline statistics
    pub fn from_statistics(baseline: f64, std_dev: f64) -> Self {
        let offset = |idx: usize| (SIGMA_MULTIPLIERS[idx] * std_dev).max(THRESHOLD_FLOORS[idx]);
        Self {
            normal: baseline + offset(0),
            elevated: baseline + offset(1),
            anomaly: baseline + offset(2),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.normal < self.elevated && self.elevated < self.anomaly
    }
}

/// Profile for the scalar field channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarProfile {
    pub baseline: f64,
    pub standard_deviation: f64,
    pub thresholds: TierThresholds,
    /// False when the thresholds are the fixed fallback
    pub is_calibrated: bool,
    pub sample_count: usize,
}

impl ScalarProfile {
    /// Fallback profile for a channel that never reported
    pub fn new_default() -> Self {
        Self {
            baseline: 0.0,
            standard_deviation: 0.0,
            thresholds: FALLBACK_THRESHOLDS,
            is_calibrated: false,
            sample_count: 0,
        }
    }

    /// Compute baseline, population deviation, and thresholds
    ///
    /// An empty slice yields the fallback profile.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::new_default();
        }

        let (baseline, standard_deviation) = mean_and_std_dev(samples);
        let thresholds = TierThresholds::from_statistics(baseline, standard_deviation);
        if !thresholds.is_ordered() {
            log::warn!(
                "[Calibration] Window statistics unusable (baseline {}, std dev {}), using fallback thresholds",
                baseline,
                standard_deviation
            );
            return Self::new_default();
        }

        Self {
            baseline,
            standard_deviation,
            thresholds,
            is_calibrated: true,
            sample_count: samples.len(),
        }
    }
}

/// Profile for the tri-axis motion channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorProfile {
    /// Component-wise mean at rest
    pub baseline: Vector3,
    /// Norm of the baseline; the rest-state reference
    pub gravity_magnitude: f64,
    /// Deviation of the sample magnitudes (no per-axis deviation)
    pub standard_deviation: f64,
    /// Allowed deviation from `gravity_magnitude` before an anomaly
    pub deviation_threshold: f64,
    pub is_calibrated: bool,
    pub sample_count: usize,
}

impl VectorProfile {
    /// Fallback profile: rest magnitude defaults to standard gravity
    pub fn new_default(motion: &MotionConfig) -> Self {
        Self {
            baseline: Vector3::ZERO,
            gravity_magnitude: motion.default_gravity,
            standard_deviation: 0.0,
            deviation_threshold: deviation_threshold(motion),
            is_calibrated: false,
            sample_count: 0,
        }
    }

    pub fn from_samples(samples: &[Vector3], motion: &MotionConfig) -> Self {
        if samples.is_empty() {
            return Self::new_default(motion);
        }

        let n = samples.len() as f64;
        let sum = samples.iter().fold(Vector3::ZERO, |acc, s| {
            Vector3::new(acc.x + s.x, acc.y + s.y, acc.z + s.z)
        });
        let baseline = Vector3::new(sum.x / n, sum.y / n, sum.z / n);

        let magnitudes: Vec<f64> = samples.iter().map(Vector3::magnitude).collect();
        let (_, standard_deviation) = mean_and_std_dev(&magnitudes);
        let gravity_magnitude = baseline.magnitude();
        if !gravity_magnitude.is_finite() || !standard_deviation.is_finite() {
            log::warn!(
                "[Calibration] Motion window statistics overflowed, using default gravity {}",
                motion.default_gravity
            );
            return Self::new_default(motion);
        }

        Self {
            baseline,
            gravity_magnitude,
            standard_deviation,
            deviation_threshold: deviation_threshold(motion),
            is_calibrated: true,
            sample_count: samples.len(),
        }
    }
}

/// Per-channel calibration result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationProfile {
    Scalar(ScalarProfile),
    Vector(VectorProfile),
}

impl CalibrationProfile {
    /// Fallback profile for a channel
    pub fn fallback(channel: ChannelId, motion: &MotionConfig) -> Self {
        match channel {
            ChannelId::Field => CalibrationProfile::Scalar(ScalarProfile::new_default()),
            ChannelId::Motion => CalibrationProfile::Vector(VectorProfile::new_default(motion)),
        }
    }

    pub fn is_calibrated(&self) -> bool {
        match self {
            CalibrationProfile::Scalar(p) => p.is_calibrated,
            CalibrationProfile::Vector(p) => p.is_calibrated,
        }
    }

    pub fn sample_count(&self) -> usize {
        match self {
            CalibrationProfile::Scalar(p) => p.sample_count,
            CalibrationProfile::Vector(p) => p.sample_count,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarProfile> {
        match self {
            CalibrationProfile::Scalar(p) => Some(p),
            CalibrationProfile::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorProfile> {
        match self {
            CalibrationProfile::Vector(p) => Some(p),
            CalibrationProfile::Scalar(_) => None,
        }
    }
}

fn deviation_threshold(motion: &MotionConfig) -> f64 {
    if motion.deviation_threshold.is_finite() && motion.deviation_threshold > 0.0 {
        motion.deviation_threshold
    } else {
        log::warn!(
            "[Calibration] Motion deviation threshold {} unusable, using {}",
            motion.deviation_threshold,
            FALLBACK_DEVIATION_THRESHOLD
        );
        FALLBACK_DEVIATION_THRESHOLD
    }
}

/// Mean and population standard deviation (divide by N)
///
/// Deviations are scaled by the largest one before squaring, so finite
/// inputs never square past `f64::MAX`.
fn mean_and_std_dev(samples: &[f64]) -> (f64, f64) {
    let n = samples.len() as f64;
    let sum = samples.iter().sum::<f64>();
    let mean = if sum.is_finite() {
        sum / n
    } else {
        samples.iter().map(|v| v / n).sum::<f64>()
    };

    let scale = samples
        .iter()
        .map(|v| (v - mean).abs())
        .fold(0.0_f64, f64::max);
    if scale == 0.0 || !scale.is_finite() {
        return (mean, scale);
    }
    let scaled_variance = samples
        .iter()
        .map(|v| ((v - mean) / scale).powi(2))
        .sum::<f64>()
        / n;
    (mean, scale * scaled_variance.sqrt())
}
