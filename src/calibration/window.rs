// SampleWindow - fixed-capacity raw sample buffer for one calibration pass
//
// Append-only until full. Once full, further samples are refused (and the
// refusal is reported) rather than overwriting what was collected; a caller
// that needs more samples starts a new window. The window is consumed by
// `finalize`, so a pass can only produce one profile.

use crate::calibration::state::{ScalarProfile, VectorProfile};
use crate::config::MotionConfig;
use crate::error::CalibrationError;
use crate::sensors::Vector3;

/// Default number of samples per calibration window
pub const DEFAULT_WINDOW_SIZE: usize = 60;

#[derive(Debug, Clone)]
pub struct SampleWindow<T> {
    samples: Vec<T>,
    capacity: usize,
}

impl<T: Copy> SampleWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample
    ///
    /// # Returns
    /// * `true` - Sample stored
    /// * `false` - Window already full, sample refused
    pub fn collect(&mut self, raw: T) -> bool {
        if self.is_full() {
            log::debug!(
                "[Calibration] Window full ({}/{}), sample refused",
                self.samples.len(),
                self.capacity
            );
            return false;
        }
        self.samples.push(raw);
        true
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fraction collected, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        (self.samples.len() as f64 / self.capacity as f64).min(1.0)
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    fn ensure_full(&self) -> Result<(), CalibrationError> {
        if self.is_full() {
            Ok(())
        } else {
            Err(CalibrationError::InsufficientSamples {
                required: self.capacity,
                collected: self.samples.len(),
            })
        }
    }
}

impl SampleWindow<f64> {
    /// Produce the scalar profile from a full window
    pub fn finalize(self) -> Result<ScalarProfile, CalibrationError> {
        self.ensure_full()?;
        Ok(ScalarProfile::from_samples(&self.samples))
    }

    /// Produce a profile from whatever was collected; empty means fallback
    pub fn finalize_partial(self) -> ScalarProfile {
        ScalarProfile::from_samples(&self.samples)
    }
}

impl SampleWindow<Vector3> {
    /// Produce the vector profile from a full window
    pub fn finalize(self, motion: &MotionConfig) -> Result<VectorProfile, CalibrationError> {
        self.ensure_full()?;
        Ok(VectorProfile::from_samples(&self.samples, motion))
    }

    pub fn finalize_partial(self, motion: &MotionConfig) -> VectorProfile {
        VectorProfile::from_samples(&self.samples, motion)
    }
}
