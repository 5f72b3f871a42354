// CalibrationProcedure - one channel's calibration pass
//
// Calibration is an explicit state machine per channel:
//
//   Idle --begin--> Calibrating(window) --window full / expiry--> Done
//                        |
//                        +--cancel--> Idle
//
// Each pass carries an id so a waiter can tell its own completion apart
// from a pass that was cancelled and restarted in the meantime.

use crate::calibration::progress::CalibrationProgress;
use crate::calibration::state::CalibrationProfile;
use crate::calibration::window::SampleWindow;
use crate::config::MotionConfig;
use crate::error::CalibrationError;
use crate::sensors::{ChannelId, Sample, Vector3};

/// Window matching the channel's sample shape
#[derive(Debug, Clone)]
enum ChannelWindow {
    Scalar(SampleWindow<f64>),
    Vector(SampleWindow<Vector3>),
}

/// Sample collection for a single calibration pass
#[derive(Debug, Clone)]
pub struct CalibrationProcedure {
    pass_id: u64,
    channel: ChannelId,
    window: ChannelWindow,
}

impl CalibrationProcedure {
    /// Create a procedure collecting `capacity` samples for `channel`
    pub fn new(pass_id: u64, channel: ChannelId, capacity: usize) -> Self {
        let window = match channel {
            ChannelId::Field => ChannelWindow::Scalar(SampleWindow::new(capacity)),
            ChannelId::Motion => ChannelWindow::Vector(SampleWindow::new(capacity)),
        };
        Self {
            pass_id,
            channel,
            window,
        }
    }

    pub fn pass_id(&self) -> u64 {
        self.pass_id
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Add a validated sample to the window
    ///
    /// # Returns
    /// * `true` - Sample stored
    /// * `false` - Window full or sample shape does not match the channel
    pub fn add_sample(&mut self, sample: &Sample) -> bool {
        match (&mut self.window, sample) {
            (ChannelWindow::Scalar(window), Sample::Scalar(value)) => window.collect(*value),
            (ChannelWindow::Vector(window), Sample::Vector(value)) => window.collect(*value),
            _ => false,
        }
    }

    pub fn collected(&self) -> usize {
        match &self.window {
            ChannelWindow::Scalar(w) => w.len(),
            ChannelWindow::Vector(w) => w.len(),
        }
    }

    pub fn capacity(&self) -> usize {
        match &self.window {
            ChannelWindow::Scalar(w) => w.capacity(),
            ChannelWindow::Vector(w) => w.capacity(),
        }
    }

    pub fn is_complete(&self) -> bool {
        match &self.window {
            ChannelWindow::Scalar(w) => w.is_full(),
            ChannelWindow::Vector(w) => w.is_full(),
        }
    }

    pub fn get_progress(&self) -> CalibrationProgress {
        CalibrationProgress::new(self.channel, self.collected(), self.capacity())
    }

    /// Finalize a complete window into a profile
    pub fn finalize(self, motion: &MotionConfig) -> Result<CalibrationProfile, CalibrationError> {
        match self.window {
            ChannelWindow::Scalar(w) => w.finalize().map(CalibrationProfile::Scalar),
            ChannelWindow::Vector(w) => w.finalize(motion).map(CalibrationProfile::Vector),
        }
    }

    /// Finalize whatever was collected; an empty window yields the fallback
    pub fn finalize_partial(self, motion: &MotionConfig) -> CalibrationProfile {
        match self.window {
            ChannelWindow::Scalar(w) => CalibrationProfile::Scalar(w.finalize_partial()),
            ChannelWindow::Vector(w) => CalibrationProfile::Vector(w.finalize_partial(motion)),
        }
    }
}

/// Calibration state of a channel
#[derive(Debug, Clone, Default)]
pub enum CalibrationPhase {
    /// No pass running; the channel classifies with its current profile
    #[default]
    Idle,
    /// Samples are routed to the window only
    Calibrating(CalibrationProcedure),
    /// Pass `pass_id` produced the current profile
    Done { pass_id: u64 },
}

impl CalibrationPhase {
    pub fn is_calibrating(&self) -> bool {
        matches!(self, CalibrationPhase::Calibrating(_))
    }
}

/// What a waiter observes about its pass
#[derive(Debug, Clone, PartialEq)]
pub enum PassStatus {
    Running(CalibrationProgress),
    Completed(CalibrationProfile),
    /// Cancelled, or replaced by a newer pass
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_procedure_collects_and_finalizes() {
        let mut procedure = CalibrationProcedure::new(1, ChannelId::Field, 60);
        for _ in 0..60 {
            assert!(procedure.add_sample(&Sample::Scalar(10.0)));
        }
        assert!(procedure.is_complete());
        assert!(!procedure.add_sample(&Sample::Scalar(10.0)));

        let progress = procedure.get_progress();
        assert_eq!(progress.collected, 60);
        assert_eq!(progress.percentage(), 100);

        let profile = procedure.finalize(&MotionConfig::default()).unwrap();
        let scalar = profile.as_scalar().expect("scalar profile");
        assert_eq!(scalar.thresholds.normal, 25.0);
    }

    #[test]
    fn test_vector_procedure_refuses_scalar_samples() {
        let mut procedure = CalibrationProcedure::new(2, ChannelId::Motion, 3);
        assert!(!procedure.add_sample(&Sample::Scalar(1.0)));
        assert_eq!(procedure.collected(), 0);
        assert!(procedure.add_sample(&Sample::Vector(Vector3::new(0.0, 0.0, 9.8))));
        assert_eq!(procedure.collected(), 1);
    }

    #[test]
    fn test_incomplete_finalize_fails() {
        let mut procedure = CalibrationProcedure::new(3, ChannelId::Field, 60);
        procedure.add_sample(&Sample::Scalar(1.0));
        assert!(matches!(
            procedure.finalize(&MotionConfig::default()),
            Err(CalibrationError::InsufficientSamples { collected: 1, .. })
        ));
    }

    #[test]
    fn test_partial_finalize_uses_collected_samples() {
        let mut procedure = CalibrationProcedure::new(4, ChannelId::Field, 60);
        for _ in 0..5 {
            procedure.add_sample(&Sample::Scalar(20.0));
        }
        let profile = procedure.finalize_partial(&MotionConfig::default());
        let scalar = profile.as_scalar().unwrap();
        assert!(scalar.is_calibrated);
        assert_eq!(scalar.sample_count, 5);
        assert_eq!(scalar.baseline, 20.0);
    }

    #[test]
    fn test_empty_motion_partial_is_fallback() {
        let procedure = CalibrationProcedure::new(5, ChannelId::Motion, 60);
        let profile = procedure.finalize_partial(&MotionConfig::default());
        let vector = profile.as_vector().unwrap();
        assert!(!vector.is_calibrated);
        assert_eq!(vector.gravity_magnitude, 9.8);
    }
}
