// Calibration module - baseline collection and threshold derivation
//
// This module provides the calibration components:
// 1. SampleWindow: fixed-size raw sample buffer for one pass
// 2. CalibrationProfile: baseline statistics and thresholds per channel
// 3. CalibrationProcedure / CalibrationPhase: the per-channel pass state machine
//
// The calibration workflow:
// 1. Begin a pass (resetting the channel's smoothing state)
// 2. Collect `window_size` raw samples while the device is at rest
// 3. Finalize the window into a profile that replaces the previous one

pub mod procedure;
pub mod progress;
pub mod state;
pub mod validation;
pub mod window;

pub use procedure::{CalibrationPhase, CalibrationProcedure, PassStatus};
pub use progress::CalibrationProgress;
pub use state::{CalibrationProfile, ScalarProfile, TierThresholds, VectorProfile};
pub use validation::SampleValidator;
pub use window::{SampleWindow, DEFAULT_WINDOW_SIZE};
