// Calibration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Calibration error code constants
///
/// Single source of truth for calibration error codes reported by the CLI
/// and by collaborators.
///
/// Error code range: 2001-2007 (2002 and 2005 retired)
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// Calibration window was finalized before it filled
    pub const INSUFFICIENT_SAMPLES: i32 = 2001;

    /// Calibration already in progress
    pub const ALREADY_IN_PROGRESS: i32 = 2003;

    /// Channel state mutex was poisoned
    pub const STATE_POISONED: i32 = 2004;

    /// No sensor sample arrived before the calibration timeout
    pub const NO_SENSOR_DATA: i32 = 2006;

    /// Calibration pass was cancelled
    pub const CANCELLED: i32 = 2007;
}

/// Log a calibration error with structured context
///
/// This function logs calibration errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, component=Calibrator, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Calibration-related errors
///
/// None of these are fatal: the channel keeps running on fallback
/// thresholds whenever a pass fails.
///
/// Error code ranges: 2001-2007
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Window finalized with fewer samples than its capacity
    InsufficientSamples { required: usize, collected: usize },

    /// Calibration already in progress
    AlreadyInProgress,

    /// Channel state mutex was poisoned
    StatePoisoned,

    /// Sensor never reported during the calibration window
    NoSensorData { waited_ms: u64 },

    /// Calibration pass was cancelled before completion
    Cancelled,
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::InsufficientSamples { .. } => {
                CalibrationErrorCodes::INSUFFICIENT_SAMPLES
            }
            CalibrationError::AlreadyInProgress => CalibrationErrorCodes::ALREADY_IN_PROGRESS,
            CalibrationError::StatePoisoned => CalibrationErrorCodes::STATE_POISONED,
            CalibrationError::NoSensorData { .. } => CalibrationErrorCodes::NO_SENSOR_DATA,
            CalibrationError::Cancelled => CalibrationErrorCodes::CANCELLED,
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::InsufficientSamples {
                required,
                collected,
            } => {
                format!("Insufficient samples: need {}, got {}", required, collected)
            }
            CalibrationError::AlreadyInProgress => "Calibration already in progress".to_string(),
            CalibrationError::StatePoisoned => "Channel state lock poisoned".to_string(),
            CalibrationError::NoSensorData { waited_ms } => {
                format!("No sensor data received within {} ms", waited_ms)
            }
            CalibrationError::Cancelled => "Calibration cancelled".to_string(),
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CalibrationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_error_codes() {
        assert_eq!(
            CalibrationError::InsufficientSamples {
                required: 60,
                collected: 3
            }
            .code(),
            CalibrationErrorCodes::INSUFFICIENT_SAMPLES
        );
        assert_eq!(
            CalibrationError::AlreadyInProgress.code(),
            CalibrationErrorCodes::ALREADY_IN_PROGRESS
        );
        assert_eq!(
            CalibrationError::StatePoisoned.code(),
            CalibrationErrorCodes::STATE_POISONED
        );
        assert_eq!(
            CalibrationError::NoSensorData { waited_ms: 10 }.code(),
            CalibrationErrorCodes::NO_SENSOR_DATA
        );
        assert_eq!(
            CalibrationError::Cancelled.code(),
            CalibrationErrorCodes::CANCELLED
        );
    }

    #[test]
    fn test_calibration_error_messages() {
        let err = CalibrationError::InsufficientSamples {
            required: 60,
            collected: 3,
        };
        assert_eq!(err.message(), "Insufficient samples: need 60, got 3");

        let err = CalibrationError::AlreadyInProgress;
        assert!(err.message().contains("already in progress"));

        let err = CalibrationError::NoSensorData { waited_ms: 5000 };
        assert_eq!(err.message(), "No sensor data received within 5000 ms");
    }

    #[test]
    fn test_calibration_error_display() {
        let err = CalibrationError::Cancelled;
        let display = format!("{}", err);
        assert!(display.contains("CalibrationError"));
        assert!(display.contains(&err.code().to_string()));
    }
}
