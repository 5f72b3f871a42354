// Error types for the sensor pipeline
//
// This module defines custom error types for calibration and channel
// pipeline operations, providing structured error handling with stable
// numeric codes for callers that report them across process boundaries.

mod calibration;
mod pipeline;

pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};
pub use pipeline::{log_pipeline_error, PipelineError, PipelineErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error reporting in the
/// CLI and in collaborators that surface errors to a user.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
