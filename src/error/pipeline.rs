// Channel pipeline error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Pipeline error code constants
///
/// Error code range: 3001-3005
pub struct PipelineErrorCodes {}

impl PipelineErrorCodes {
    /// Configuration parameter out of its valid range
    pub const INVALID_PARAMETER: i32 = 3001;

    /// Sample shape does not match the channel (scalar vs vector)
    pub const SAMPLE_MISMATCH: i32 = 3002;

    /// Sample contained NaN or infinity
    pub const NON_FINITE_SAMPLE: i32 = 3003;

    /// Channel mutex was poisoned
    pub const CHANNEL_POISONED: i32 = 3004;

    /// Sample component beyond the accepted magnitude
    pub const SAMPLE_OUT_OF_RANGE: i32 = 3005;
}

/// Log a pipeline error with structured context
pub fn log_pipeline_error(err: &PipelineError, context: &str) {
    error!(
        "Pipeline error in {}: code={}, component=ChannelPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while feeding or configuring a channel pipeline
///
/// Error code ranges: 3001-3005
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Configuration value out of range
    InvalidParameter { name: String, value: f64 },

    /// Sample kind does not match the channel kind
    SampleMismatch {
        channel: &'static str,
        expected: &'static str,
    },

    /// Sample contained NaN or infinity
    NonFiniteSample { channel: &'static str },

    /// Channel mutex was poisoned
    ChannelPoisoned { channel: &'static str },

    /// Finite sample too large to calibrate against
    SampleOutOfRange { channel: &'static str, limit: f64 },
}

impl ErrorCode for PipelineError {
    fn code(&self) -> i32 {
        match self {
            PipelineError::InvalidParameter { .. } => PipelineErrorCodes::INVALID_PARAMETER,
            PipelineError::SampleMismatch { .. } => PipelineErrorCodes::SAMPLE_MISMATCH,
            PipelineError::NonFiniteSample { .. } => PipelineErrorCodes::NON_FINITE_SAMPLE,
            PipelineError::ChannelPoisoned { .. } => PipelineErrorCodes::CHANNEL_POISONED,
            PipelineError::SampleOutOfRange { .. } => PipelineErrorCodes::SAMPLE_OUT_OF_RANGE,
        }
    }

    fn message(&self) -> String {
        match self {
            PipelineError::InvalidParameter { name, value } => {
                format!("Invalid parameter {}: {}", name, value)
            }
            PipelineError::SampleMismatch { channel, expected } => {
                format!("Channel {} expects a {} sample", channel, expected)
            }
            PipelineError::NonFiniteSample { channel } => {
                format!("Non-finite sample rejected on channel {}", channel)
            }
            PipelineError::ChannelPoisoned { channel } => {
                format!("Lock poisoned for channel: {}", channel)
            }
            PipelineError::SampleOutOfRange { channel, limit } => {
                format!("Sample on channel {} exceeds magnitude {}", channel, limit)
            }
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PipelineError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PipelineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_codes() {
        assert_eq!(
            PipelineError::InvalidParameter {
                name: "alpha".to_string(),
                value: 0.0
            }
            .code(),
            3001
        );
        assert_eq!(
            PipelineError::SampleMismatch {
                channel: "field",
                expected: "scalar"
            }
            .code(),
            3002
        );
        assert_eq!(
            PipelineError::NonFiniteSample { channel: "motion" }.code(),
            3003
        );
        assert_eq!(
            PipelineError::ChannelPoisoned { channel: "field" }.code(),
            3004
        );
        assert_eq!(
            PipelineError::SampleOutOfRange {
                channel: "field",
                limit: 1e9
            }
            .code(),
            3005
        );
    }

    #[test]
    fn test_pipeline_error_messages() {
        let err = PipelineError::InvalidParameter {
            name: "alpha".to_string(),
            value: 1.5,
        };
        assert_eq!(err.message(), "Invalid parameter alpha: 1.5");

        let err = PipelineError::SampleMismatch {
            channel: "field",
            expected: "scalar",
        };
        assert_eq!(err.message(), "Channel field expects a scalar sample");
        assert!(format!("{}", err).contains("3002"));
    }
}
