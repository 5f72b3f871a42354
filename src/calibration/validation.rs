// Sample validation logic
//
// Raw samples are checked before they reach a calibration window or a
// smoothing filter: the shape must match the channel and every component
// must be finite and within MAX_SAMPLE_MAGNITUDE, far above any physical
// field or acceleration reading.

use crate::error::PipelineError;
use crate::sensors::{ChannelId, Sample};

/// Largest accepted absolute value for any sample component
pub const MAX_SAMPLE_MAGNITUDE: f64 = 1e9;

/// Validator for raw channel samples
pub struct SampleValidator;

impl SampleValidator {
    /// Validate a single sample for a channel
    ///
    /// # Returns
    /// * `Ok(())` - Sample valid
    /// * `Err(PipelineError::SampleMismatch)` - Scalar fed to a vector channel or vice versa
    /// * `Err(PipelineError::NonFiniteSample)` - NaN or infinite component
    /// * `Err(PipelineError::SampleOutOfRange)` - component beyond `MAX_SAMPLE_MAGNITUDE`
    pub fn validate(channel: ChannelId, sample: &Sample) -> Result<(), PipelineError> {
        let expected = channel.kind();
        if sample.kind() != expected {
            return Err(PipelineError::SampleMismatch {
                channel: channel.as_str(),
                expected: expected.as_str(),
            });
        }

        if !sample.is_finite() {
            return Err(PipelineError::NonFiniteSample {
                channel: channel.as_str(),
            });
        }

        if sample.max_abs() > MAX_SAMPLE_MAGNITUDE {
            return Err(PipelineError::SampleOutOfRange {
                channel: channel.as_str(),
                limit: MAX_SAMPLE_MAGNITUDE,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::Vector3;

    #[test]
    fn test_validate_valid_samples() {
        assert!(SampleValidator::validate(ChannelId::Field, &Sample::Scalar(48.0)).is_ok());
        assert!(SampleValidator::validate(
            ChannelId::Motion,
            &Sample::Vector(Vector3::new(0.1, -0.2, 9.8))
        )
        .is_ok());
    }

    #[test]
    fn test_validate_shape_mismatch() {
        match SampleValidator::validate(ChannelId::Motion, &Sample::Scalar(1.0)) {
            Err(PipelineError::SampleMismatch { channel, expected }) => {
                assert_eq!(channel, "motion");
                assert_eq!(expected, "vector3");
            }
            other => panic!("Expected SampleMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_non_finite() {
        let result = SampleValidator::validate(ChannelId::Field, &Sample::Scalar(f64::NAN));
        assert!(matches!(
            result,
            Err(PipelineError::NonFiniteSample { channel: "field" })
        ));
    }

    #[test]
    fn test_validate_out_of_range() {
        assert!(SampleValidator::validate(ChannelId::Field, &Sample::Scalar(-1e9)).is_ok());
        assert!(matches!(
            SampleValidator::validate(ChannelId::Field, &Sample::Scalar(1e307)),
            Err(PipelineError::SampleOutOfRange { channel: "field", .. })
        ));
        assert!(matches!(
            SampleValidator::validate(
                ChannelId::Motion,
                &Sample::Vector(Vector3::new(0.0, -2e9, 9.8))
            ),
            Err(PipelineError::SampleOutOfRange { channel: "motion", .. })
        ));
    }
}
