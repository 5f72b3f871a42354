// Smoothing state for one channel
//
// The field channel smooths its scalar directly. The motion channel smooths
// each axis independently and reports the magnitude of the smoothed vector.

use crate::analysis::SmoothingFilter;
use crate::config::FilterConfig;
use crate::error::PipelineError;
use crate::sensors::{ChannelId, Sample, Vector3};

#[derive(Debug, Clone)]
pub enum ChannelFilter {
    Scalar(SmoothingFilter),
    Vector {
        x: SmoothingFilter,
        y: SmoothingFilter,
        z: SmoothingFilter,
    },
}

impl ChannelFilter {
    pub fn for_channel(channel: ChannelId, config: &FilterConfig) -> Result<Self, PipelineError> {
        match channel {
            ChannelId::Field => Ok(ChannelFilter::Scalar(SmoothingFilter::new(
                config.field_alpha,
            )?)),
            ChannelId::Motion => Ok(ChannelFilter::Vector {
                x: SmoothingFilter::new(config.motion_alpha)?,
                y: SmoothingFilter::new(config.motion_alpha)?,
                z: SmoothingFilter::new(config.motion_alpha)?,
            }),
        }
    }

    /// Advance the filter and return the smoothed scalar (or smoothed magnitude)
    ///
    /// Returns `None` when the sample shape does not match the filter.
    pub fn apply(&mut self, sample: &Sample) -> Option<f64> {
        match (self, sample) {
            (ChannelFilter::Scalar(filter), Sample::Scalar(value)) => Some(filter.filter(*value)),
            (ChannelFilter::Vector { x, y, z }, Sample::Vector(v)) => {
                let smoothed = Vector3::new(x.filter(v.x), y.filter(v.y), z.filter(v.z));
                Some(smoothed.magnitude())
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        match self {
            ChannelFilter::Scalar(filter) => filter.reset(),
            ChannelFilter::Vector { x, y, z } => {
                x.reset();
                y.reset();
                z.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_channel_smooths_value() {
        let mut filter = ChannelFilter::for_channel(ChannelId::Field, &FilterConfig::default())
            .unwrap();
        assert_eq!(filter.apply(&Sample::Scalar(10.0)), Some(10.0));
        // 0.3 * 20 + 0.7 * 10
        let next = filter.apply(&Sample::Scalar(20.0)).unwrap();
        assert!((next - 13.0).abs() < 1e-12);
    }

    #[test]
    fn vector_channel_smooths_each_axis() {
        let mut filter = ChannelFilter::for_channel(ChannelId::Motion, &FilterConfig::default())
            .unwrap();
        let first = filter
            .apply(&Sample::Vector(Vector3::new(0.0, 0.0, 10.0)))
            .unwrap();
        assert!((first - 10.0).abs() < 1e-12);

        // z: 0.4 * 0 + 0.6 * 10 = 6, x: 0.4 * 10 = 4 -> magnitude sqrt(52)
        let second = filter
            .apply(&Sample::Vector(Vector3::new(10.0, 0.0, 0.0)))
            .unwrap();
        assert!((second - 52f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn reset_clears_every_axis() {
        let mut filter = ChannelFilter::for_channel(ChannelId::Motion, &FilterConfig::default())
            .unwrap();
        filter.apply(&Sample::Vector(Vector3::new(1.0, 2.0, 3.0)));
        filter.reset();
        let seeded = filter
            .apply(&Sample::Vector(Vector3::new(0.0, 3.0, 4.0)))
            .unwrap();
        assert!((seeded - 5.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_sample_is_ignored() {
        let mut filter = ChannelFilter::for_channel(ChannelId::Field, &FilterConfig::default())
            .unwrap();
        assert_eq!(filter.apply(&Sample::Vector(Vector3::ZERO)), None);
        // Still unseeded: the next scalar passes straight through
        assert_eq!(filter.apply(&Sample::Scalar(42.0)), Some(42.0));
    }
}
