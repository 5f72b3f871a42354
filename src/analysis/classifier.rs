// Classifier - threshold-based severity classification
//
// Maps a filtered channel value onto calibrated thresholds:
//
// Scalar channel: four ordered tiers (Normal < Elevated < High < Anomaly).
// Vector channel: deviation of the magnitude from the rest magnitude against
// a single threshold (Normal or Anomaly).
//
// Comparisons are `<` / `>=`, so a value sitting exactly on a threshold falls
// in the higher tier. There is no hysteresis: every update is classified on
// its own and every Anomaly carries its own event.

use serde::{Deserialize, Serialize};

use crate::calibration::state::{ScalarProfile, TierThresholds, VectorProfile};
use crate::sensors::ChannelId;

/// Ordered severity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Elevated,
    High,
    Anomaly,
}

impl Severity {
    pub fn is_anomaly(&self) -> bool {
        matches!(self, Severity::Anomaly)
    }
}

/// Payload emitted for each update classified as Anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    pub channel: ChannelId,
    /// Filtered value (field strength, or motion magnitude)
    pub value: f64,
    /// Deviation from rest magnitude, motion channel only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
    pub timestamp_ms: u64,
}

/// Latest computed state for a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub channel: ChannelId,
    pub severity: Severity,
    /// Filtered value, clamped at zero
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<AnomalyEvent>,
}

/// Place a value on the four-tier ladder
pub fn classify_tier(value: f64, thresholds: &TierThresholds) -> Severity {
    if value < thresholds.normal {
        Severity::Normal
    } else if value < thresholds.elevated {
        Severity::Elevated
    } else if value < thresholds.anomaly {
        Severity::High
    } else {
        Severity::Anomaly
    }
}

/// Negative magnitudes are never classified or displayed
pub fn clamp_display(value: f64) -> f64 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Stateless classifier applying a channel's calibration profile
pub struct AnomalyClassifier;

impl AnomalyClassifier {
    /// Classify a filtered scalar value against the four-tier ladder
    pub fn classify_scalar(
        channel: ChannelId,
        filtered: f64,
        profile: &ScalarProfile,
        timestamp_ms: u64,
    ) -> ClassificationResult {
        let value = clamp_display(filtered);
        let severity = classify_tier(value, &profile.thresholds);
        let event = severity.is_anomaly().then(|| AnomalyEvent {
            channel,
            value,
            deviation: None,
            timestamp_ms,
        });

        ClassificationResult {
            channel,
            severity,
            value,
            deviation: None,
            timestamp_ms,
            event,
        }
    }

    /// Classify a filtered vector magnitude by its deviation from rest
    pub fn classify_vector(
        channel: ChannelId,
        magnitude: f64,
        profile: &VectorProfile,
        timestamp_ms: u64,
    ) -> ClassificationResult {
        let value = clamp_display(magnitude);
        let deviation = (value - profile.gravity_magnitude).abs();
        let severity = if deviation >= profile.deviation_threshold {
            Severity::Anomaly
        } else {
            Severity::Normal
        };
        let event = severity.is_anomaly().then(|| AnomalyEvent {
            channel,
            value,
            deviation: Some(deviation),
            timestamp_ms,
        });

        ClassificationResult {
            channel,
            severity,
            value,
            deviation: Some(deviation),
            timestamp_ms,
            event,
        }
    }
}
