//! Flat session record for persistence or sharing.

use serde::{Deserialize, Serialize};

use crate::calibration::{ScalarProfile, VectorProfile};

/// One-level JSON record of a monitoring session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    /// Wall-clock export time, milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub anomaly_count: u64,
    pub field_calibrated: bool,
    pub field_baseline: f64,
    pub field_std_dev: f64,
    pub field_threshold_normal: f64,
    pub field_threshold_elevated: f64,
    pub field_threshold_anomaly: f64,
    pub motion_calibrated: bool,
    pub motion_gravity: f64,
}

impl SessionExport {
    pub fn from_profiles(
        field: &ScalarProfile,
        motion: &VectorProfile,
        anomaly_count: u64,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            timestamp_ms,
            anomaly_count,
            field_calibrated: field.is_calibrated,
            field_baseline: field.baseline,
            field_std_dev: field.standard_deviation,
            field_threshold_normal: field.thresholds.normal,
            field_threshold_elevated: field.thresholds.elevated,
            field_threshold_anomaly: field.thresholds.anomaly,
            motion_calibrated: motion.is_calibrated,
            motion_gravity: motion.gravity_magnitude,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotionConfig;
    use crate::sensors::Vector3;

    #[test]
    fn export_is_flat_json() {
        let field = ScalarProfile::from_samples(&[10.0; 60]);
        let motion = VectorProfile::from_samples(&[Vector3::new(0.0, 0.0, 9.8); 60], &MotionConfig::default());
        let export = SessionExport::from_profiles(&field, &motion, 3, 1_700_000_000_000);

        let value: serde_json::Value = serde_json::from_str(&export.to_json_pretty().unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.values().all(|v| !v.is_object() && !v.is_array()));
        assert_eq!(object["anomaly_count"], 3);
        assert_eq!(object["field_threshold_normal"], 25.0);
        assert_eq!(object["field_threshold_elevated"], 45.0);
        assert_eq!(object["motion_calibrated"], true);
    }

    #[test]
    fn uncalibrated_export_carries_fallbacks() {
        let export = SessionExport::from_profiles(
            &ScalarProfile::new_default(),
            &VectorProfile::new_default(&MotionConfig::default()),
            0,
            0,
        );
        assert!(!export.field_calibrated);
        assert_eq!(export.field_threshold_anomaly, 75.0);
        assert_eq!(export.motion_gravity, 9.8);
    }
}
