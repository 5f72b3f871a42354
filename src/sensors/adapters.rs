//! Conversions from raw device readings into channel samples.
//!
//! A magnetometer reports a field vector; the field channel only tracks its
//! strength. Devices without a magnetometer can still drive the field
//! channel from the accelerometer's deviation from rest.

use super::types::Vector3;

/// Field strength (μT) from a raw three-axis magnetometer reading.
pub fn field_strength(reading: Vector3) -> f64 {
    reading.magnitude()
}

/// Stand-in field value derived from acceleration when no magnetometer is
/// available: the deviation from the rest magnitude, scaled into the field
/// channel's range.
pub fn pseudo_field_from_motion(acceleration: Vector3, gravity_magnitude: f64, scale: f64) -> f64 {
    (acceleration.magnitude() - gravity_magnitude).abs() * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_strength_is_vector_norm() {
        let strength = field_strength(Vector3::new(30.0, 40.0, 0.0));
        assert!((strength - 50.0).abs() < 1e-9);
    }

    #[test]
    fn pseudo_field_is_zero_at_rest() {
        let value = pseudo_field_from_motion(Vector3::new(0.0, 0.0, 9.8), 9.8, 8.0);
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn pseudo_field_scales_deviation() {
        // |7.8 - 9.8| * 8 = 16
        let value = pseudo_field_from_motion(Vector3::new(0.0, 0.0, 7.8), 9.8, 8.0);
        assert!((value - 16.0).abs() < 1e-9);
    }
}
