// Sensor channel identifiers and raw sample types

use serde::{Deserialize, Serialize};

/// Physical quantity monitored by one pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelId {
    /// Scalar magnetic field magnitude (μT)
    Field,
    /// Tri-axis acceleration including gravity (m/s²)
    Motion,
}

impl ChannelId {
    pub const ALL: [ChannelId; 2] = [ChannelId::Field, ChannelId::Motion];

    /// Shape of the samples this channel accepts
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelId::Field => ChannelKind::Scalar,
            ChannelId::Motion => ChannelKind::Vector3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelId::Field => "field",
            ChannelId::Motion => "motion",
        }
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sample shape accepted by a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Scalar,
    Vector3,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Scalar => "scalar",
            ChannelKind::Vector3 => "vector3",
        }
    }
}

/// Three-axis reading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One raw reading as delivered by a sensor adapter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    Scalar(f64),
    Vector(Vector3),
}

impl Sample {
    pub fn kind(&self) -> ChannelKind {
        match self {
            Sample::Scalar(_) => ChannelKind::Scalar,
            Sample::Vector(_) => ChannelKind::Vector3,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Sample::Scalar(value) => value.is_finite(),
            Sample::Vector(v) => v.is_finite(),
        }
    }

    /// Largest absolute component
    pub fn max_abs(&self) -> f64 {
        match self {
            Sample::Scalar(value) => value.abs(),
            Sample::Vector(v) => v.x.abs().max(v.y.abs()).max(v.z.abs()),
        }
    }
}

impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Sample::Scalar(value)
    }
}

impl From<Vector3> for Sample {
    fn from(value: Vector3) -> Self {
        Sample::Vector(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_kinds() {
        assert_eq!(ChannelId::Field.kind(), ChannelKind::Scalar);
        assert_eq!(ChannelId::Motion.kind(), ChannelKind::Vector3);
        assert_eq!(ChannelId::Motion.to_string(), "motion");
    }

    #[test]
    fn test_vector_magnitude() {
        assert!((Vector3::new(3.0, 4.0, 0.0).magnitude() - 5.0).abs() < 1e-12);
        assert_eq!(Vector3::ZERO.magnitude(), 0.0);
    }

    #[test]
    fn test_sample_json_shapes() {
        let scalar: Sample = serde_json::from_str("42.5").unwrap();
        assert_eq!(scalar, Sample::Scalar(42.5));

        let vector: Sample = serde_json::from_str(r#"{"x":0.0,"y":0.0,"z":9.8}"#).unwrap();
        assert_eq!(vector, Sample::Vector(Vector3::new(0.0, 0.0, 9.8)));
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(!Sample::Scalar(f64::NAN).is_finite());
        assert!(!Sample::Vector(Vector3::new(0.0, f64::INFINITY, 0.0)).is_finite());
        assert!(Sample::Scalar(-3.0).is_finite());
    }
}
