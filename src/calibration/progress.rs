// Progress tracking for calibration passes
//
// Progress is published on every calibration tick so a presentation layer
// can render it; the core only reports `collected / capacity`.

use crate::sensors::ChannelId;

/// Progress information for one channel's calibration pass
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalibrationProgress {
    /// Channel being calibrated
    pub channel: ChannelId,
    /// Samples collected so far
    pub collected: usize,
    /// Window capacity
    pub capacity: usize,
}

impl CalibrationProgress {
    pub fn new(channel: ChannelId, collected: usize, capacity: usize) -> Self {
        Self {
            channel,
            collected,
            capacity,
        }
    }

    /// Fraction collected, in [0, 1]
    pub fn fraction(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        (self.collected as f64 / self.capacity as f64).min(1.0)
    }

    /// Get progress percentage (0-100)
    pub fn percentage(&self) -> u8 {
        (self.fraction() * 100.0) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.collected >= self.capacity
    }
}
