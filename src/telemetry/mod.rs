//! Session telemetry: anomaly counter, bounded value history, meter levels.
//!
//! The recorder sees every classification the engine emits and keeps just
//! enough state for a presentation layer (chart history, level meter) and
//! for the flat session export.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::analysis::ClassificationResult;
use crate::sensors::ChannelId;

pub mod export;

pub use export::SessionExport;

/// Display points retained per channel
pub const HISTORY_CAPACITY: usize = 100;
/// Meter full-scale never drops below this
pub const METER_FLOOR: f64 = 100.0;
/// Meter full-scale headroom above the anomaly threshold
pub const METER_HEADROOM: f64 = 1.5;

/// Fraction of the level meter filled by `value`
///
/// Full scale is `max(100, anomaly_threshold * 1.5)`.
pub fn meter_fraction(value: f64, anomaly_threshold: f64) -> f64 {
    let full_scale = METER_FLOOR.max(anomaly_threshold * METER_HEADROOM);
    (value / full_scale).clamp(0.0, 1.0)
}

/// Snapshot of recorder state
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionSnapshot {
    pub anomaly_count: u64,
    pub total_updates: u64,
    pub field_history: Vec<f64>,
    pub motion_history: Vec<f64>,
}

/// Per-session counters and bounded per-channel history.
pub struct SessionRecorder {
    anomaly_count: AtomicU64,
    total_updates: AtomicU64,
    history: Mutex<HashMap<ChannelId, VecDeque<f64>>>,
    history_capacity: usize,
}

impl SessionRecorder {
    /// A `history_capacity` of 0 keeps counters only.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            anomaly_count: AtomicU64::new(0),
            total_updates: AtomicU64::new(0),
            history: Mutex::new(HashMap::new()),
            history_capacity,
        }
    }

    pub fn record(&self, result: &ClassificationResult) {
        self.total_updates.fetch_add(1, Ordering::Relaxed);
        if result.severity.is_anomaly() {
            self.anomaly_count.fetch_add(1, Ordering::Relaxed);
        }
        if self.history_capacity == 0 {
            return;
        }

        let mut history = self.lock_history();
        let points = history
            .entry(result.channel)
            .or_insert_with(|| VecDeque::with_capacity(self.history_capacity));
        if points.len() == self.history_capacity {
            points.pop_front();
        }
        points.push_back(result.value);
    }

    pub fn anomaly_count(&self) -> u64 {
        self.anomaly_count.load(Ordering::Relaxed)
    }

    pub fn total_updates(&self) -> u64 {
        self.total_updates.load(Ordering::Relaxed)
    }

    /// Oldest-first display values for `channel`
    pub fn history(&self, channel: ChannelId) -> Vec<f64> {
        self.lock_history()
            .get(&channel)
            .map(|points| points.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            anomaly_count: self.anomaly_count(),
            total_updates: self.total_updates(),
            field_history: self.history(ChannelId::Field),
            motion_history: self.history(ChannelId::Motion),
        }
    }

    pub fn reset(&self) {
        self.anomaly_count.store(0, Ordering::Relaxed);
        self.total_updates.store(0, Ordering::Relaxed);
        self.lock_history().clear();
    }

    // History is display-only; a panic mid-push leaves it usable.
    fn lock_history(&self) -> MutexGuard<'_, HashMap<ChannelId, VecDeque<f64>>> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

pub(crate) fn now_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnomalyEvent, Severity};

    fn result(channel: ChannelId, value: f64, severity: Severity) -> ClassificationResult {
        let event = severity.is_anomaly().then(|| AnomalyEvent {
            channel,
            value,
            deviation: None,
            timestamp_ms: 0,
        });
        ClassificationResult {
            channel,
            severity,
            value,
            deviation: None,
            timestamp_ms: 0,
            event,
        }
    }

    #[test]
    fn counts_only_anomalies() {
        let recorder = SessionRecorder::default();
        recorder.record(&result(ChannelId::Field, 10.0, Severity::Normal));
        recorder.record(&result(ChannelId::Field, 90.0, Severity::Anomaly));
        recorder.record(&result(ChannelId::Motion, 20.0, Severity::Anomaly));

        assert_eq!(recorder.anomaly_count(), 2);
        assert_eq!(recorder.total_updates(), 3);
    }

    #[test]
    fn history_is_bounded_per_channel() {
        let recorder = SessionRecorder::new(3);
        for value in [1.0, 2.0, 3.0, 4.0] {
            recorder.record(&result(ChannelId::Field, value, Severity::Normal));
        }
        recorder.record(&result(ChannelId::Motion, 9.8, Severity::Normal));

        assert_eq!(recorder.history(ChannelId::Field), vec![2.0, 3.0, 4.0]);
        assert_eq!(recorder.history(ChannelId::Motion), vec![9.8]);
    }

    #[test]
    fn zero_capacity_keeps_no_history() {
        let recorder = SessionRecorder::new(0);
        for value in [1.0, 2.0, 90.0] {
            recorder.record(&result(ChannelId::Field, value, Severity::Normal));
        }
        assert!(recorder.history(ChannelId::Field).is_empty());
        assert_eq!(recorder.total_updates(), 3);
    }

    #[test]
    fn reset_clears_everything() {
        let recorder = SessionRecorder::default();
        recorder.record(&result(ChannelId::Field, 90.0, Severity::Anomaly));
        recorder.reset();
        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.anomaly_count, 0);
        assert!(snapshot.field_history.is_empty());
    }

    #[test]
    fn meter_uses_floor_or_headroom() {
        // Fallback anomaly threshold 75 -> full scale 112.5
        assert!((meter_fraction(56.25, 75.0) - 0.5).abs() < 1e-12);
        // Small threshold -> floor of 100
        assert!((meter_fraction(50.0, 20.0) - 0.5).abs() < 1e-12);
        assert_eq!(meter_fraction(1_000.0, 75.0), 1.0);
        assert_eq!(meter_fraction(-5.0, 75.0), 0.0);
    }
}
