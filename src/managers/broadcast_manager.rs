// BroadcastChannelManager: Centralized tokio broadcast channel management
// Single Responsibility: Broadcast channel lifecycle and subscription

use tokio::sync::broadcast;

use crate::analysis::{AnomalyEvent, ClassificationResult};
use crate::calibration::CalibrationProgress;

/// Buffer for classification results (~5 s at the 50 ms update interval)
const CLASSIFICATION_CAPACITY: usize = 100;
/// Buffer for anomaly events
const ANOMALY_CAPACITY: usize = 100;
/// Buffer for calibration progress (one pass publishes about one per tick)
const PROGRESS_CAPACITY: usize = 50;

/// Manages all tokio broadcast channels
///
/// Channels are created eagerly, so publishing never waits on a subscriber
/// and subscribing never fails. Publishing with no subscribers is a no-op.
///
/// # Channel Types
/// - Classification: every emitted result, both channels
/// - Anomaly: only results that crossed the anomaly threshold
/// - Calibration: progress updates while a pass is running
pub struct BroadcastChannelManager {
    classification: broadcast::Sender<ClassificationResult>,
    anomaly: broadcast::Sender<AnomalyEvent>,
    calibration: broadcast::Sender<CalibrationProgress>,
}

impl BroadcastChannelManager {
    pub fn new() -> Self {
        let (classification, _) = broadcast::channel(CLASSIFICATION_CAPACITY);
        let (anomaly, _) = broadcast::channel(ANOMALY_CAPACITY);
        let (calibration, _) = broadcast::channel(PROGRESS_CAPACITY);
        Self {
            classification,
            anomaly,
            calibration,
        }
    }

    // ========================================================================
    // CLASSIFICATION CHANNEL
    // ========================================================================

    /// Publish a result, and its anomaly event if it carries one
    pub fn publish_classification(&self, result: &ClassificationResult) {
        if let Some(event) = &result.event {
            let _ = self.anomaly.send(event.clone());
        }
        let _ = self.classification.send(result.clone());
    }

    /// Subscribe to classification results
    ///
    /// # Notes
    /// - Each subscriber gets an independent receiver
    /// - Subscribers must keep up with message rate or will lag
    pub fn subscribe_classification(&self) -> broadcast::Receiver<ClassificationResult> {
        self.classification.subscribe()
    }

    // ========================================================================
    // ANOMALY CHANNEL
    // ========================================================================

    pub fn subscribe_anomalies(&self) -> broadcast::Receiver<AnomalyEvent> {
        self.anomaly.subscribe()
    }

    // ========================================================================
    // CALIBRATION CHANNEL
    // ========================================================================

    pub fn calibration_sender(&self) -> broadcast::Sender<CalibrationProgress> {
        self.calibration.clone()
    }

    pub fn publish_progress(&self, progress: CalibrationProgress) {
        let _ = self.calibration.send(progress);
    }

    /// Subscribe to calibration progress
    pub fn subscribe_calibration(&self) -> broadcast::Receiver<CalibrationProgress> {
        self.calibration.subscribe()
    }
}

impl Default for BroadcastChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
