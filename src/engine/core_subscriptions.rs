use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::analysis::{AnomalyEvent, ClassificationResult};
use crate::calibration::CalibrationProgress;
use crate::sensors::ChannelId;

use super::SensorEngine;

/// Broadcast receiver as a stream, skipping over lag gaps.
fn lossy_stream<T: Clone + Send + 'static>(rx: broadcast::Receiver<T>) -> impl Stream<Item = T> {
    BroadcastStream::new(rx).filter_map(|item| async move {
        match item {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("[SensorEngine] subscriber lagged: {}", err);
                None
            }
        }
    })
}

impl SensorEngine {
    // ========================================================================
    // STREAM SUBSCRIPTIONS
    // ========================================================================

    pub fn subscribe_classification(&self) -> broadcast::Receiver<ClassificationResult> {
        self.broadcasts.subscribe_classification()
    }

    pub fn subscribe_anomalies(&self) -> broadcast::Receiver<AnomalyEvent> {
        self.broadcasts.subscribe_anomalies()
    }

    pub fn subscribe_calibration(&self) -> broadcast::Receiver<CalibrationProgress> {
        self.broadcasts.subscribe_calibration()
    }

    /// Every emitted classification for `channel`.
    pub fn classification_stream(
        &self,
        channel: ChannelId,
    ) -> impl Stream<Item = ClassificationResult> {
        lossy_stream(self.subscribe_classification())
            .filter(move |result| std::future::ready(result.channel == channel))
    }

    pub fn anomaly_stream(&self) -> impl Stream<Item = AnomalyEvent> {
        lossy_stream(self.subscribe_anomalies())
    }

    pub fn calibration_stream(&self) -> impl Stream<Item = CalibrationProgress> {
        lossy_stream(self.subscribe_calibration())
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use crate::config::AppConfig;
    use crate::engine::SensorEngine;
    use crate::sensors::{ChannelId, Sample, Vector3};

    #[tokio::test]
    async fn classification_stream_filters_by_channel() {
        let engine = SensorEngine::new(AppConfig::default()).unwrap();
        let stream = engine.classification_stream(ChannelId::Motion);
        tokio::pin!(stream);

        engine.feed(ChannelId::Field, Sample::Scalar(10.0), 0).unwrap();
        engine
            .feed(ChannelId::Motion, Sample::Vector(Vector3::new(0.0, 0.0, 9.8)), 0)
            .unwrap();

        let next = stream.next().await.unwrap();
        assert_eq!(next.channel, ChannelId::Motion);
    }

    #[tokio::test]
    async fn anomaly_stream_only_carries_anomalies() {
        let engine = SensorEngine::new(AppConfig::default()).unwrap();
        let stream = engine.anomaly_stream();
        tokio::pin!(stream);

        engine.feed(ChannelId::Field, Sample::Scalar(10.0), 0).unwrap();
        engine.reset_filter(ChannelId::Field).unwrap();
        engine.feed(ChannelId::Field, Sample::Scalar(90.0), 100).unwrap();

        let event = stream.next().await.unwrap();
        assert_eq!(event.value, 90.0);
    }
}
