//! SensorEngine: per-channel pipelines behind one orchestration handle.
//!
//! The engine owns one `ChannelPipeline` per sensor channel, each behind its
//! own `std::sync::Mutex`. Locks are taken for the duration of a single
//! synchronous step and never held across an `.await`, so feeding a channel
//! and waiting on its calibration can interleave freely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};

use crate::analysis::ClassificationResult;
use crate::calibration::{
    CalibrationProfile, CalibrationProgress, PassStatus, ScalarProfile, VectorProfile,
};
use crate::config::AppConfig;
use crate::engine::clock::{SystemTimeSource, TimeSource};
use crate::error::{log_calibration_error, log_pipeline_error, CalibrationError, PipelineError};
use crate::managers::BroadcastChannelManager;
use crate::pipeline::{ChannelPipeline, FeedOutcome};
use crate::sensors::{ChannelId, Sample};
use crate::telemetry::{self, meter_fraction, SessionExport, SessionRecorder};

#[path = "core_subscriptions.rs"]
mod core_subscriptions;

type SharedPipeline = Arc<Mutex<ChannelPipeline>>;

/// SensorEngine orchestrates both channel pipelines and shared channels.
pub struct SensorEngine {
    config: AppConfig,
    field: SharedPipeline,
    motion: SharedPipeline,
    pub(crate) broadcasts: BroadcastChannelManager,
    session: SessionRecorder,
    time_source: Arc<dyn TimeSource>,
    next_pass_id: AtomicU64,
}

impl SensorEngine {
    /// Create an engine stamping `feed_now` samples with the system clock.
    pub fn new(config: AppConfig) -> Result<Self, PipelineError> {
        Self::with_time_source(config, Arc::new(SystemTimeSource::new()))
    }

    pub fn with_time_source(
        config: AppConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, PipelineError> {
        let field = ChannelPipeline::new(ChannelId::Field, &config)?;
        let motion = ChannelPipeline::new(ChannelId::Motion, &config)?;

        tracing::debug!(
            window_size = config.calibration.window_size,
            min_update_interval_ms = config.filter.min_update_interval_ms,
            "sensor engine created"
        );

        Ok(Self {
            config,
            field: Arc::new(Mutex::new(field)),
            motion: Arc::new(Mutex::new(motion)),
            broadcasts: BroadcastChannelManager::new(),
            session: SessionRecorder::default(),
            time_source,
            next_pass_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionRecorder {
        &self.session
    }

    pub fn now_ms(&self) -> u64 {
        self.time_source.now_ms()
    }

    fn pipeline(&self, channel: ChannelId) -> &SharedPipeline {
        match channel {
            ChannelId::Field => &self.field,
            ChannelId::Motion => &self.motion,
        }
    }

    fn lock_for_feed(&self, channel: ChannelId) -> Result<MutexGuard<'_, ChannelPipeline>, PipelineError> {
        self.pipeline(channel).lock().map_err(|_| {
            let err = PipelineError::ChannelPoisoned {
                channel: channel.as_str(),
            };
            log_pipeline_error(&err, "SensorEngine::lock_for_feed");
            err
        })
    }

    // ========================================================================
    // SAMPLE FLOW
    // ========================================================================

    /// Feed one raw reading stamped with the caller's monotonic clock.
    pub fn feed(
        &self,
        channel: ChannelId,
        sample: Sample,
        timestamp_ms: u64,
    ) -> Result<FeedOutcome, PipelineError> {
        let outcome = self.lock_for_feed(channel)?.feed(sample, timestamp_ms)?;

        match &outcome {
            FeedOutcome::Classified(result) => self.publish(result),
            FeedOutcome::CalibrationComplete(profile) => {
                tracing::info!(
                    %channel,
                    samples = profile.sample_count(),
                    "calibration window filled"
                );
            }
            FeedOutcome::Collected(_) | FeedOutcome::Deferred | FeedOutcome::Rejected => {}
        }
        Ok(outcome)
    }

    /// Feed one raw reading stamped with the engine's time source.
    pub fn feed_now(&self, channel: ChannelId, sample: Sample) -> Result<FeedOutcome, PipelineError> {
        self.feed(channel, sample, self.time_source.now_ms())
    }

    /// Flush a rate-limited value once its interval has passed.
    pub fn poll(
        &self,
        channel: ChannelId,
        timestamp_ms: u64,
    ) -> Result<Option<ClassificationResult>, PipelineError> {
        let result = self.lock_for_feed(channel)?.poll(timestamp_ms);
        if let Some(result) = &result {
            self.publish(result);
        }
        Ok(result)
    }

    /// Latest classification for `channel`, without blocking on a pass.
    pub fn classification(&self, channel: ChannelId) -> Option<ClassificationResult> {
        self.lock_for_feed(channel)
            .ok()
            .and_then(|pipeline| pipeline.classification().cloned())
    }

    /// Clear smoothing state; the next sample seeds the filter.
    pub fn reset_filter(&self, channel: ChannelId) -> Result<(), PipelineError> {
        self.lock_for_feed(channel)?.reset_filter();
        tracing::debug!(%channel, "filter reset");
        Ok(())
    }

    pub fn profile(&self, channel: ChannelId) -> Result<CalibrationProfile, PipelineError> {
        Ok(self.lock_for_feed(channel)?.profile().clone())
    }

    pub fn is_calibrating(&self, channel: ChannelId) -> bool {
        self.lock_for_feed(channel)
            .map(|pipeline| pipeline.is_calibrating())
            .unwrap_or(false)
    }

    /// Level-meter fill for the latest result on `channel`, in [0, 1].
    ///
    /// The field channel scales against its anomaly threshold. The motion
    /// channel reports deviation as a fraction of its deviation threshold.
    pub fn meter_level(&self, channel: ChannelId) -> Option<f64> {
        let pipeline = self.lock_for_feed(channel).ok()?;
        let latest = pipeline.classification()?;
        match pipeline.profile() {
            CalibrationProfile::Scalar(profile) => {
                Some(meter_fraction(latest.value, profile.thresholds.anomaly))
            }
            CalibrationProfile::Vector(profile) => {
                let deviation = latest.deviation.unwrap_or(0.0);
                Some((deviation / profile.deviation_threshold).clamp(0.0, 1.0))
            }
        }
    }

    fn publish(&self, result: &ClassificationResult) {
        self.session.record(result);
        if let Some(event) = &result.event {
            tracing::warn!(
                channel = %event.channel,
                value = event.value,
                deviation = ?event.deviation,
                "anomaly detected"
            );
        }
        self.broadcasts.publish_classification(result);
    }

    // ========================================================================
    // CALIBRATION METHODS
    // ========================================================================

    /// Begin a calibration pass on `channel`.
    ///
    /// Samples fed from now on go to the window only. The returned handle
    /// publishes progress and resolves when the window fills; dropping it
    /// does not stop the pass.
    pub fn start_calibration(&self, channel: ChannelId) -> Result<PendingCalibration, CalibrationError> {
        let pass_id = self.next_pass_id.fetch_add(1, Ordering::SeqCst);
        let progress = {
            let mut pipeline = lock_for_calibration(self.pipeline(channel))?;
            pipeline.begin_calibration(pass_id)?
        };

        tracing::info!(%channel, pass_id, capacity = progress.capacity, "calibration started");
        self.broadcasts.publish_progress(progress);

        let calibration = &self.config.calibration;
        Ok(PendingCalibration {
            channel,
            pass_id,
            pipeline: Arc::clone(self.pipeline(channel)),
            progress_tx: self.broadcasts.calibration_sender(),
            created: std::time::Instant::now(),
            tick_period: Duration::from_secs_f64(1.0 / f64::from(calibration.tick_rate_hz)),
            timeout: (calibration.timeout_ms > 0)
                .then(|| Duration::from_millis(calibration.timeout_ms)),
        })
    }

    /// Run a full calibration pass on `channel`.
    pub async fn calibrate(&self, channel: ChannelId) -> Result<CalibrationProfile, CalibrationError> {
        self.start_calibration(channel)?.wait().await
    }

    /// Abandon the running pass on `channel`, keeping the previous profile.
    ///
    /// Returns `false` if no pass was running.
    pub fn cancel_calibration(&self, channel: ChannelId) -> Result<bool, CalibrationError> {
        let cancelled = lock_for_calibration(self.pipeline(channel))?.cancel_calibration();
        if let Some(pass_id) = cancelled {
            tracing::info!(%channel, pass_id, "calibration cancelled");
        }
        Ok(cancelled.is_some())
    }

    // ========================================================================
    // SESSION
    // ========================================================================

    /// Flat record of both profiles and the anomaly count.
    pub fn export_session(&self) -> Result<SessionExport, PipelineError> {
        let field = self.profile(ChannelId::Field)?;
        let motion = self.profile(ChannelId::Motion)?;

        let field = field
            .as_scalar()
            .cloned()
            .unwrap_or_else(ScalarProfile::new_default);
        let motion = motion
            .as_vector()
            .cloned()
            .unwrap_or_else(|| VectorProfile::new_default(&self.config.motion));

        Ok(SessionExport::from_profiles(
            &field,
            &motion,
            self.session.anomaly_count(),
            telemetry::now_timestamp_ms(),
        ))
    }
}

fn lock_for_calibration(
    pipeline: &SharedPipeline,
) -> Result<MutexGuard<'_, ChannelPipeline>, CalibrationError> {
    pipeline.lock().map_err(|_| {
        let err = CalibrationError::StatePoisoned;
        log_calibration_error(&err, "SensorEngine::lock_for_calibration");
        err
    })
}

/// Handle to a running calibration pass.
///
/// `wait` ticks at the configured rate, publishing progress each tick, and
/// resolves exactly once: when the window fills, when the pass is
/// cancelled, or at the timeout.
pub struct PendingCalibration {
    channel: ChannelId,
    pass_id: u64,
    pipeline: SharedPipeline,
    progress_tx: broadcast::Sender<CalibrationProgress>,
    created: std::time::Instant,
    tick_period: Duration,
    timeout: Option<Duration>,
}

impl PendingCalibration {
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn pass_id(&self) -> u64 {
        self.pass_id
    }

    /// Close the pass now with whatever has been collected.
    ///
    /// Behaves like reaching the timeout: a partial window still yields a
    /// profile, an empty one yields `NoSensorData`. Used by replays that run
    /// out of input before the window fills.
    pub fn finish_now(self) -> Result<CalibrationProfile, CalibrationError> {
        let waited_ms = self.created.elapsed().as_millis() as u64;
        lock_for_calibration(&self.pipeline)?.expire_calibration(self.pass_id, waited_ms)
    }

    pub async fn wait(self) -> Result<CalibrationProfile, CalibrationError> {
        let started = Instant::now();
        let deadline = self.timeout.map(|timeout| started + timeout);
        let mut ticker = tokio::time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let status = lock_for_calibration(&self.pipeline)?.pass_status(self.pass_id);
            match status {
                PassStatus::Running(progress) => {
                    let _ = self.progress_tx.send(progress);
                }
                PassStatus::Completed(profile) => {
                    let capacity = profile.sample_count();
                    let _ = self.progress_tx.send(CalibrationProgress::new(
                        self.channel,
                        capacity,
                        capacity,
                    ));
                    tracing::info!(channel = %self.channel, pass_id = self.pass_id, "calibration complete");
                    return Ok(profile);
                }
                PassStatus::Cancelled => {
                    let err = CalibrationError::Cancelled;
                    log_calibration_error(&err, "PendingCalibration::wait");
                    return Err(err);
                }
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    let waited_ms = started.elapsed().as_millis() as u64;
                    tracing::warn!(
                        channel = %self.channel,
                        pass_id = self.pass_id,
                        waited_ms,
                        "calibration deadline reached"
                    );
                    return lock_for_calibration(&self.pipeline)?
                        .expire_calibration(self.pass_id, waited_ms);
                }
            }
        }
    }
}
