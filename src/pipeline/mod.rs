// Pipeline module - per-channel sample flow
//
// Every raw sample for a channel passes through one ChannelPipeline:
//
//   validate -> [calibrating?] -> window
//            -> [outlier?]     -> dropped
//            -> [rate gate]    -> deferred (latest raw kept)
//            -> smooth -> classify -> latest result
//
// The pipeline is plain synchronous state. The engine owns one per channel
// behind a mutex and never holds that lock across an await point.

pub mod channel_filter;
pub mod rate_limit;

pub use channel_filter::ChannelFilter;
pub use rate_limit::RateLimiter;

use std::time::Duration;

use crate::analysis::{AnomalyClassifier, ClassificationResult, OutlierGuard};
use crate::calibration::{
    CalibrationPhase, CalibrationProcedure, CalibrationProfile, CalibrationProgress, PassStatus,
    SampleValidator,
};
use crate::config::{AppConfig, MotionConfig};
use crate::error::{log_calibration_error, log_pipeline_error, CalibrationError, PipelineError};
use crate::sensors::{ChannelId, Sample};

/// What happened to a single fed sample
#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    /// Stored in the running calibration window
    Collected(CalibrationProgress),
    /// Filled the window; the new profile is already installed
    CalibrationComplete(CalibrationProfile),
    /// Inside the rate-limit interval; kept as the pending raw value
    Deferred,
    /// Beyond the outlier bound of a calibrated channel
    Rejected,
    /// Smoothed and classified
    Classified(ClassificationResult),
}

/// Complete processing state for one sensor channel
#[derive(Debug)]
pub struct ChannelPipeline {
    channel: ChannelId,
    window_size: usize,
    motion: MotionConfig,
    phase: CalibrationPhase,
    profile: CalibrationProfile,
    /// Most recently finished pass and the profile it produced
    last_completed: Option<(u64, CalibrationProfile)>,
    filter: ChannelFilter,
    limiter: RateLimiter,
    outlier_guard: Option<OutlierGuard>,
    last_raw: Option<Sample>,
    pending_raw: Option<Sample>,
    latest: Option<ClassificationResult>,
}

impl ChannelPipeline {
    /// Build an idle pipeline running on fallback thresholds
    pub fn new(channel: ChannelId, config: &AppConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let filter = ChannelFilter::for_channel(channel, &config.filter)?;
        let outlier_guard = config
            .filter
            .reject_outliers
            .then(|| OutlierGuard::new(config.filter.outlier_sigma));

        Ok(Self {
            channel,
            window_size: config.calibration.window_size,
            motion: config.motion.clone(),
            phase: CalibrationPhase::Idle,
            profile: CalibrationProfile::fallback(channel, &config.motion),
            last_completed: None,
            filter,
            limiter: RateLimiter::new(Duration::from_millis(
                config.filter.min_update_interval_ms,
            )),
            outlier_guard,
            last_raw: None,
            pending_raw: None,
            latest: None,
        })
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    pub fn phase(&self) -> &CalibrationPhase {
        &self.phase
    }

    pub fn is_calibrating(&self) -> bool {
        self.phase.is_calibrating()
    }

    /// Most recent classification, if any update has been emitted
    pub fn classification(&self) -> Option<&ClassificationResult> {
        self.latest.as_ref()
    }

    /// Most recent accepted raw sample, including deferred ones
    pub fn last_raw(&self) -> Option<Sample> {
        self.last_raw
    }

    /// True when a deferred sample is waiting for the rate gate
    pub fn has_pending(&self) -> bool {
        self.pending_raw.is_some()
    }

    /// Route one raw sample through the pipeline
    pub fn feed(&mut self, sample: Sample, timestamp_ms: u64) -> Result<FeedOutcome, PipelineError> {
        SampleValidator::validate(self.channel, &sample)
            .inspect_err(|err| log_pipeline_error(err, "ChannelPipeline::feed"))?;
        self.last_raw = Some(sample);

        let window_complete = match &mut self.phase {
            CalibrationPhase::Calibrating(procedure) => {
                procedure.add_sample(&sample);
                if !procedure.is_complete() {
                    return Ok(FeedOutcome::Collected(procedure.get_progress()));
                }
                true
            }
            _ => false,
        };

        if window_complete {
            if let Some(procedure) = self.take_procedure() {
                return Ok(FeedOutcome::CalibrationComplete(self.finish_pass(procedure)));
            }
        }

        if self.is_outlier(&sample) {
            log::debug!("[ChannelPipeline] {} outlier dropped: {:?}", self.channel, sample);
            return Ok(FeedOutcome::Rejected);
        }

        if !self.limiter.try_acquire(timestamp_ms) {
            self.pending_raw = Some(sample);
            return Ok(FeedOutcome::Deferred);
        }

        Ok(match self.process(sample, timestamp_ms) {
            Some(result) => FeedOutcome::Classified(result),
            None => FeedOutcome::Deferred,
        })
    }

    /// Emit the pending raw value once the rate gate reopens
    pub fn poll(&mut self, timestamp_ms: u64) -> Option<ClassificationResult> {
        if self.is_calibrating() {
            return None;
        }
        let sample = self.pending_raw?;
        if !self.limiter.try_acquire(timestamp_ms) {
            return None;
        }
        self.process(sample, timestamp_ms)
    }

    /// Start a new pass, discarding smoothing state
    pub fn begin_calibration(&mut self, pass_id: u64) -> Result<CalibrationProgress, CalibrationError> {
        if self.is_calibrating() {
            let err = CalibrationError::AlreadyInProgress;
            log_calibration_error(&err, "ChannelPipeline::begin_calibration");
            return Err(err);
        }

        self.reset_filter();
        let procedure = CalibrationProcedure::new(pass_id, self.channel, self.window_size);
        let progress = procedure.get_progress();
        self.phase = CalibrationPhase::Calibrating(procedure);

        log::info!(
            "[ChannelPipeline] {} calibration pass {} started ({} samples)",
            self.channel,
            pass_id,
            self.window_size
        );
        Ok(progress)
    }

    /// Where pass `pass_id` stands
    ///
    /// A finished pass stays `Completed` even after a newer pass has begun.
    pub fn pass_status(&self, pass_id: u64) -> PassStatus {
        if let CalibrationPhase::Calibrating(procedure) = &self.phase {
            if procedure.pass_id() == pass_id {
                return PassStatus::Running(procedure.get_progress());
            }
        }
        match &self.last_completed {
            Some((done, profile)) if *done == pass_id => PassStatus::Completed(profile.clone()),
            _ => PassStatus::Cancelled,
        }
    }

    /// Close pass `pass_id` at its deadline with whatever was collected
    ///
    /// A partial window still produces a profile. An empty window installs
    /// fallback thresholds and reports `NoSensorData`.
    pub fn expire_calibration(
        &mut self,
        pass_id: u64,
        waited_ms: u64,
    ) -> Result<CalibrationProfile, CalibrationError> {
        let owns_pass = matches!(
            &self.phase,
            CalibrationPhase::Calibrating(procedure) if procedure.pass_id() == pass_id
        );
        if !owns_pass {
            return match self.pass_status(pass_id) {
                PassStatus::Completed(profile) => Ok(profile),
                _ => Err(CalibrationError::Cancelled),
            };
        }

        let procedure = self.take_procedure().ok_or(CalibrationError::Cancelled)?;
        let collected = procedure.collected();
        let capacity = procedure.capacity();
        let profile = self.finish_pass(procedure);

        if collected == 0 {
            let err = CalibrationError::NoSensorData { waited_ms };
            log_calibration_error(&err, "ChannelPipeline::expire_calibration");
            return Err(err);
        }

        log::warn!(
            "[ChannelPipeline] {} pass {} timed out with {}/{} samples, using partial window",
            self.channel,
            pass_id,
            collected,
            capacity
        );
        Ok(profile)
    }

    /// Abandon the running pass; the previous profile stays active
    ///
    /// Returns the cancelled pass id, or `None` if nothing was running.
    pub fn cancel_calibration(&mut self) -> Option<u64> {
        let procedure = self.take_procedure()?;
        self.phase = CalibrationPhase::Idle;
        log::info!(
            "[ChannelPipeline] {} calibration pass {} cancelled",
            self.channel,
            procedure.pass_id()
        );
        Some(procedure.pass_id())
    }

    /// Forget smoothing history; the next sample seeds the filter
    pub fn reset_filter(&mut self) {
        self.filter.reset();
        self.limiter.reset();
        self.pending_raw = None;
    }

    fn take_procedure(&mut self) -> Option<CalibrationProcedure> {
        match std::mem::take(&mut self.phase) {
            CalibrationPhase::Calibrating(procedure) => Some(procedure),
            other => {
                self.phase = other;
                None
            }
        }
    }

    fn finish_pass(&mut self, procedure: CalibrationProcedure) -> CalibrationProfile {
        let pass_id = procedure.pass_id();
        let profile = if procedure.is_complete() {
            procedure.finalize(&self.motion).unwrap_or_else(|err| {
                log_calibration_error(&err, "ChannelPipeline::finish_pass");
                CalibrationProfile::fallback(self.channel, &self.motion)
            })
        } else {
            procedure.finalize_partial(&self.motion)
        };

        self.profile = profile.clone();
        self.last_completed = Some((pass_id, profile.clone()));
        self.phase = CalibrationPhase::Done { pass_id };
        self.reset_filter();

        log::info!(
            "[ChannelPipeline] {} calibration pass {} complete: {:?}",
            self.channel,
            pass_id,
            self.profile
        );
        profile
    }

    fn is_outlier(&self, sample: &Sample) -> bool {
        let Some(guard) = &self.outlier_guard else {
            return false;
        };
        if !self.profile.is_calibrated() {
            return false;
        }
        match (&self.profile, sample) {
            (CalibrationProfile::Scalar(p), Sample::Scalar(value)) => {
                guard.is_outlier(*value, p.baseline, p.standard_deviation)
            }
            (CalibrationProfile::Vector(p), Sample::Vector(v)) => {
                guard.is_outlier(v.magnitude(), p.gravity_magnitude, p.standard_deviation)
            }
            _ => false,
        }
    }

    fn process(&mut self, sample: Sample, timestamp_ms: u64) -> Option<ClassificationResult> {
        let filtered = self.filter.apply(&sample)?;
        let result = match &self.profile {
            CalibrationProfile::Scalar(p) => {
                AnomalyClassifier::classify_scalar(self.channel, filtered, p, timestamp_ms)
            }
            CalibrationProfile::Vector(p) => {
                AnomalyClassifier::classify_vector(self.channel, filtered, p, timestamp_ms)
            }
        };
        self.pending_raw = None;
        self.latest = Some(result.clone());
        Some(result)
    }
}
