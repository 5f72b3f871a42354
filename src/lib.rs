// Sensor Sentinel Core - calibration and anomaly classification
// Per-channel pipelines: calibrate at rest, smooth, classify against thresholds

// Module declarations
pub mod analysis;
pub mod calibration;
pub mod config;
pub mod engine;
pub mod error;
pub mod managers;
pub mod pipeline;
pub mod sensors;
pub mod telemetry;

// Re-exports for convenience
pub use analysis::{AnomalyEvent, ClassificationResult, Severity};
pub use calibration::{CalibrationProfile, CalibrationProgress, ScalarProfile, VectorProfile};
pub use config::AppConfig;
pub use engine::{ManualTimeSource, PendingCalibration, SensorEngine, SystemTimeSource, TimeSource};
pub use error::{CalibrationError, ErrorCode, PipelineError};
pub use pipeline::FeedOutcome;
pub use sensors::{ChannelId, Sample, Vector3};
pub use telemetry::SessionExport;

use tracing_subscriber::EnvFilter;

/// Initialize logging for binaries
///
/// Honors `RUST_LOG`, defaulting to `info`. `log` records from library
/// code are forwarded through tracing-subscriber's log bridge. Safe to call
/// more than once; later calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
