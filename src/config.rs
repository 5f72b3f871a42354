//! Configuration management for calibration and filtering parameters
//!
//! This module provides runtime configuration loading from JSON files so
//! window sizes, smoothing coefficients, and anomaly thresholds can be tuned
//! without recompilation. Missing or malformed files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::PipelineError;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub motion: MotionConfig,
}

/// Calibration pass configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Number of raw samples collected per channel (about 1 s at 60 Hz)
    pub window_size: usize,
    /// Progress tick rate while a pass is running
    pub tick_rate_hz: u32,
    /// Upper bound on a pass; zero samples by then means no sensor
    pub timeout_ms: u64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            window_size: 60,
            tick_rate_hz: 60,
            timeout_ms: 5_000,
        }
    }
}

/// Smoothing, rate limiting, and outlier parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Smoothing coefficient for the scalar field channel (lower = smoother)
    pub field_alpha: f64,
    /// Per-axis smoothing coefficient for the motion channel
    pub motion_alpha: f64,
    /// Minimum interval between classification outputs
    pub min_update_interval_ms: u64,
    /// Standard deviations for outlier rejection
    pub outlier_sigma: f64,
    /// Drop calibrated-channel samples beyond `outlier_sigma` before smoothing
    #[serde(default)]
    pub reject_outliers: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            field_alpha: 0.3,
            motion_alpha: 0.4,
            min_update_interval_ms: 50,
            outlier_sigma: 3.0,
            reject_outliers: false,
        }
    }
}

/// Motion channel anomaly parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Allowed deviation (m/s²) from the rest magnitude before an anomaly
    pub deviation_threshold: f64,
    /// Rest magnitude used when no motion sample was calibrated
    pub default_gravity: f64,
    /// Scale applied to the gravity deviation when acceleration stands in
    /// for a missing magnetometer
    pub pseudo_field_scale: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            deviation_threshold: 3.0,
            default_gravity: 9.8,
            pseudo_field_scale: 8.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults when the file is missing,
    /// unparsable, or fails validation.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                Ok(config) => match config.validate() {
                    Ok(()) => {
                        log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                        config
                    }
                    Err(err) => {
                        log::warn!(
                            "[Config] Rejected configuration from {:?}: {}. Using defaults.",
                            path.as_ref(),
                            err
                        );
                        Self::default()
                    }
                },
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Check every parameter against its valid range
    pub fn validate(&self) -> Result<(), PipelineError> {
        check_alpha("filter.field_alpha", self.filter.field_alpha)?;
        check_alpha("filter.motion_alpha", self.filter.motion_alpha)?;
        if self.calibration.window_size == 0 {
            return Err(invalid("calibration.window_size", 0.0));
        }
        if self.calibration.tick_rate_hz == 0 {
            return Err(invalid("calibration.tick_rate_hz", 0.0));
        }
        if !(self.filter.outlier_sigma.is_finite() && self.filter.outlier_sigma > 0.0) {
            return Err(invalid("filter.outlier_sigma", self.filter.outlier_sigma));
        }
        if !self.motion.default_gravity.is_finite() || self.motion.default_gravity < 0.0 {
            return Err(invalid("motion.default_gravity", self.motion.default_gravity));
        }
        Ok(())
    }
}

fn check_alpha(name: &str, alpha: f64) -> Result<(), PipelineError> {
    if alpha > 0.0 && alpha <= 1.0 {
        Ok(())
    } else {
        Err(invalid(name, alpha))
    }
}

fn invalid(name: &str, value: f64) -> PipelineError {
    PipelineError::InvalidParameter {
        name: name.to_string(),
        value,
    }
}
