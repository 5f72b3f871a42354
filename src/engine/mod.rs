//! Engine module housing the sensor orchestration layer.
//!
//! `clock` provides the monotonic time sources used to stamp samples and
//! `core` exposes the `SensorEngine` handle shared by the CLI and tests.

pub mod clock;
pub mod core;

pub use clock::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use core::{PendingCalibration, SensorEngine};
