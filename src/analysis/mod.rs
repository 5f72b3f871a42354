// Analysis module - per-sample signal processing
//
// Leaf algorithms shared by every channel pipeline:
// - SmoothingFilter: exponential low-pass with resettable state
// - OutlierGuard: k-sigma rejection primitive
// - AnomalyClassifier: filtered value vs calibrated thresholds

pub mod classifier;
pub mod outlier;
pub mod smoothing;

pub use classifier::{AnomalyClassifier, AnomalyEvent, ClassificationResult, Severity};
pub use outlier::{is_outlier, OutlierGuard, DEFAULT_OUTLIER_SIGMA};
pub use smoothing::SmoothingFilter;
