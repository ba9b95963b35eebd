//! Gaze data-quality estimation for validation passes.
//!
//! Given the samples captured while each validation target was shown, the
//! estimator reports per eye:
//!
//! - **accuracy**: median angular offset between gaze and target (degrees),
//! - **precision (RMS)**: root mean square of sample-to-sample angles,
//! - **SD**: population standard deviation of the same angles,
//! - **data loss**: fraction of samples without usable data.
//!
//! Targets are placed in the user coordinate system (UCS) through the
//! tracker-reported [`DisplayArea`].
//!
//! # Example
//!
//! ```
//! use gaze_calibration_core::{EyeSelection, Pt3};
//! use gaze_calibration_core::synthetic::gaze::{Fixation, fixation_samples};
//! use gaze_calibration_quality::{ValidationPointResult, estimate_report};
//!
//! let fixation = Fixation::binocular(Pt3::new(0.0, 150.0, 600.0), Pt3::new(0.0, 150.0, 0.0));
//! let point = ValidationPointResult {
//!     target_display: fixation.target_display,
//!     target_ucs: fixation.target_ucs,
//!     samples: fixation_samples(&fixation, &[0.5; 20], 0, 1_667),
//! };
//! let summary = estimate_report(&[point], EyeSelection::Both);
//! assert!((summary.report.accuracy_left_deg - 0.5).abs() < 1e-6);
//! assert_eq!(summary.report.data_loss_right, 0.0);
//! ```

pub mod angles;
pub mod serde_nan;
pub mod stats;

mod display_area;
mod estimator;

pub use display_area::DisplayArea;
pub use estimator::{
    DataQualityReport, EyeQuality, PointQuality, PointSummary, ValidationPointResult,
    ValidationSummary, aggregate_eye, estimate_point, estimate_report,
};

use thiserror::Error;

/// Errors raised while preparing quality estimation inputs.
#[derive(Debug, Error)]
pub enum QualityError {
    #[error("display area corner `{0}` is not finite")]
    NonFiniteCorner(&'static str),
    #[error("display area corners are collinear")]
    DegenerateDisplayArea,
}
