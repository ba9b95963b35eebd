//! Fatal workflow errors.
//!
//! These are returned wrapped in [`anyhow::Error`]; callers that need to react
//! to a specific condition use `downcast_ref::<WorkflowError>()`.

use thiserror::Error;

pub use crate::workflow::InvalidTransition;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No gaze sample arrived during the setup head check.
    #[error("no gaze data received within {timeout_ms} ms; check the tracker connection")]
    TrackerUnavailable { timeout_ms: u64 },

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// Validation finished with no calibration to attach the report to.
    #[error("validation finished without a pending calibration")]
    NoPendingCalibration,
}
