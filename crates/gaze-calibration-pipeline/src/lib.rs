//! Calibration/validation workflow engine for screen-based eye trackers.
//!
//! This crate drives an eye tracker through calibration target presentation,
//! per-eye calibration computation and validation sample capture, estimates
//! gaze data quality for every attempt and lets the operator redo, compare
//! and accept attempts.
//!
//! ## Session API
//!
//! A [`CalibrationSession`] holds configuration, attempt repositories and
//! workflow state. The tracker and the display are external collaborators
//! behind the [`TrackerDevice`] and [`Renderer`] traits.
//!
//! ```no_run
//! use gaze_calibration_core::EyeSelection;
//! use gaze_calibration_pipeline::{CalibrationPass, CalibrationSession, RunOptions, run_workflow};
//! # fn main() -> anyhow::Result<()> {
//! # let (mut tracker, mut renderer): (
//! #     gaze_calibration_pipeline::test_utils::ScriptedTracker,
//! #     gaze_calibration_pipeline::test_utils::ScriptedRenderer,
//! # ) = unimplemented!();
//!
//! let mut session = CalibrationSession::with_description("P07");
//!
//! // Bimonocular calibration: left then right inside one calibration-mode bracket.
//! for (eyes, pass) in [
//!     (EyeSelection::Left, CalibrationPass::First),
//!     (EyeSelection::Right, CalibrationPass::Second),
//! ] {
//!     run_workflow(&mut session, &mut tracker, &mut renderer, Some(RunOptions { eyes, pass }))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod error;
pub mod renderer;
pub mod repository;
pub mod session;
pub mod test_utils;
pub mod workflow;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use crate::device::{
    CalibrationPointDiagnostics, CalibrationResult, CalibrationStatus, EyePointUsage, StreamKind,
    TrackerDevice,
};
pub use crate::error::WorkflowError;
pub use crate::renderer::{AttemptSummary, Frame, OperatorCommand, Renderer};
pub use crate::repository::{CalibrationAttempt, CalibrationRepository, RepositorySet};
pub use crate::session::{CalibrationSession, LogEntry, SessionMetadata};
pub use crate::workflow::{
    CalibrationPass, InvalidTransition, Pacing, RunOptions, Transition, WorkflowConfig,
    WorkflowSessionState, WorkflowState, run_workflow,
};
