//! Interactive calibration/validation workflow.
//!
//! # Pipeline
//!
//! A run moves through the states of [`WorkflowState`]:
//!
//! 1. **Setup**: start streaming, show head position until the operator advances
//! 2. **Calibrate**: present shuffled calibration targets, collect each point,
//!    compute and apply the calibration
//! 3. **Validate**: present shuffled validation targets, capture a sample window
//!    per target and estimate data quality
//! 4. **Results**: let the operator recalibrate, revalidate or accept an attempt
//!
//! ending in `Done` (an attempt was accepted) or `Quit`.
//!
//! # Example
//!
//! ```
//! use gaze_calibration_core::EyeSelection;
//! use gaze_calibration_pipeline::renderer::OperatorCommand;
//! use gaze_calibration_pipeline::session::CalibrationSession;
//! use gaze_calibration_pipeline::test_utils::{
//!     ScriptedRenderer, ScriptedTracker, SimulatedParticipant, fast_config,
//! };
//! use gaze_calibration_pipeline::workflow::{RunOptions, WorkflowState, run_workflow};
//! # fn main() -> anyhow::Result<()> {
//!
//! let mut session = CalibrationSession::with_config(fast_config())?;
//! let mut tracker = ScriptedTracker::new();
//! let participant = SimulatedParticipant::new(
//!     session.hub().clone(),
//!     tracker.display_area,
//!     session.config().monitor,
//! );
//! let mut renderer = ScriptedRenderer::new([OperatorCommand::Advance, OperatorCommand::Accept])
//!     .with_participant(participant);
//!
//! let state = run_workflow(&mut session, &mut tracker, &mut renderer, Some(RunOptions::default()))?;
//! assert_eq!(state, WorkflowState::Done);
//! assert_eq!(session.repository(EyeSelection::Both).used_index(), Some(0));
//! # Ok(())
//! # }
//! ```

mod config;
mod machine;
mod state;
mod steps;
mod targets;

pub use config::{Pacing, WorkflowConfig, default_calibration_points, default_validation_points};
pub use machine::{CalibrationPass, InvalidTransition, Transition, WorkflowState};
pub use state::WorkflowSessionState;
pub use steps::{
    RunOptions, WorkflowRun, run_workflow, step_calibrate, step_finalize, step_results,
    step_setup, step_validate,
};
pub use targets::{TargetPoint, shuffled_targets};
