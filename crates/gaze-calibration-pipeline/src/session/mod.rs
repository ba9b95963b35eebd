//! Calibration session container.
//!
//! A [`CalibrationSession`] is the single context object a workflow run
//! operates on: configuration, the sample hub shared with the tracker,
//! attempt repositories, workflow state and an operation log. Step
//! functions in [`crate::workflow`] mutate it in place.
//!
//! ```no_run
//! use gaze_calibration_pipeline::session::CalibrationSession;
//! use gaze_calibration_pipeline::workflow::{RunOptions, run_workflow};
//! # fn main() -> anyhow::Result<()> {
//! # let (mut tracker, mut renderer): (
//! #     gaze_calibration_pipeline::test_utils::ScriptedTracker,
//! #     gaze_calibration_pipeline::test_utils::ScriptedRenderer,
//! # ) = unimplemented!();
//!
//! let mut session = CalibrationSession::new();
//! let outcome = run_workflow(&mut session, &mut tracker, &mut renderer, Some(RunOptions::default()))?;
//!
//! println!("{}", session.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod calibsession;
pub mod types;

pub use calibsession::{CalibrationSession, SCHEMA_VERSION};
pub use types::{LogEntry, SessionMetadata, current_timestamp};
