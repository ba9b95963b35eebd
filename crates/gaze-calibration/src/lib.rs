//! Eye-tracker calibration and validation toolkit.
//!
//! `gaze-calibration` is the facade crate over the workspace. It runs the
//! interactive calibrate → validate → review loop of a screen-based eye
//! tracker, estimates gaze data quality for every attempt and keeps the
//! attempts so the operator can pick the best one.
//!
//! # Quick Start
//!
//! ```no_run
//! use gaze_calibration::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! # let (mut tracker, mut renderer): (
//! #     gaze_calibration::test_utils::ScriptedTracker,
//! #     gaze_calibration::test_utils::ScriptedRenderer,
//! # ) = unimplemented!();
//!
//! let mut session = CalibrationSession::with_description("P07");
//! session.update_config(|c| c.pacing = Pacing::Manual)?;
//!
//! let state = run_workflow(&mut session, &mut tracker, &mut renderer, None)?;
//! if state == WorkflowState::Done {
//!     let repo = session.repository(EyeSelection::Both);
//!     println!("accepted attempt {:?}", repo.used_index());
//! }
//! std::fs::write("session.json", session.to_json()?)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! ## Workflow
//!
//! - [`session`] - Session container (`CalibrationSession`, metadata, log)
//! - [`workflow`] - State machine, configuration and step functions
//! - [`device`] - The `TrackerDevice` seam and calibration results
//! - [`renderer`] - The `Renderer` seam, frames and operator commands
//! - [`repository`] - Calibration attempts per eye selection
//!
//! ## Foundation Crates
//!
//! - [`core`] - Math types, coordinate transforms, samples and buffering
//! - [`quality`] - Accuracy, precision and data-loss estimation
//! - [`synthetic`] - Synthetic fixation data for testing
//!
//! # Workflow Steps
//!
//! | State | Step | Leaves on |
//! |-------|------|-----------|
//! | `Setup` | `step_setup` | `Advance` → `Calibrate`, `Abort` → `Quit` |
//! | `Calibrate` | `step_calibrate` | `CalibrationSucceeded` → `Validate`, `CalibrationFailed` / `Abort` → `Setup`, `Restart` → `Calibrate` |
//! | `Validate` | `step_validate` | `ValidationComplete` → `Results`, `Abort` → `Setup`, `Restart` → `Calibrate` |
//! | `Results` | `step_results` | `Recalibrate` → `Setup`, `Revalidate` → `Validate`, `Accept` → `Done`, `Abort` → `Quit` |
//!
//! `TrackerLost` leaves every non-terminal state for `Quit`.

// ═══════════════════════════════════════════════════════════════════════════════
// Workflow
// ═══════════════════════════════════════════════════════════════════════════════

/// Session container with JSON checkpointing.
pub mod session {
    pub use gaze_calibration_pipeline::session::{
        CalibrationSession, LogEntry, SCHEMA_VERSION, SessionMetadata,
    };
}

/// Calibration/validation state machine and step functions.
///
/// # Steps
/// 1. `step_setup` - Start streaming and show head position
/// 2. `step_calibrate` - Present targets, collect points, compute
/// 3. `step_validate` - Capture sample windows and estimate quality
/// 4. `step_results` - Operator review
/// 5. `step_finalize` - Mark the accepted attempt used
pub mod workflow {
    pub use gaze_calibration_pipeline::workflow::{
        // State machine
        CalibrationPass,
        InvalidTransition,
        // Configuration
        Pacing,
        // Run options
        RunOptions,
        TargetPoint,
        Transition,
        WorkflowConfig,
        WorkflowRun,
        WorkflowSessionState,
        WorkflowState,
        default_calibration_points,
        default_validation_points,
        // Step functions
        run_workflow,
        shuffled_targets,
        step_calibrate,
        step_finalize,
        step_results,
        step_setup,
        step_validate,
    };
}

/// Eye-tracker device abstraction.
pub mod device {
    pub use gaze_calibration_pipeline::device::{
        CalibrationPointDiagnostics, CalibrationResult, CalibrationStatus, EyePointUsage,
        StreamKind, TrackerDevice,
    };
}

/// Display abstraction driven by the workflow.
pub mod renderer {
    pub use gaze_calibration_pipeline::renderer::{
        AttemptSummary, Frame, OperatorCommand, Renderer,
    };
}

/// Calibration attempt storage.
pub mod repository {
    pub use gaze_calibration_pipeline::repository::{
        CalibrationAttempt, CalibrationRepository, RepositorySet,
    };
}

/// Scripted tracker, renderer and simulated participant for tests.
pub mod test_utils {
    pub use gaze_calibration_pipeline::test_utils::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Foundation Crates
// ═══════════════════════════════════════════════════════════════════════════════

/// Core math types, coordinate transforms and sample buffering.
pub mod core {
    pub use gaze_calibration_core::*;
}

/// Gaze data-quality estimation.
pub mod quality {
    pub use gaze_calibration_quality::*;
}

/// Synthetic gaze data generation.
pub mod synthetic {
    pub use gaze_calibration_core::synthetic::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Top-Level Re-exports
// ═══════════════════════════════════════════════════════════════════════════════

pub use gaze_calibration_core::{
    CoordinateSpace, Eye, EyeSample, EyeSelection, GazeSample, MonitorGeometry, Pt2, Pt3, Real,
    SampleHub, SampleWindowBuffer, Vec2, Vec3, convert,
};
pub use gaze_calibration_pipeline::{WorkflowError, run_workflow};
pub use gaze_calibration_quality::{
    DataQualityReport, DisplayArea, EyeQuality, ValidationPointResult, ValidationSummary,
    estimate_report,
};

/// Prelude module for convenient imports.
///
/// ```no_run
/// use gaze_calibration::prelude::*;
/// ```
pub mod prelude {
    // Session and workflow
    pub use crate::session::CalibrationSession;
    pub use crate::workflow::{CalibrationPass, Pacing, RunOptions, WorkflowConfig, WorkflowState};
    pub use crate::{WorkflowError, run_workflow};

    // Seams
    pub use crate::device::{CalibrationResult, TrackerDevice};
    pub use crate::renderer::{Frame, OperatorCommand, Renderer};

    // Core types
    pub use crate::{
        CoordinateSpace, DataQualityReport, DisplayArea, Eye, EyeSelection, GazeSample,
        MonitorGeometry, Pt2, Pt3, Real,
    };
}
