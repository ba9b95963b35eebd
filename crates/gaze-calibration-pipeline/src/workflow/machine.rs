//! Workflow states and the transition table between them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level state of an interactive calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Head positioning and tracker check.
    #[default]
    Setup,
    /// Calibration target presentation and collection.
    Calibrate,
    /// Validation target presentation and sample capture.
    Validate,
    /// Attempt overview and operator decision.
    Results,
    /// The selected attempt was accepted.
    Done,
    /// The run was abandoned.
    Quit,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Quit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Calibrate => "calibrate",
            Self::Validate => "validate",
            Self::Results => "results",
            Self::Done => "done",
            Self::Quit => "quit",
        }
    }

    /// Apply `transition`, or report that the table has no such edge.
    pub fn next(self, transition: Transition) -> Result<WorkflowState, InvalidTransition> {
        use Transition as T;
        use WorkflowState as S;

        let next = match (self, transition) {
            (S::Done | S::Quit, _) => None,
            (_, T::TrackerLost) => Some(S::Quit),

            (S::Setup, T::Advance) => Some(S::Calibrate),
            (S::Setup, T::Abort) => Some(S::Quit),

            (S::Calibrate, T::CalibrationSucceeded) => Some(S::Validate),
            (S::Calibrate, T::CalibrationFailed | T::Abort) => Some(S::Setup),
            (S::Calibrate, T::Restart) => Some(S::Calibrate),

            (S::Validate, T::ValidationComplete) => Some(S::Results),
            (S::Validate, T::Abort) => Some(S::Setup),
            (S::Validate, T::Restart) => Some(S::Calibrate),

            (S::Results, T::Recalibrate) => Some(S::Setup),
            (S::Results, T::Revalidate) => Some(S::Validate),
            (S::Results, T::Accept) => Some(S::Done),
            (S::Results, T::Abort) => Some(S::Quit),

            _ => None,
        };
        next.ok_or(InvalidTransition {
            from: self,
            transition,
        })
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event that moves the workflow from one state to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Advance,
    Abort,
    Restart,
    CalibrationSucceeded,
    CalibrationFailed,
    ValidationComplete,
    Recalibrate,
    Revalidate,
    Accept,
    TrackerLost,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Advance => "advance",
            Self::Abort => "abort",
            Self::Restart => "restart",
            Self::CalibrationSucceeded => "calibration succeeded",
            Self::CalibrationFailed => "calibration failed",
            Self::ValidationComplete => "validation complete",
            Self::Recalibrate => "recalibrate",
            Self::Revalidate => "revalidate",
            Self::Accept => "accept",
            Self::TrackerLost => "tracker lost",
        };
        f.write_str(name)
    }
}

/// A `(state, transition)` pair with no entry in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no transition from `{from}` on `{transition}`")]
pub struct InvalidTransition {
    pub from: WorkflowState,
    pub transition: Transition,
}

/// Position of a run within a calibration-mode bracket.
///
/// Binocular calibration and single-eye sessions use [`CalibrationPass::Single`].
/// Bimonocular calibration runs the left and right eye as `First` and `Second`
/// inside one calibration-mode bracket, so the tracker keeps the first eye's
/// data while the second is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationPass {
    #[default]
    Single,
    First,
    Second,
}

impl CalibrationPass {
    /// Whether calibration mode is left once this pass finishes normally.
    pub fn closes_bracket(&self) -> bool {
        matches!(self, Self::Single | Self::Second)
    }
}
