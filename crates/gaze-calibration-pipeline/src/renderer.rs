//! Interface to the stimulus display and operator input.

use std::time::Duration;

use anyhow::Result;
use gaze_calibration_core::{CoordinateSpace, EyeSelection, Pt2, Pt3};
use gaze_calibration_quality::DataQualityReport;

use crate::workflow::WorkflowState;

/// One attempt as shown on the results screen.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptSummary {
    pub index: usize,
    /// `None` while the attempt awaits revalidation.
    pub report: Option<DataQualityReport>,
    pub used: bool,
}

/// Something for the renderer to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Live head-position overlay during setup.
    HeadPosition {
        state: WorkflowState,
        /// Eye positions in the track box, when valid.
        left: Option<Pt3>,
        right: Option<Pt3>,
        /// Current gaze on the display, tracker-normalized.
        gaze_cursor: Option<Pt2>,
    },
    /// A calibration or validation target.
    Target {
        state: WorkflowState,
        position: Pt2,
        space: CoordinateSpace,
        index: usize,
        total: usize,
    },
    Message {
        state: WorkflowState,
        text: String,
    },
    Results {
        eyes: EyeSelection,
        attempts: Vec<AttemptSummary>,
        selected: Option<usize>,
    },
}

impl Frame {
    /// Workflow state the frame was produced in.
    pub fn state(&self) -> WorkflowState {
        match self {
            Self::HeadPosition { state, .. }
            | Self::Target { state, .. }
            | Self::Message { state, .. } => *state,
            Self::Results { .. } => WorkflowState::Results,
        }
    }
}

/// Operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Advance,
    Abort,
    Restart,
    SelectAttempt(usize),
    Recalibrate,
    Revalidate,
    Accept,
}

/// Stimulus presentation and operator input.
pub trait Renderer {
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Wait up to `timeout` for operator input.
    fn poll_command(&mut self, timeout: Duration) -> Option<OperatorCommand>;
}
