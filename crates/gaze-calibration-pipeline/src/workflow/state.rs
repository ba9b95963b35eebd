//! Workflow state carried by the session between steps.

use gaze_calibration_core::Pt2;
use gaze_calibration_quality::{DataQualityReport, ValidationSummary};
use serde::{Deserialize, Serialize};

use crate::device::CalibrationResult;

use super::machine::WorkflowState;

/// Intermediate workflow state.
///
/// Fields marked `#[serde(skip)]` mirror the tracker's runtime condition and
/// are meaningless once the session is reloaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSessionState {
    /// State the last run ended in (or is currently in).
    pub current: WorkflowState,

    // ─────────────────────────────────────────────────────────────────────────
    // Tracker bracket
    // ─────────────────────────────────────────────────────────────────────────
    /// Tracker is in calibration mode.
    #[serde(skip)]
    pub in_calibration_mode: bool,

    /// Tracker is streaming into the session hub.
    #[serde(skip)]
    pub streaming: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Uncommitted attempt
    // ─────────────────────────────────────────────────────────────────────────
    /// Calibration computed in the current cycle, awaiting validation.
    pub pending_blob: Option<Vec<u8>>,

    /// Attempt whose report the running validation replaces.
    pub revalidate_index: Option<usize>,

    /// Report the attempt held before its revalidation started.
    pub previous_report: Option<DataQualityReport>,

    /// Points the tracker holds data for from this pass's latest collection.
    #[serde(skip)]
    pub pass_points: Vec<Pt2>,

    // ─────────────────────────────────────────────────────────────────────────
    // Diagnostics
    // ─────────────────────────────────────────────────────────────────────────
    /// Tracker diagnostics from the most recent calibration computation.
    pub last_calibration: Option<CalibrationResult>,

    /// Per-target breakdown of the most recent validation.
    pub last_validation: Option<ValidationSummary>,
}

impl WorkflowSessionState {
    /// Whether a calibration is waiting to be validated.
    pub fn has_pending_calibration(&self) -> bool {
        self.pending_blob.is_some()
    }

    /// Whether the running validation is a revalidation.
    pub fn is_revalidating(&self) -> bool {
        self.revalidate_index.is_some()
    }

    /// Drop everything not yet committed to a repository.
    ///
    /// Returns the attempt of an unfinished revalidation together with the
    /// report it held before, so the caller can put that report back.
    #[must_use]
    pub fn clear_uncommitted(&mut self) -> Option<(usize, Option<DataQualityReport>)> {
        self.pending_blob = None;
        let previous = self.previous_report.take();
        self.revalidate_index.take().map(|index| (index, previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_nothing_pending() {
        let state = WorkflowSessionState::default();
        assert_eq!(state.current, WorkflowState::Setup);
        assert!(!state.has_pending_calibration());
        assert!(!state.is_revalidating());
    }

    #[test]
    fn clear_uncommitted_keeps_diagnostics() {
        let mut state = WorkflowSessionState {
            pending_blob: Some(vec![1]),
            last_calibration: Some(CalibrationResult::failed()),
            ..Default::default()
        };
        assert_eq!(state.clear_uncommitted(), None);
        assert!(!state.has_pending_calibration());
        assert!(state.last_calibration.is_some());
    }

    #[test]
    fn clear_uncommitted_hands_back_unfinished_revalidation() {
        let report = DataQualityReport {
            accuracy_left_deg: 0.6,
            ..DataQualityReport::nan()
        };
        let mut state = WorkflowSessionState {
            revalidate_index: Some(2),
            previous_report: Some(report),
            ..Default::default()
        };
        let (index, previous) = state.clear_uncommitted().unwrap();
        assert_eq!(index, 2);
        assert_eq!(previous.map(|r| r.accuracy_left_deg), Some(0.6));
        assert!(!state.is_revalidating());
        assert!(state.previous_report.is_none());
        assert_eq!(state.clear_uncommitted(), None);
    }

    #[test]
    fn runtime_flags_are_not_persisted() {
        let state = WorkflowSessionState {
            in_calibration_mode: true,
            streaming: true,
            pass_points: vec![Pt2::new(0.5, 0.5)],
            pending_blob: Some(vec![7, 8]),
            ..Default::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        let restored: WorkflowSessionState = serde_json::from_str(&json).unwrap();
        assert!(!restored.in_calibration_mode);
        assert!(!restored.streaming);
        assert!(restored.pass_points.is_empty());
        assert_eq!(restored.pending_blob, Some(vec![7, 8]));
    }
}
