//! Interface to the physical eye tracker.

use std::sync::Arc;

use anyhow::Result;
use gaze_calibration_core::{Eye, EyeSelection, Pt2, SampleHub};
use gaze_calibration_quality::DisplayArea;
use serde::{Deserialize, Serialize};

/// Data streams a tracker can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Gaze,
    UserPosition,
}

/// Outcome reported by the tracker for a calibration operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStatus {
    /// Data for every requested eye.
    Success,
    /// Data for the left eye only.
    SuccessLeftEye,
    /// Data for the right eye only.
    SuccessRightEye,
    Failure,
}

impl CalibrationStatus {
    /// Whether the outcome covers every eye in `eyes`.
    ///
    /// A single-eye success satisfies its own monocular pass but not a
    /// binocular one.
    pub fn is_success(&self, eyes: EyeSelection) -> bool {
        match self {
            Self::Success => true,
            Self::SuccessLeftEye => eyes == EyeSelection::Left,
            Self::SuccessRightEye => eyes == EyeSelection::Right,
            Self::Failure => false,
        }
    }

    /// Whether the tracker kept any data at all.
    pub fn has_data(&self) -> bool {
        !matches!(self, Self::Failure)
    }
}

/// How many of one eye's calibration samples at a point the tracker used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EyePointUsage {
    pub used: usize,
    pub unused: usize,
}

/// Per-point breakdown returned alongside a computed calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPointDiagnostics {
    /// Target position, tracker-normalized.
    pub position: Pt2,
    pub left: EyePointUsage,
    pub right: EyePointUsage,
}

/// Result of [`TrackerDevice::compute_and_apply_calibration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub status: CalibrationStatus,
    pub points: Vec<CalibrationPointDiagnostics>,
}

impl CalibrationResult {
    pub fn failed() -> Self {
        Self {
            status: CalibrationStatus::Failure,
            points: Vec::new(),
        }
    }

    /// Fraction of one eye's calibration samples the tracker used; NaN when
    /// there were none.
    pub fn used_fraction(&self, eye: Eye) -> f64 {
        let (used, total) = self.points.iter().fold((0usize, 0usize), |(u, t), p| {
            let usage = match eye {
                Eye::Left => p.left,
                Eye::Right => p.right,
            };
            (u + usage.used, t + usage.used + usage.unused)
        });
        if total == 0 {
            f64::NAN
        } else {
            used as f64 / total as f64
        }
    }
}

/// An eye tracker as seen by the workflow.
///
/// Implementations publish gaze samples into the [`SampleHub`] handed to
/// [`start_streaming`](TrackerDevice::start_streaming) from whatever thread
/// their SDK calls back on, and report loss of the device through
/// [`SampleHub::notify_disconnected`].
pub trait TrackerDevice {
    fn start_streaming(&mut self, kinds: &[StreamKind], hub: Arc<SampleHub>) -> Result<()>;

    fn stop_streaming(&mut self, kinds: &[StreamKind]) -> Result<()>;

    fn enter_calibration_mode(&mut self) -> Result<()>;

    fn leave_calibration_mode(&mut self) -> Result<()>;

    /// Collect calibration data at `point` (tracker-normalized) for `eyes`.
    fn collect_calibration_point(
        &mut self,
        point: Pt2,
        eyes: EyeSelection,
    ) -> Result<CalibrationStatus>;

    /// Drop the data collected at `point` (tracker-normalized) for `eyes`.
    fn discard_calibration_point(&mut self, point: Pt2, eyes: EyeSelection) -> Result<()>;

    /// Compute a calibration from the collected points and make it active.
    fn compute_and_apply_calibration(&mut self) -> Result<CalibrationResult>;

    /// Opaque snapshot of the active calibration.
    fn serialize_calibration(&mut self) -> Result<Vec<u8>>;

    /// Restore a snapshot produced by [`serialize_calibration`](TrackerDevice::serialize_calibration).
    fn apply_calibration(&mut self, blob: &[u8]) -> Result<()>;

    /// Display area geometry in the user coordinate system.
    fn display_area(&mut self) -> Result<DisplayArea>;
}
