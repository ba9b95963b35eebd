//! Scripted collaborators for driving the workflow without hardware.
//!
//! [`ScriptedTracker`] records every call it receives and can be told to
//! fail, stay silent or disconnect. [`ScriptedRenderer`] records every frame
//! and answers operator prompts from a queue; an optional
//! [`SimulatedParticipant`] publishes gaze samples that fixate whatever target
//! is on screen.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use gaze_calibration_core::synthetic::gaze::{Fixation, fixation_sample, sample_at};
use gaze_calibration_core::{
    CoordinateSpace, Eye, EyeSelection, MonitorGeometry, Pt2, Pt3, Real, SampleHub, convert,
};
use gaze_calibration_quality::DisplayArea;

use crate::device::{
    CalibrationPointDiagnostics, CalibrationResult, CalibrationStatus, EyePointUsage, StreamKind,
    TrackerDevice,
};
use crate::renderer::{Frame, OperatorCommand, Renderer};
use crate::workflow::{WorkflowConfig, WorkflowState};

/// Interval between simulated samples (600 Hz).
const SAMPLE_INTERVAL_US: i64 = 1_667;

/// A 509.8 × 286.8 mm display below and in front of the tracker origin.
pub fn standard_display_area() -> DisplayArea {
    DisplayArea {
        top_left: Pt3::new(-254.9, 301.2, 63.4),
        top_right: Pt3::new(254.9, 301.2, 63.4),
        bottom_left: Pt3::new(-254.9, 15.5, -1.2),
    }
}

/// Default configuration with every wait shortened to (almost) nothing and a
/// fixed shuffle seed.
pub fn fast_config() -> WorkflowConfig {
    WorkflowConfig {
        dwell_ms: 0,
        capture_window_ms: 0,
        poll_interval_ms: 1,
        head_check_timeout_ms: 1000,
        shuffle_seed: Some(42),
        ..Default::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracker
// ─────────────────────────────────────────────────────────────────────────────

/// A call received by [`ScriptedTracker`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerCall {
    StartStreaming,
    StopStreaming,
    EnterCalibrationMode,
    LeaveCalibrationMode,
    CollectPoint { point: Pt2, eyes: EyeSelection },
    DiscardPoint { point: Pt2, eyes: EyeSelection },
    ComputeAndApply,
    Serialize,
    Apply(Vec<u8>),
    DisplayArea,
}

/// In-memory tracker.
///
/// Calibration snapshots are `b"calibration-<n>"` where `n` counts successful
/// computations.
#[derive(Debug)]
pub struct ScriptedTracker {
    pub calls: Vec<TrackerCall>,
    /// Number of upcoming point collections that report failure.
    pub collect_failures: usize,
    /// Number of upcoming point collections that only get the left eye.
    pub left_only_collects: usize,
    /// Number of upcoming calibration computations that report failure.
    pub compute_failures: usize,
    /// Publish nothing when streaming starts.
    pub silent: bool,
    /// Signal a disconnect after this many point collections.
    pub disconnect_after_collects: Option<usize>,
    pub display_area: DisplayArea,
    hub: Option<Arc<SampleHub>>,
    collected: Vec<(Pt2, EyeSelection)>,
    collects: usize,
    computed: usize,
    active: Option<Vec<u8>>,
}

impl Default for ScriptedTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTracker {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            collect_failures: 0,
            left_only_collects: 0,
            compute_failures: 0,
            silent: false,
            disconnect_after_collects: None,
            display_area: standard_display_area(),
            hub: None,
            collected: Vec::new(),
            collects: 0,
            computed: 0,
            active: None,
        }
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&TrackerCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Every collection request in call order.
    pub fn collected_points(&self) -> Vec<(Pt2, EyeSelection)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                TrackerCall::CollectPoint { point, eyes } => Some((*point, *eyes)),
                _ => None,
            })
            .collect()
    }

    /// Points the device currently holds calibration data for.
    pub fn held_points(&self) -> &[(Pt2, EyeSelection)] {
        &self.collected
    }

    /// Calibration currently active on the device.
    pub fn active_calibration(&self) -> Option<&[u8]> {
        self.active.as_deref()
    }
}

impl TrackerDevice for ScriptedTracker {
    fn start_streaming(&mut self, _kinds: &[StreamKind], hub: Arc<SampleHub>) -> Result<()> {
        self.calls.push(TrackerCall::StartStreaming);
        if !self.silent {
            hub.publish(sample_at(0));
        }
        self.hub = Some(hub);
        Ok(())
    }

    fn stop_streaming(&mut self, _kinds: &[StreamKind]) -> Result<()> {
        self.calls.push(TrackerCall::StopStreaming);
        self.hub = None;
        Ok(())
    }

    fn enter_calibration_mode(&mut self) -> Result<()> {
        self.calls.push(TrackerCall::EnterCalibrationMode);
        self.collected.clear();
        Ok(())
    }

    fn leave_calibration_mode(&mut self) -> Result<()> {
        self.calls.push(TrackerCall::LeaveCalibrationMode);
        Ok(())
    }

    fn collect_calibration_point(
        &mut self,
        point: Pt2,
        eyes: EyeSelection,
    ) -> Result<CalibrationStatus> {
        self.calls.push(TrackerCall::CollectPoint { point, eyes });
        self.collects += 1;
        if self.disconnect_after_collects == Some(self.collects) {
            if let Some(hub) = &self.hub {
                hub.notify_disconnected();
            }
        }
        if self.collect_failures > 0 {
            self.collect_failures -= 1;
            return Ok(CalibrationStatus::Failure);
        }
        if self.left_only_collects > 0 {
            self.left_only_collects -= 1;
            self.collected.push((point, EyeSelection::Left));
            return Ok(CalibrationStatus::SuccessLeftEye);
        }
        self.collected.push((point, eyes));
        Ok(match eyes {
            EyeSelection::Both => CalibrationStatus::Success,
            EyeSelection::Left => CalibrationStatus::SuccessLeftEye,
            EyeSelection::Right => CalibrationStatus::SuccessRightEye,
        })
    }

    fn discard_calibration_point(&mut self, point: Pt2, eyes: EyeSelection) -> Result<()> {
        self.calls.push(TrackerCall::DiscardPoint { point, eyes });
        self.collected
            .retain(|&(p, e)| !(p == point && (eyes == EyeSelection::Both || e == eyes)));
        Ok(())
    }

    fn compute_and_apply_calibration(&mut self) -> Result<CalibrationResult> {
        self.calls.push(TrackerCall::ComputeAndApply);
        if self.compute_failures > 0 {
            self.compute_failures -= 1;
            return Ok(CalibrationResult::failed());
        }
        self.computed += 1;
        self.active = Some(format!("calibration-{}", self.computed).into_bytes());
        let usage = |eyes: EyeSelection, eye: Eye| {
            if eyes.includes(eye) {
                EyePointUsage { used: 10, unused: 0 }
            } else {
                EyePointUsage::default()
            }
        };
        Ok(CalibrationResult {
            status: CalibrationStatus::Success,
            points: self
                .collected
                .iter()
                .map(|&(position, eyes)| CalibrationPointDiagnostics {
                    position,
                    left: usage(eyes, Eye::Left),
                    right: usage(eyes, Eye::Right),
                })
                .collect(),
        })
    }

    fn serialize_calibration(&mut self) -> Result<Vec<u8>> {
        self.calls.push(TrackerCall::Serialize);
        match &self.active {
            Some(blob) => Ok(blob.clone()),
            None => bail!("no calibration to serialize"),
        }
    }

    fn apply_calibration(&mut self, blob: &[u8]) -> Result<()> {
        self.calls.push(TrackerCall::Apply(blob.to_vec()));
        self.active = Some(blob.to_vec());
        Ok(())
    }

    fn display_area(&mut self) -> Result<DisplayArea> {
        self.calls.push(TrackerCall::DisplayArea);
        Ok(self.display_area)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Participant
// ─────────────────────────────────────────────────────────────────────────────

/// Looks at the current target (or the screen center) with a fixed angular
/// error, publishing a burst of samples each time the workflow polls for
/// input.
#[derive(Debug)]
pub struct SimulatedParticipant {
    hub: Arc<SampleHub>,
    display_area: DisplayArea,
    monitor: MonitorGeometry,
    pub eye_center: Pt3,
    pub offset_deg: Real,
    pub samples_per_poll: usize,
    clock_us: i64,
}

impl SimulatedParticipant {
    pub fn new(hub: Arc<SampleHub>, display_area: DisplayArea, monitor: MonitorGeometry) -> Self {
        Self {
            hub,
            display_area,
            monitor,
            eye_center: Pt3::new(0.0, 160.0, 650.0),
            offset_deg: 0.0,
            samples_per_poll: 12,
            clock_us: 0,
        }
    }

    pub fn with_offset(mut self, offset_deg: Real) -> Self {
        self.offset_deg = offset_deg;
        self
    }

    fn look_at(&mut self, frame: Option<&Frame>) {
        let center = Pt2::new(0.5, 0.5);
        let target = match frame {
            Some(Frame::Target {
                position, space, ..
            }) => convert(
                &[*position],
                *space,
                CoordinateSpace::TrackerNormalized,
                &self.monitor,
            )
            .into_iter()
            .next()
            .unwrap_or(center),
            _ => center,
        };
        let fixation = Fixation::binocular(self.eye_center, self.display_area.to_ucs(&target))
            .with_display(target);
        for _ in 0..self.samples_per_poll {
            self.clock_us += SAMPLE_INTERVAL_US;
            self.hub
                .publish(fixation_sample(&fixation, self.offset_deg, self.clock_us));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Renderer that records frames and replays operator commands.
///
/// Commands in the queue answer operator prompts (head-position and results
/// screens); once the queue is empty every prompt is answered with
/// [`OperatorCommand::Abort`], so a run always terminates. Targets only see
/// commands registered with [`interrupt_at`](Self::interrupt_at), or an
/// advance when [`advancing_targets`](Self::advancing_targets) is set.
#[derive(Debug, Default)]
pub struct ScriptedRenderer {
    pub frames: Vec<Frame>,
    commands: VecDeque<OperatorCommand>,
    /// `(state, visit, index, command)`; `visit` counts earlier showings of
    /// the same target.
    interrupts: Vec<(WorkflowState, usize, usize, OperatorCommand)>,
    advance_targets: bool,
    participant: Option<SimulatedParticipant>,
}

impl ScriptedRenderer {
    pub fn new(commands: impl IntoIterator<Item = OperatorCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_participant(mut self, participant: SimulatedParticipant) -> Self {
        self.participant = Some(participant);
        self
    }

    /// Issue `command` once while target `index` of `state` is shown.
    pub fn interrupt_at(self, state: WorkflowState, index: usize, command: OperatorCommand) -> Self {
        self.interrupt_at_visit(state, 0, index, command)
    }

    /// Like [`interrupt_at`](Self::interrupt_at), but only on the `visit`-th
    /// (zero-based) showing of that target.
    pub fn interrupt_at_visit(
        mut self,
        state: WorkflowState,
        visit: usize,
        index: usize,
        command: OperatorCommand,
    ) -> Self {
        self.interrupts.push((state, visit, index, command));
        self
    }

    /// Answer every target with [`OperatorCommand::Advance`].
    pub fn advancing_targets(mut self) -> Self {
        self.advance_targets = true;
        self
    }

    /// Target frames presented in `state`.
    pub fn targets_in(&self, state: WorkflowState) -> Vec<&Frame> {
        self.frames
            .iter()
            .filter(|f| matches!(f, Frame::Target { .. }) && f.state() == state)
            .collect()
    }

    /// Messages presented so far.
    pub fn messages(&self) -> Vec<&str> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                Frame::Message { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn remaining_commands(&self) -> usize {
        self.commands.len()
    }
}

impl Renderer for ScriptedRenderer {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn poll_command(&mut self, _timeout: Duration) -> Option<OperatorCommand> {
        let current = self.frames.last();
        if let Some(participant) = self.participant.as_mut() {
            participant.look_at(current);
        }
        match current {
            Some(Frame::Target { state, index, .. }) => {
                let (state, index) = (*state, *index);
                let shown = self
                    .frames
                    .iter()
                    .filter(|f| {
                        matches!(f, Frame::Target { state: s, index: i, .. } if *s == state && *i == index)
                    })
                    .count();
                let visit = shown.saturating_sub(1);
                let hit = self
                    .interrupts
                    .iter()
                    .position(|&(s, v, i, _)| s == state && v == visit && i == index);
                match hit {
                    Some(pos) => Some(self.interrupts.remove(pos).3),
                    None if self.advance_targets => Some(OperatorCommand::Advance),
                    None => None,
                }
            }
            Some(Frame::HeadPosition { .. } | Frame::Results { .. }) => {
                Some(self.commands.pop_front().unwrap_or(OperatorCommand::Abort))
            }
            _ => None,
        }
    }
}
