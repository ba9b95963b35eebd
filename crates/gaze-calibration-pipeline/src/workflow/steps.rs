//! Step functions for the calibration/validation workflow.
//!
//! Each `step_*` function runs the entry action of one [`WorkflowState`] and
//! returns the [`Transition`] that ended it. [`run_workflow`] drives them
//! through the transition table until a terminal state is reached.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use gaze_calibration_core::{Eye, EyeSample, EyeSelection, GazeSample, Pt2, SampleHub};
use gaze_calibration_quality::{ValidationPointResult, estimate_report};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::device::{CalibrationResult, StreamKind, TrackerDevice};
use crate::error::WorkflowError;
use crate::renderer::{AttemptSummary, Frame, OperatorCommand, Renderer};
use crate::repository::{CalibrationAttempt, CalibrationRepository};
use crate::session::CalibrationSession;

use super::config::Pacing;
use super::machine::{CalibrationPass, Transition, WorkflowState};
use super::targets::shuffled_targets;

const STREAMS: &[StreamKind] = &[StreamKind::Gaze];

// ─────────────────────────────────────────────────────────────────────────────
// Run context
// ─────────────────────────────────────────────────────────────────────────────

/// Which eyes a run calibrates and where it sits in a calibration-mode bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunOptions {
    pub eyes: EyeSelection,
    pub pass: CalibrationPass,
}

/// Collaborators and per-run settings shared by the step functions.
pub struct WorkflowRun<'a> {
    pub tracker: &'a mut dyn TrackerDevice,
    pub renderer: &'a mut dyn Renderer,
    pub eyes: EyeSelection,
    pub pass: CalibrationPass,
    rng: StdRng,
}

impl<'a> WorkflowRun<'a> {
    /// `seed` fixes target order; `None` seeds from the OS.
    pub fn new(
        tracker: &'a mut dyn TrackerDevice,
        renderer: &'a mut dyn Renderer,
        opts: RunOptions,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            tracker,
            renderer,
            eyes: opts.eyes,
            pass: opts.pass,
            rng,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

enum Wait {
    Elapsed,
    Advanced,
    Interrupted(Transition),
}

/// Wait for `duration` (or for an advance when `None`) while watching for
/// operator interrupts and tracker loss.
fn wait_for(
    run: &mut WorkflowRun<'_>,
    hub: &SampleHub,
    duration: Option<Duration>,
    poll: Duration,
    advance_ends: bool,
) -> Wait {
    let deadline = duration.map(|d| Instant::now() + d);
    loop {
        if hub.is_disconnected() {
            return Wait::Interrupted(Transition::TrackerLost);
        }
        let timeout = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()).min(poll),
            None => poll,
        };
        match run.renderer.poll_command(timeout) {
            Some(OperatorCommand::Abort) => return Wait::Interrupted(Transition::Abort),
            Some(OperatorCommand::Restart) => return Wait::Interrupted(Transition::Restart),
            Some(OperatorCommand::Advance) if advance_ends => return Wait::Advanced,
            Some(other) => debug!("ignoring {other:?} while a target is shown"),
            None => {}
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Wait::Elapsed;
        }
    }
}

/// Outcome of collecting one calibration point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    /// Data for every eye of the pass.
    Complete,
    /// Data for some of the pass's eyes only.
    Partial,
    Missing,
}

/// Collect one calibration point, retrying once.
fn collect_with_retry(run: &mut WorkflowRun<'_>, point: Pt2) -> Collection {
    let mut outcome = Collection::Missing;
    for attempt in 1..=2 {
        match run.tracker.collect_calibration_point(point, run.eyes) {
            Ok(status) if status.is_success(run.eyes) => return Collection::Complete,
            Ok(status) => {
                if status.has_data() {
                    outcome = Collection::Partial;
                }
                debug!(
                    "collection at ({:.2}, {:.2}) returned {status:?} on attempt {attempt}",
                    point.x, point.y
                )
            }
            Err(e) => debug!(
                "collection at ({:.2}, {:.2}) errored on attempt {attempt}: {e:#}",
                point.x, point.y
            ),
        }
    }
    warn!(
        "incomplete calibration data at ({:.2}, {:.2}): {outcome:?}",
        point.x, point.y
    );
    outcome
}

/// Put back the report of an attempt whose revalidation was abandoned and
/// drop the rest of the uncommitted state.
fn discard_uncommitted(session: &mut CalibrationSession, eyes: EyeSelection) -> Result<()> {
    if let Some((index, previous)) = session.state.clear_uncommitted() {
        if let Some(report) = previous {
            session.repository_mut(eyes).replace_report(index, report)?;
        }
        info!("revalidation of attempt {index} abandoned; previous report kept");
    }
    Ok(())
}

/// Make sure the tracker is in calibration mode and holds no data from an
/// earlier, discarded collection of this pass.
///
/// A `Single` pass leaves and re-enters calibration mode. `First` and
/// `Second` passes share the bracket with the other eye, so only the points
/// this pass collected are discarded.
fn prepare_collection(session: &mut CalibrationSession, run: &mut WorkflowRun<'_>) -> Result<()> {
    let stale = std::mem::take(&mut session.state.pass_points);
    if session.state.in_calibration_mode && !stale.is_empty() {
        match run.pass {
            CalibrationPass::Single => {
                run.tracker
                    .leave_calibration_mode()
                    .context("failed to leave calibration mode")?;
                session.state.in_calibration_mode = false;
                debug!("left calibration mode to drop {} stale points", stale.len());
            }
            CalibrationPass::First | CalibrationPass::Second => {
                for point in &stale {
                    run.tracker
                        .discard_calibration_point(*point, run.eyes)
                        .context("failed to discard calibration point")?;
                }
                debug!(
                    "discarded {} stale points for {} eye(s)",
                    stale.len(),
                    run.eyes.as_str()
                );
            }
        }
    }
    if !session.state.in_calibration_mode {
        run.tracker
            .enter_calibration_mode()
            .context("failed to enter calibration mode")?;
        session.state.in_calibration_mode = true;
        info!("entered calibration mode");
    }
    Ok(())
}

fn head_frame(sample: &GazeSample) -> Frame {
    let origin = |e: &EyeSample| e.origin_valid.then_some(e.gaze_origin_trackbox);
    Frame::HeadPosition {
        state: WorkflowState::Setup,
        left: origin(&sample.left),
        right: origin(&sample.right),
        gaze_cursor: sample.gaze_cursor(),
    }
}

fn results_frame(repo: &CalibrationRepository, eyes: EyeSelection) -> Frame {
    Frame::Results {
        eyes,
        attempts: repo
            .attempts()
            .iter()
            .enumerate()
            .map(|(index, attempt)| AttemptSummary {
                index,
                report: attempt.report,
                used: attempt.used,
            })
            .collect(),
        selected: repo.selected_index(),
    }
}

/// Make the selected attempt active on the tracker and return its index.
fn apply_selected(session: &CalibrationSession, run: &mut WorkflowRun<'_>) -> Result<Option<usize>> {
    let repo = session.repository(run.eyes);
    let Some(index) = repo.selected_index() else {
        return Ok(None);
    };
    let attempt = repo
        .get(index)
        .ok_or_else(|| anyhow!("selected attempt {index} missing"))?;
    run.tracker
        .apply_calibration(&attempt.calibration_blob)
        .with_context(|| format!("failed to apply attempt {index}"))?;
    Ok(Some(index))
}

fn fmt_used(result: &CalibrationResult, eye: Eye) -> String {
    let fraction = result.used_fraction(eye);
    if fraction.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.0}%", fraction * 100.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Step Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Start streaming if needed and show the head-position overlay until the
/// operator advances.
///
/// # Errors
///
/// Returns [`WorkflowError::TrackerUnavailable`] when no sample arrives within
/// the configured head-check timeout.
pub fn step_setup(session: &mut CalibrationSession, run: &mut WorkflowRun<'_>) -> Result<Transition> {
    let hub = Arc::clone(session.hub());
    if !session.state.streaming {
        hub.reset_latest();
        run.tracker
            .start_streaming(STREAMS, Arc::clone(&hub))
            .context("failed to start gaze streaming")?;
        session.state.streaming = true;
    }

    let poll = session.config().poll_interval();
    let timeout = session.config().head_check_timeout();
    let started = Instant::now();
    let mut seen = false;
    let mut waiting_shown = false;

    loop {
        if hub.is_disconnected() {
            return Ok(Transition::TrackerLost);
        }
        match hub.latest() {
            Some(sample) => {
                seen = true;
                run.renderer.present(&head_frame(&sample))?;
            }
            None if !waiting_shown => {
                run.renderer.present(&Frame::Message {
                    state: WorkflowState::Setup,
                    text: "Waiting for gaze data...".to_string(),
                })?;
                waiting_shown = true;
            }
            None => {}
        }

        match run.renderer.poll_command(poll) {
            Some(OperatorCommand::Advance) if seen => return Ok(Transition::Advance),
            Some(OperatorCommand::Advance) => {
                warn!("cannot start calibration before the tracker delivers data")
            }
            Some(OperatorCommand::Abort) => return Ok(Transition::Abort),
            Some(other) => debug!("ignoring {other:?} during setup"),
            None => {}
        }

        if !seen && started.elapsed() >= timeout {
            return Err(WorkflowError::TrackerUnavailable {
                timeout_ms: session.config().head_check_timeout_ms,
            }
            .into());
        }
    }
}

/// Present calibration targets, collect each, then compute and apply.
///
/// Calibration mode is entered on first use and kept across steps; see
/// [`run_workflow`] for when it is left. Data the tracker still holds from an
/// earlier collection of the same pass is dropped first, so every attempt is
/// computed from its own points only.
pub fn step_calibrate(
    session: &mut CalibrationSession,
    run: &mut WorkflowRun<'_>,
) -> Result<Transition> {
    discard_uncommitted(session, run.eyes)?;
    prepare_collection(session, run)?;

    let hub = Arc::clone(session.hub());
    let config = session.config().clone();
    let targets = shuffled_targets(
        &config.calibration_points,
        config.renderer_space,
        &config.monitor,
        &mut run.rng,
    );
    let total = targets.len();
    let dwell = match config.pacing {
        Pacing::Dwell => Some(config.dwell()),
        Pacing::Manual => None,
    };

    let mut collected = 0;
    for (index, target) in targets.iter().enumerate() {
        if hub.is_disconnected() {
            return Ok(Transition::TrackerLost);
        }
        run.renderer.present(&Frame::Target {
            state: WorkflowState::Calibrate,
            position: target.display_position,
            space: config.renderer_space,
            index,
            total,
        })?;
        if let Wait::Interrupted(transition) =
            wait_for(run, &hub, dwell, config.poll_interval(), true)
        {
            info!("calibration interrupted at target {}/{total}", index + 1);
            return Ok(transition);
        }
        let outcome = collect_with_retry(run, target.tracker_position);
        if outcome != Collection::Missing {
            session.state.pass_points.push(target.tracker_position);
        }
        if outcome == Collection::Complete {
            collected += 1;
        }
    }

    let result = match run.tracker.compute_and_apply_calibration() {
        Ok(result) => result,
        Err(e) => {
            warn!("calibration computation errored: {e:#}");
            CalibrationResult::failed()
        }
    };
    if !result.status.is_success(run.eyes) {
        warn!("calibration failed ({collected}/{total} points collected)");
        session.state.last_calibration = Some(result);
        session.log_failure(
            "calibrate",
            format!("tracker rejected calibration ({collected}/{total} points collected)"),
        );
        run.renderer.present(&Frame::Message {
            state: WorkflowState::Calibrate,
            text: "Calibration failed. Returning to setup.".to_string(),
        })?;
        return Ok(Transition::CalibrationFailed);
    }

    let blob = run
        .tracker
        .serialize_calibration()
        .context("failed to read back calibration")?;
    let notes = format!(
        "eyes={}, points={collected}/{total}, used L={} R={}",
        run.eyes.as_str(),
        fmt_used(&result, Eye::Left),
        fmt_used(&result, Eye::Right)
    );
    info!("calibration computed: {notes}");
    session.state.last_calibration = Some(result);
    session.state.pending_blob = Some(blob);
    session.log_success_with_notes("calibrate", notes);
    Ok(Transition::CalibrationSucceeded)
}

/// Present validation targets, capture a sample window at each, estimate
/// data quality and commit it to the repository.
///
/// A revalidation replaces the report of the attempt being revalidated; a
/// regular validation appends a new attempt holding the pending calibration.
pub fn step_validate(
    session: &mut CalibrationSession,
    run: &mut WorkflowRun<'_>,
) -> Result<Transition> {
    let hub = Arc::clone(session.hub());
    let config = session.config().clone();
    let area = run
        .tracker
        .display_area()
        .context("failed to query display area")?;
    area.validate()?;

    let targets = shuffled_targets(
        &config.validation_points,
        config.renderer_space,
        &config.monitor,
        &mut run.rng,
    );
    let total = targets.len();
    let mut points = Vec::with_capacity(total);

    for (index, target) in targets.iter().enumerate() {
        if hub.is_disconnected() {
            return Ok(Transition::TrackerLost);
        }
        run.renderer.present(&Frame::Target {
            state: WorkflowState::Validate,
            position: target.display_position,
            space: config.renderer_space,
            index,
            total,
        })?;
        hub.open_window();
        if let Wait::Interrupted(transition) =
            wait_for(run, &hub, Some(config.capture_window()), config.poll_interval(), false)
        {
            hub.discard_window();
            discard_uncommitted(session, run.eyes)?;
            info!(
                "validation interrupted at target {}/{total}; discarding {} captured targets",
                index + 1,
                points.len()
            );
            return Ok(transition);
        }
        let samples = hub.close_window();
        debug!(
            "validation target {}/{total}: {} samples",
            index + 1,
            samples.len()
        );
        points.push(ValidationPointResult {
            target_display: target.tracker_position,
            target_ucs: area.to_ucs(&target.tracker_position),
            samples,
        });
    }

    let eyes = run.eyes;
    let summary = estimate_report(&points, eyes);
    let report = summary.report;
    let index = match session.state.revalidate_index.take() {
        Some(index) => {
            session.state.previous_report = None;
            session.repository_mut(eyes).replace_report(index, report)?;
            index
        }
        None => {
            let blob = session
                .state
                .pending_blob
                .take()
                .ok_or(WorkflowError::NoPendingCalibration)?;
            session
                .repository_mut(eyes)
                .append(CalibrationAttempt::new(report, blob))
        }
    };

    let notes = format!(
        "attempt={index}, eyes={}, accuracy L={:.2} R={:.2} deg, rms L={:.2} R={:.2} deg, loss L={:.2} R={:.2}",
        eyes.as_str(),
        report.accuracy_left_deg,
        report.accuracy_right_deg,
        report.precision_rms_left_deg,
        report.precision_rms_right_deg,
        report.data_loss_left,
        report.data_loss_right
    );
    info!("validation committed: {notes}");
    session.state.last_validation = Some(summary);
    session.log_success_with_notes("validate", notes);
    Ok(Transition::ValidationComplete)
}

/// Show all attempts and wait for the operator's decision.
pub fn step_results(
    session: &mut CalibrationSession,
    run: &mut WorkflowRun<'_>,
) -> Result<Transition> {
    let hub = Arc::clone(session.hub());
    let poll = session.config().poll_interval();
    let eyes = run.eyes;
    run.renderer
        .present(&results_frame(session.repository(eyes), eyes))?;

    loop {
        if hub.is_disconnected() {
            return Ok(Transition::TrackerLost);
        }
        let Some(command) = run.renderer.poll_command(poll) else {
            continue;
        };
        match command {
            OperatorCommand::SelectAttempt(index) => {
                match session.repository_mut(eyes).select(index) {
                    Ok(()) => {
                        debug!("selected attempt {index}");
                        run.renderer
                            .present(&results_frame(session.repository(eyes), eyes))?;
                    }
                    Err(e) => warn!("{e}"),
                }
            }
            OperatorCommand::Recalibrate => return Ok(Transition::Recalibrate),
            OperatorCommand::Revalidate => {
                let Some(index) = apply_selected(session, run)? else {
                    warn!("nothing to revalidate");
                    continue;
                };
                let repo = session.repository_mut(eyes);
                let previous = repo.get(index).and_then(|a| a.report);
                repo.discard_report(index)?;
                session.state.previous_report = previous;
                session.state.revalidate_index = Some(index);
                info!("revalidating attempt {index}");
                return Ok(Transition::Revalidate);
            }
            OperatorCommand::Accept => {
                if apply_selected(session, run)?.is_none() {
                    warn!("nothing to accept");
                    continue;
                }
                return Ok(Transition::Accept);
            }
            OperatorCommand::Abort => return Ok(Transition::Abort),
            OperatorCommand::Advance | OperatorCommand::Restart => {
                debug!("ignoring {command:?} on the results screen")
            }
        }
    }
}

/// Mark the selected attempt as used and every other attempt as unused.
pub fn step_finalize(session: &mut CalibrationSession, run: &mut WorkflowRun<'_>) -> Result<()> {
    let repo = session.repository_mut(run.eyes);
    let index = repo
        .selected_index()
        .ok_or_else(|| anyhow!("no attempt to accept"))?;
    repo.mark_used(index)?;
    info!("accepted attempt {index} ({})", run.eyes.as_str());
    session.log_success_with_notes("accept", format!("attempt={index}, eyes={}", run.eyes.as_str()));
    Ok(())
}

/// Leave calibration mode when the bracket closes and stop streaming.
fn teardown(
    session: &mut CalibrationSession,
    run: &mut WorkflowRun<'_>,
    final_state: Option<WorkflowState>,
) -> Result<()> {
    let keep_bracket = final_state == Some(WorkflowState::Done) && !run.pass.closes_bracket();
    let mut result = discard_uncommitted(session, run.eyes);

    if session.state.in_calibration_mode && !keep_bracket {
        let left = run
            .tracker
            .leave_calibration_mode()
            .context("failed to leave calibration mode");
        session.state.in_calibration_mode = false;
        session.state.pass_points.clear();
        info!("left calibration mode");
        result = result.and(left);
    }
    if session.state.streaming {
        let stopped = run
            .tracker
            .stop_streaming(STREAMS)
            .context("failed to stop gaze streaming");
        session.state.streaming = false;
        result = result.and(stopped);
    }
    result
}

fn drive(session: &mut CalibrationSession, run: &mut WorkflowRun<'_>) -> Result<WorkflowState> {
    let mut state = WorkflowState::Setup;
    session.state.current = state;
    session.state.pass_points.clear();
    discard_uncommitted(session, run.eyes)?;
    info!(
        "starting {:?} pass for {} eye(s)",
        run.pass,
        run.eyes.as_str()
    );

    while !state.is_terminal() {
        let transition = if session.hub().is_disconnected() {
            Transition::TrackerLost
        } else {
            match state {
                WorkflowState::Setup => step_setup(session, run)?,
                WorkflowState::Calibrate => step_calibrate(session, run)?,
                WorkflowState::Validate => step_validate(session, run)?,
                WorkflowState::Results => step_results(session, run)?,
                WorkflowState::Done | WorkflowState::Quit => break,
            }
        };
        let next = state.next(transition).map_err(WorkflowError::from)?;
        if state == WorkflowState::Validate && transition != Transition::ValidationComplete {
            discard_uncommitted(session, run.eyes)?;
        }
        if transition == Transition::TrackerLost {
            warn!("tracker disconnected in {state}");
            session.log_failure(state.as_str(), "tracker disconnected");
        }
        info!("{state} -> {next} ({transition})");
        state = next;
        session.state.current = state;
    }

    match state {
        WorkflowState::Done => step_finalize(session, run)?,
        _ => session.log_success("quit"),
    }
    Ok(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline Function
// ─────────────────────────────────────────────────────────────────────────────

/// Run one calibration pass from setup to a terminal state.
///
/// Streaming is stopped when the pass ends. Calibration mode is left when a
/// [`CalibrationPass::Single`] or [`CalibrationPass::Second`] pass ends, when
/// any pass quits, and when the run fails.
///
/// # Errors
///
/// Returns configuration errors, tracker errors, and
/// [`WorkflowError::TrackerUnavailable`] from the setup head check.
pub fn run_workflow<'a>(
    session: &mut CalibrationSession,
    tracker: &'a mut dyn TrackerDevice,
    renderer: &'a mut dyn Renderer,
    opts: Option<RunOptions>,
) -> Result<WorkflowState> {
    session.config().validate()?;
    let opts = opts.unwrap_or_default();
    let seed = session.config().shuffle_seed;
    let mut run = WorkflowRun::new(tracker, renderer, opts, seed);

    let outcome = drive(session, &mut run);
    let torn_down = teardown(session, &mut run, outcome.as_ref().ok().copied());
    match outcome {
        Ok(state) => {
            torn_down?;
            Ok(state)
        }
        Err(e) => {
            if let Err(teardown_err) = torn_down {
                warn!("teardown after failed run also failed: {teardown_err:#}");
            }
            session.log_failure("run", format!("{e:#}"));
            Err(e)
        }
    }
}
