//! Workflow configuration.

use std::time::Duration;

use anyhow::{Result, ensure};
use gaze_calibration_core::{CoordinateSpace, MonitorGeometry, Pt2};
use serde::{Deserialize, Serialize};

/// How the workflow advances from one calibration target to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Collect after a fixed dwell time.
    #[default]
    Dwell,
    /// Collect when the operator advances.
    Manual,
}

/// Configuration for the calibration/validation workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Targets (tracker-normalized)
    // ─────────────────────────────────────────────────────────────────────────
    /// Calibration target positions.
    pub calibration_points: Vec<Pt2>,
    /// Validation target positions.
    pub validation_points: Vec<Pt2>,

    // ─────────────────────────────────────────────────────────────────────────
    // Timing
    // ─────────────────────────────────────────────────────────────────────────
    pub pacing: Pacing,
    /// Time a calibration target is shown before collection (dwell pacing).
    pub dwell_ms: u64,
    /// Length of the sample capture window per validation target.
    pub capture_window_ms: u64,
    /// Upper bound on a single wait for operator input.
    pub poll_interval_ms: u64,
    /// How long setup waits for the first gaze sample before giving up.
    pub head_check_timeout_ms: u64,

    // ─────────────────────────────────────────────────────────────────────────
    // Buffering and display
    // ─────────────────────────────────────────────────────────────────────────
    /// Capacity of the validation capture ring (samples).
    pub buffer_capacity: usize,
    pub monitor: MonitorGeometry,
    /// Space in which target positions are handed to the renderer.
    pub renderer_space: CoordinateSpace,
    /// Seed for target order shuffling; `None` draws from the OS.
    pub shuffle_seed: Option<u64>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            calibration_points: default_calibration_points(),
            validation_points: default_validation_points(),
            pacing: Pacing::Dwell,
            dwell_ms: 1000,
            capture_window_ms: 1000,
            poll_interval_ms: 10,
            head_check_timeout_ms: 5000,
            // 600 Hz for two seconds.
            buffer_capacity: 1200,
            monitor: MonitorGeometry::default(),
            renderer_space: CoordinateSpace::ScreenNormalized,
            shuffle_seed: None,
        }
    }
}

/// Center plus four corners inset by 10%.
pub fn default_calibration_points() -> Vec<Pt2> {
    vec![
        Pt2::new(0.5, 0.5),
        Pt2::new(0.1, 0.1),
        Pt2::new(0.9, 0.1),
        Pt2::new(0.1, 0.9),
        Pt2::new(0.9, 0.9),
    ]
}

/// Four points between the center and the calibration corners.
pub fn default_validation_points() -> Vec<Pt2> {
    vec![
        Pt2::new(0.3, 0.3),
        Pt2::new(0.7, 0.3),
        Pt2::new(0.3, 0.7),
        Pt2::new(0.7, 0.7),
    ]
}

impl WorkflowConfig {
    /// Check the configuration for values the workflow cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first offending field.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.calibration_points.is_empty(),
            "at least one calibration point is required"
        );
        ensure!(
            !self.validation_points.is_empty(),
            "at least one validation point is required"
        );
        for (name, points) in [
            ("calibration_points", &self.calibration_points),
            ("validation_points", &self.validation_points),
        ] {
            for (i, p) in points.iter().enumerate() {
                ensure!(
                    (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y),
                    "{name}[{i}] = ({}, {}) is outside the display",
                    p.x,
                    p.y
                );
            }
        }
        ensure!(self.poll_interval_ms > 0, "poll_interval_ms must be positive");
        ensure!(self.buffer_capacity > 0, "buffer_capacity must be positive");
        self.monitor.validate()?;
        Ok(())
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn capture_window(&self) -> Duration {
        Duration::from_millis(self.capture_window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn head_check_timeout(&self) -> Duration {
        Duration::from_millis(self.head_check_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = WorkflowConfig::default();
        config.validate().unwrap();
        assert_eq!(config.calibration_points.len(), 5);
        assert_eq!(config.validation_points.len(), 4);
        assert_eq!(config.buffer_capacity, 1200);
    }

    #[test]
    fn rejects_off_screen_target() {
        let config = WorkflowConfig {
            validation_points: vec![Pt2::new(0.5, 1.2)],
            ..Default::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("validation_points[0]"), "{err}");
    }

    #[test]
    fn rejects_nan_target() {
        let config = WorkflowConfig {
            calibration_points: vec![Pt2::new(f64::NAN, 0.5)],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_targets_and_zero_poll() {
        let config = WorkflowConfig {
            calibration_points: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WorkflowConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_monitor() {
        let mut config = WorkflowConfig::default();
        config.monitor.view_distance_cm = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: WorkflowConfig =
            serde_json::from_str(r#"{ "pacing": "manual", "shuffle_seed": 7 }"#).unwrap();
        assert_eq!(config.pacing, Pacing::Manual);
        assert_eq!(config.shuffle_seed, Some(7));
        assert_eq!(config.dwell_ms, 1000);
        assert_eq!(config.calibration_points.len(), 5);
    }
}
