//! Core math, sample types and sample buffering for `gaze-calibration`.
//!
//! This crate provides the building blocks shared by the estimator and the
//! workflow engine:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Pt3`, `Vec3`),
//! - pure coordinate transforms between tracker-normalized, screen-normalized,
//!   pixel and visual-angle spaces,
//! - the [`GazeSample`] data model,
//! - the [`SampleWindowBuffer`] ring and the [`SampleHub`] through which a
//!   tracker's producer thread hands samples to the workflow loop.
//!
//! # Example
//!
//! ```
//! use gaze_calibration_core::{CoordinateSpace, MonitorGeometry, Pt2, convert};
//!
//! let monitor = MonitorGeometry::default();
//! let deg = convert(
//!     &[Pt2::new(0.5, 0.5)],
//!     CoordinateSpace::TrackerNormalized,
//!     CoordinateSpace::VisualAngleDegrees,
//!     &monitor,
//! );
//! assert!(deg[0].x.abs() < 1e-12);
//! ```

/// Type aliases and coordinate transforms.
pub mod math;
/// Deterministic synthetic gaze recordings (tests/examples).
pub mod synthetic;

mod buffer;
mod hub;
mod sample;

pub use buffer::SampleWindowBuffer;
pub use hub::SampleHub;
pub use math::*;
pub use sample::{Eye, EyeSample, EyeSelection, GazeSample};
