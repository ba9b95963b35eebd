//! Deterministic synthetic data generation helpers.
//!
//! This module provides small, reusable building blocks for constructing
//! synthetic gaze recordings used in tests and examples:
//! - fixation samples whose gaze ray deviates from a known target by a chosen
//!   angle,
//! - deterministic pseudo-random angular jitter.
//!
//! The helpers are deterministic (explicit seeds; stable ordering) so that
//! expected accuracy and precision values can be asserted exactly.
//!
//! # Example
//!
//! ```
//! use gaze_calibration_core::{Pt3, synthetic::gaze::{Fixation, fixation_samples}};
//!
//! let fixation = Fixation::binocular(Pt3::new(0.0, 0.0, 0.0), Pt3::new(0.0, 0.0, 600.0));
//! let samples = fixation_samples(&fixation, &[0.0, 0.5, 1.0], 0, 1_667);
//! assert_eq!(samples.len(), 3);
//! ```

pub mod gaze;
pub mod noise;
