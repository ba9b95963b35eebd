//! Synthetic fixation recordings with controlled angular error.

use nalgebra::{Rotation3, Unit};

use crate::{EyeSample, GazeSample, Pt2, Pt3, Real, Vec3};

/// Half the inter-pupillary distance used by [`Fixation::binocular`] (mm).
pub const HALF_IPD_MM: Real = 32.0;

/// Geometry of a participant fixating a known target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixation {
    pub left_origin: Pt3,
    pub right_origin: Pt3,
    /// Target position in UCS (mm).
    pub target_ucs: Pt3,
    /// Target position on the display, tracker-normalized.
    pub target_display: Pt2,
}

impl Fixation {
    /// Both eyes placed symmetrically around `eye_center` along x.
    pub fn binocular(eye_center: Pt3, target_ucs: Pt3) -> Self {
        Self {
            left_origin: eye_center - Vec3::new(HALF_IPD_MM, 0.0, 0.0),
            right_origin: eye_center + Vec3::new(HALF_IPD_MM, 0.0, 0.0),
            target_ucs,
            target_display: Pt2::new(0.5, 0.5),
        }
    }

    pub fn with_display(mut self, target_display: Pt2) -> Self {
        self.target_display = target_display;
        self
    }
}

/// Gaze point whose ray from `origin` deviates from the target ray by
/// `offset_deg`, at the same distance as the target.
///
/// All offsets for the same `(origin, target)` rotate about a common axis, so
/// the angle between two such gaze rays is the difference of their offsets.
pub fn deviated_gaze_point(origin: &Pt3, target: &Pt3, offset_deg: Real) -> Pt3 {
    let to_target = target - origin;
    let dist = to_target.norm();
    if dist == 0.0 {
        return *target;
    }
    let dir = to_target / dist;
    let mut axis = dir.cross(&Vec3::y());
    if axis.norm() < 1e-9 {
        axis = Vec3::x();
    }
    let rot = Rotation3::from_axis_angle(&Unit::new_normalize(axis), offset_deg.to_radians());
    origin + rot * dir * dist
}

fn eye_sample(origin: &Pt3, fixation: &Fixation, offset_deg: Real) -> EyeSample {
    EyeSample {
        gaze_point_display: fixation.target_display,
        gaze_point_ucs: deviated_gaze_point(origin, &fixation.target_ucs, offset_deg),
        gaze_origin_ucs: *origin,
        gaze_origin_trackbox: Pt3::new(0.5, 0.5, 0.5),
        gaze_valid: true,
        origin_valid: true,
    }
}

/// A binocular sample with the same angular offset for both eyes.
pub fn fixation_sample(fixation: &Fixation, offset_deg: Real, timestamp_us: i64) -> GazeSample {
    GazeSample {
        left: eye_sample(&fixation.left_origin, fixation, offset_deg),
        right: eye_sample(&fixation.right_origin, fixation, offset_deg),
        device_timestamp_us: timestamp_us,
        system_timestamp_us: timestamp_us,
    }
}

/// One sample per offset, timestamps starting at `t0_us` spaced by `dt_us`.
pub fn fixation_samples(
    fixation: &Fixation,
    offsets_deg: &[Real],
    t0_us: i64,
    dt_us: i64,
) -> Vec<GazeSample> {
    offsets_deg
        .iter()
        .enumerate()
        .map(|(i, &offset)| fixation_sample(fixation, offset, t0_us + i as i64 * dt_us))
        .collect()
}

/// A valid on-target sample at the screen center with the given timestamp.
pub fn sample_at(timestamp_us: i64) -> GazeSample {
    let fixation = Fixation::binocular(Pt3::new(0.0, 150.0, 600.0), Pt3::new(0.0, 150.0, 0.0));
    fixation_sample(&fixation, 0.0, timestamp_us)
}
