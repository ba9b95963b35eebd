//! Angles between gaze and target rays.

use gaze_calibration_core::{Real, Vec3};

/// Angle in radians between two vectors, `acos(clip(û·v̂, -1, 1))`.
///
/// Returns NaN when either vector has a non-finite component or zero length.
pub fn angle_between(u: &Vec3, v: &Vec3) -> Real {
    let (nu, nv) = (u.norm(), v.norm());
    if !(nu.is_finite() && nv.is_finite()) || nu == 0.0 || nv == 0.0 {
        return Real::NAN;
    }
    (u.dot(v) / (nu * nv)).clamp(-1.0, 1.0).acos()
}

/// Angles between each consecutive pair of vectors.
pub fn successive_angles(vectors: &[Vec3]) -> Vec<Real> {
    vectors
        .windows(2)
        .map(|pair| angle_between(&pair[0], &pair[1]))
        .collect()
}
