//! Mathematical utilities and type definitions.
//!
//! This module provides fundamental types used throughout the library
//! and the coordinate transforms between the four screen/gaze spaces.

use nalgebra::{Point2, Point3, Vector2, Vector3};

pub mod coordinate_utils;

pub use coordinate_utils::{
    CoordinateError, CoordinateSpace, MonitorGeometry, convert, degrees_to_tracker_norm,
    pixels_to_tracker_norm, screen_norm_to_tracker_norm, tracker_norm_to_degrees,
    tracker_norm_to_pixels, tracker_norm_to_screen_norm,
};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;

/// Returns `true` when every component of the point is finite.
pub fn is_finite_pt3(p: &Pt3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

/// Point with every component set to NaN, used for missing gaze data.
pub fn nan_pt3() -> Pt3 {
    Pt3::new(Real::NAN, Real::NAN, Real::NAN)
}
