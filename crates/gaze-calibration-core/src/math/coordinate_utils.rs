//! Coordinate transformation utilities for gaze and target positions.
//!
//! Four spaces are in use:
//!
//! - **tracker-normalized** (ADCS): `[0, 1] × [0, 1]`, origin top-left, y down;
//! - **screen-normalized**: `[-1, 1] × [-1, 1]`, origin center, y up;
//! - **pixels**: origin center, y up, scaled by the screen resolution;
//! - **visual-angle degrees**: origin center, y up, flat-screen visual angle at
//!   the configured viewing distance.
//!
//! Every function borrows its input and returns freshly allocated points. Each
//! forward transform has an exact inverse (up to floating-point tolerance);
//! [`convert`] routes any-to-any conversions through tracker-normalized space.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Pt2, Real};

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("monitor {field} must be positive and finite (got {value})")]
    InvalidGeometry { field: &'static str, value: Real },
    #[error("unknown coordinate space '{0}'")]
    UnknownSpace(String),
}

/// Coordinate space a position is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    TrackerNormalized,
    ScreenNormalized,
    Pixel,
    VisualAngleDegrees,
}

impl CoordinateSpace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrackerNormalized => "tracker_normalized",
            Self::ScreenNormalized => "screen_normalized",
            Self::Pixel => "pixel",
            Self::VisualAngleDegrees => "visual_angle_degrees",
        }
    }
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateSpace {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tracker_normalized" | "tracker" | "adcs" => Ok(Self::TrackerNormalized),
            "screen_normalized" | "norm" => Ok(Self::ScreenNormalized),
            "pixel" | "pix" => Ok(Self::Pixel),
            "visual_angle_degrees" | "deg" => Ok(Self::VisualAngleDegrees),
            other => Err(CoordinateError::UnknownSpace(other.to_string())),
        }
    }
}

/// Physical monitor geometry used for pixel and visual-angle conversions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorGeometry {
    /// Visible screen width in centimeters.
    pub width_cm: Real,
    /// Visible screen height in centimeters.
    pub height_cm: Real,
    /// Eye-to-screen distance in centimeters.
    pub view_distance_cm: Real,
    /// Screen resolution `[width, height]` in pixels.
    pub resolution_px: [u32; 2],
}

impl Default for MonitorGeometry {
    /// A 24" 16:9 monitor at 65 cm.
    fn default() -> Self {
        Self {
            width_cm: 53.0,
            height_cm: 30.0,
            view_distance_cm: 65.0,
            resolution_px: [1920, 1080],
        }
    }
}

impl MonitorGeometry {
    pub fn validate(&self) -> Result<(), CoordinateError> {
        let checks = [
            ("width_cm", self.width_cm),
            ("height_cm", self.height_cm),
            ("view_distance_cm", self.view_distance_cm),
            ("horizontal resolution", Real::from(self.resolution_px[0])),
            ("vertical resolution", Real::from(self.resolution_px[1])),
        ];
        for (field, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoordinateError::InvalidGeometry { field, value });
            }
        }
        Ok(())
    }
}

/// Convert tracker-normalized points to screen-normalized points.
///
/// `x' = 2(x - 0.5)`, `y' = -2(y - 0.5)`.
pub fn tracker_norm_to_screen_norm(points: &[Pt2]) -> Vec<Pt2> {
    points
        .iter()
        .map(|p| Pt2::new(2.0 * (p.x - 0.5), -2.0 * (p.y - 0.5)))
        .collect()
}

/// Inverse of [`tracker_norm_to_screen_norm`].
pub fn screen_norm_to_tracker_norm(points: &[Pt2]) -> Vec<Pt2> {
    points
        .iter()
        .map(|p| Pt2::new(p.x / 2.0 + 0.5, 0.5 - p.y / 2.0))
        .collect()
}

/// Convert tracker-normalized points to centered pixel coordinates (y up).
pub fn tracker_norm_to_pixels(points: &[Pt2], resolution_px: [u32; 2]) -> Vec<Pt2> {
    let (w, h) = (
        Real::from(resolution_px[0]),
        Real::from(resolution_px[1]),
    );
    points
        .iter()
        .map(|p| Pt2::new((p.x - 0.5) * w, -(p.y - 0.5) * h))
        .collect()
}

/// Inverse of [`tracker_norm_to_pixels`].
pub fn pixels_to_tracker_norm(points: &[Pt2], resolution_px: [u32; 2]) -> Vec<Pt2> {
    let (w, h) = (
        Real::from(resolution_px[0]),
        Real::from(resolution_px[1]),
    );
    points
        .iter()
        .map(|p| Pt2::new(p.x / w + 0.5, 0.5 - p.y / h))
        .collect()
}

/// Convert tracker-normalized points to visual angle in degrees.
///
/// The point is centered, scaled to centimeters by the physical screen size,
/// then converted with `atan(cm / view_distance)`. The screen is treated as
/// flat; no curvature correction is applied.
pub fn tracker_norm_to_degrees(points: &[Pt2], monitor: &MonitorGeometry) -> Vec<Pt2> {
    let d = monitor.view_distance_cm;
    points
        .iter()
        .map(|p| {
            let x_cm = (p.x - 0.5) * monitor.width_cm;
            let y_cm = -(p.y - 0.5) * monitor.height_cm;
            Pt2::new(
                x_cm.atan2(d).to_degrees(),
                y_cm.atan2(d).to_degrees(),
            )
        })
        .collect()
}

/// Inverse of [`tracker_norm_to_degrees`].
pub fn degrees_to_tracker_norm(points: &[Pt2], monitor: &MonitorGeometry) -> Vec<Pt2> {
    let d = monitor.view_distance_cm;
    points
        .iter()
        .map(|p| {
            let x_cm = d * p.x.to_radians().tan();
            let y_cm = d * p.y.to_radians().tan();
            Pt2::new(
                x_cm / monitor.width_cm + 0.5,
                0.5 - y_cm / monitor.height_cm,
            )
        })
        .collect()
}

fn to_tracker_norm(points: &[Pt2], from: CoordinateSpace, monitor: &MonitorGeometry) -> Vec<Pt2> {
    match from {
        CoordinateSpace::TrackerNormalized => points.to_vec(),
        CoordinateSpace::ScreenNormalized => screen_norm_to_tracker_norm(points),
        CoordinateSpace::Pixel => pixels_to_tracker_norm(points, monitor.resolution_px),
        CoordinateSpace::VisualAngleDegrees => degrees_to_tracker_norm(points, monitor),
    }
}

fn from_tracker_norm(points: &[Pt2], to: CoordinateSpace, monitor: &MonitorGeometry) -> Vec<Pt2> {
    match to {
        CoordinateSpace::TrackerNormalized => points.to_vec(),
        CoordinateSpace::ScreenNormalized => tracker_norm_to_screen_norm(points),
        CoordinateSpace::Pixel => tracker_norm_to_pixels(points, monitor.resolution_px),
        CoordinateSpace::VisualAngleDegrees => tracker_norm_to_degrees(points, monitor),
    }
}

/// Convert points between any two coordinate spaces.
pub fn convert(
    points: &[Pt2],
    from: CoordinateSpace,
    to: CoordinateSpace,
    monitor: &MonitorGeometry,
) -> Vec<Pt2> {
    if from == to {
        return points.to_vec();
    }
    let tracker = to_tracker_norm(points, from, monitor);
    from_tracker_norm(&tracker, to, monitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn random_points(n: usize, seed: u64) -> Vec<Pt2> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Pt2::new(rng.random_range(0.0..=1.0), rng.random_range(0.0..=1.0)))
            .collect()
    }

    fn assert_close(a: &[Pt2], b: &[Pt2], tol: Real) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b.iter()) {
            assert!(
                (p - q).norm() < tol,
                "points differ: {:?} vs {:?}",
                p,
                q
            );
        }
    }

    #[test]
    fn screen_norm_maps_corners() {
        let pts = [Pt2::new(0.0, 0.0), Pt2::new(0.5, 0.5), Pt2::new(1.0, 1.0)];
        let out = tracker_norm_to_screen_norm(&pts);
        assert_close(
            &out,
            &[Pt2::new(-1.0, 1.0), Pt2::new(0.0, 0.0), Pt2::new(1.0, -1.0)],
            1e-12,
        );
    }

    #[test]
    fn pixels_are_centered_with_y_up() {
        let out = tracker_norm_to_pixels(&[Pt2::new(1.0, 0.0)], [1920, 1080]);
        assert_close(&out, &[Pt2::new(960.0, 540.0)], 1e-12);
    }

    #[test]
    fn degrees_center_is_zero() {
        let monitor = MonitorGeometry::default();
        let out = tracker_norm_to_degrees(&[Pt2::new(0.5, 0.5)], &monitor);
        assert_close(&out, &[Pt2::new(0.0, 0.0)], 1e-12);
    }

    #[test]
    fn degrees_edge_matches_half_width_angle() {
        let monitor = MonitorGeometry {
            width_cm: 60.0,
            height_cm: 34.0,
            view_distance_cm: 30.0,
            resolution_px: [2560, 1440],
        };
        let out = tracker_norm_to_degrees(&[Pt2::new(1.0, 0.5)], &monitor);
        // 30 cm half width at 30 cm distance is 45 degrees.
        assert!((out[0].x - 45.0).abs() < 1e-9);
        assert!(out[0].y.abs() < 1e-12);
    }

    #[test]
    fn degrees_roundtrip_random_geometry() {
        let mut rng = StdRng::seed_from_u64(7);
        for seed in 0..20 {
            let monitor = MonitorGeometry {
                width_cm: rng.random_range(20.0..120.0),
                height_cm: rng.random_range(10.0..70.0),
                view_distance_cm: rng.random_range(30.0..150.0),
                resolution_px: [rng.random_range(640..4096), rng.random_range(480..2160)],
            };
            let pts = random_points(50, seed);
            let back = degrees_to_tracker_norm(&tracker_norm_to_degrees(&pts, &monitor), &monitor);
            assert_close(&back, &pts, 1e-6);
        }
    }

    #[test]
    fn pixel_and_screen_roundtrip() {
        let pts = random_points(100, 11);
        let back = pixels_to_tracker_norm(&tracker_norm_to_pixels(&pts, [1280, 1024]), [1280, 1024]);
        assert_close(&back, &pts, 1e-9);
        let back = screen_norm_to_tracker_norm(&tracker_norm_to_screen_norm(&pts));
        assert_close(&back, &pts, 1e-12);
    }

    #[test]
    fn convert_between_non_tracker_spaces() {
        let monitor = MonitorGeometry::default();
        let pts = random_points(20, 3);
        let pix = convert(
            &pts,
            CoordinateSpace::TrackerNormalized,
            CoordinateSpace::Pixel,
            &monitor,
        );
        let deg = convert(
            &pix,
            CoordinateSpace::Pixel,
            CoordinateSpace::VisualAngleDegrees,
            &monitor,
        );
        let back = convert(
            &deg,
            CoordinateSpace::VisualAngleDegrees,
            CoordinateSpace::TrackerNormalized,
            &monitor,
        );
        assert_close(&back, &pts, 1e-6);
    }

    #[test]
    fn transforms_do_not_mutate_input() {
        let monitor = MonitorGeometry::default();
        let pts = random_points(10, 5);
        let snapshot = pts.clone();
        let _ = tracker_norm_to_screen_norm(&pts);
        let _ = screen_norm_to_tracker_norm(&pts);
        let _ = tracker_norm_to_pixels(&pts, monitor.resolution_px);
        let _ = pixels_to_tracker_norm(&pts, monitor.resolution_px);
        let _ = tracker_norm_to_degrees(&pts, &monitor);
        let _ = degrees_to_tracker_norm(&pts, &monitor);
        for space in [
            CoordinateSpace::ScreenNormalized,
            CoordinateSpace::Pixel,
            CoordinateSpace::VisualAngleDegrees,
        ] {
            let _ = convert(&pts, CoordinateSpace::TrackerNormalized, space, &monitor);
        }
        assert_eq!(pts, snapshot);
    }

    #[test]
    fn geometry_validation_rejects_zero_distance() {
        let monitor = MonitorGeometry {
            view_distance_cm: 0.0,
            ..Default::default()
        };
        assert_eq!(
            monitor.validate(),
            Err(CoordinateError::InvalidGeometry {
                field: "view_distance_cm",
                value: 0.0
            })
        );
        assert!(MonitorGeometry::default().validate().is_ok());
    }

    #[test]
    fn space_parses_aliases() {
        assert_eq!("deg".parse::<CoordinateSpace>(), Ok(CoordinateSpace::VisualAngleDegrees));
        assert_eq!(
            CoordinateSpace::Pixel.as_str().parse::<CoordinateSpace>(),
            Ok(CoordinateSpace::Pixel)
        );
        assert!("furlongs".parse::<CoordinateSpace>().is_err());
    }
}
