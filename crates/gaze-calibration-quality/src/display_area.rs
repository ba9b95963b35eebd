//! Mapping from tracker-normalized display positions into the user coordinate
//! system.

use gaze_calibration_core::{Pt2, Pt3, Real, is_finite_pt3};
use serde::{Deserialize, Serialize};

use crate::QualityError;

/// Display area corners in UCS (millimeters), as reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayArea {
    pub top_left: Pt3,
    pub top_right: Pt3,
    pub bottom_left: Pt3,
}

impl DisplayArea {
    /// Build a display area, rejecting non-finite or collinear corners.
    pub fn new(top_left: Pt3, top_right: Pt3, bottom_left: Pt3) -> Result<Self, QualityError> {
        let area = Self {
            top_left,
            top_right,
            bottom_left,
        };
        area.validate()?;
        Ok(area)
    }

    pub fn validate(&self) -> Result<(), QualityError> {
        for (name, p) in [
            ("top_left", &self.top_left),
            ("top_right", &self.top_right),
            ("bottom_left", &self.bottom_left),
        ] {
            if !is_finite_pt3(p) {
                return Err(QualityError::NonFiniteCorner(name));
            }
        }
        let across = self.top_right - self.top_left;
        let down = self.bottom_left - self.top_left;
        if across.cross(&down).norm() <= Real::EPSILON * across.norm() * down.norm() {
            return Err(QualityError::DegenerateDisplayArea);
        }
        Ok(())
    }

    /// Width and height of the display area in millimeters.
    pub fn size_mm(&self) -> (Real, Real) {
        (
            (self.top_right - self.top_left).norm(),
            (self.bottom_left - self.top_left).norm(),
        )
    }

    /// Interpolate a tracker-normalized position onto the display plane.
    pub fn to_ucs(&self, p: &Pt2) -> Pt3 {
        let across = self.top_right - self.top_left;
        let down = self.bottom_left - self.top_left;
        self.top_left + across * p.x + down * p.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 509.8 x 286.8 mm screen tilted slightly back, below the tracker origin.
    fn sample_area() -> DisplayArea {
        DisplayArea::new(
            Pt3::new(-254.9, 301.2, 63.4),
            Pt3::new(254.9, 301.2, 63.4),
            Pt3::new(-254.9, 15.5, -1.2),
        )
        .unwrap()
    }

    #[test]
    fn corners_map_exactly() {
        let area = sample_area();
        assert_eq!(area.to_ucs(&Pt2::new(0.0, 0.0)), area.top_left);
        assert!((area.to_ucs(&Pt2::new(1.0, 0.0)) - area.top_right).norm() < 1e-12);
        assert!((area.to_ucs(&Pt2::new(0.0, 1.0)) - area.bottom_left).norm() < 1e-12);
    }

    #[test]
    fn center_is_midpoint_of_diagonal() {
        let area = sample_area();
        let bottom_right = area.top_right + (area.bottom_left - area.top_left);
        let mid = Pt3::from((area.top_left.coords + bottom_right.coords) / 2.0);
        assert!((area.to_ucs(&Pt2::new(0.5, 0.5)) - mid).norm() < 1e-9);
    }

    #[test]
    fn collinear_corners_rejected() {
        let err = DisplayArea::new(
            Pt3::new(0.0, 0.0, 0.0),
            Pt3::new(1.0, 0.0, 0.0),
            Pt3::new(2.0, 0.0, 0.0),
        )
        .unwrap_err();
        assert!(matches!(err, QualityError::DegenerateDisplayArea));
    }

    #[test]
    fn nan_corner_rejected() {
        let err = DisplayArea::new(
            Pt3::new(f64::NAN, 0.0, 0.0),
            Pt3::new(1.0, 0.0, 0.0),
            Pt3::new(0.0, 1.0, 0.0),
        )
        .unwrap_err();
        assert!(matches!(err, QualityError::NonFiniteCorner("top_left")));
    }

    #[test]
    fn size_in_mm() {
        let (w, _) = sample_area().size_mm();
        assert!((w - 509.8).abs() < 1e-9);
    }
}
