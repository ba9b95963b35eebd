//! Gaze samples as delivered by the tracker.

use serde::{Deserialize, Serialize};

use crate::{Pt2, Pt3, Vec3, is_finite_pt3, nan_pt3};

/// One eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eye {
    Left,
    Right,
}

/// Which eyes take part in a calibration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeSelection {
    #[default]
    Both,
    Left,
    Right,
}

impl EyeSelection {
    pub fn includes(&self, eye: Eye) -> bool {
        match (self, eye) {
            (Self::Both, _) => true,
            (Self::Left, Eye::Left) => true,
            (Self::Right, Eye::Right) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Both => "both",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Gaze data for a single eye.
///
/// UCS positions are in millimeters in the tracker-fixed user coordinate
/// system. Missing data is represented by NaN components together with a
/// cleared validity flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeSample {
    /// Gaze point on the display area, tracker-normalized.
    pub gaze_point_display: Pt2,
    /// Gaze point on the display area in UCS.
    pub gaze_point_ucs: Pt3,
    /// Eye position (gaze origin) in UCS.
    pub gaze_origin_ucs: Pt3,
    /// Eye position normalized to the track box, used for head positioning.
    pub gaze_origin_trackbox: Pt3,
    pub gaze_valid: bool,
    pub origin_valid: bool,
}

impl EyeSample {
    /// Sample for an eye the tracker lost.
    pub fn missing() -> Self {
        Self {
            gaze_point_display: Pt2::new(f64::NAN, f64::NAN),
            gaze_point_ucs: nan_pt3(),
            gaze_origin_ucs: nan_pt3(),
            gaze_origin_trackbox: nan_pt3(),
            gaze_valid: false,
            origin_valid: false,
        }
    }

    /// Vector from the eye to the reported gaze point.
    pub fn gaze_vector(&self) -> Vec3 {
        self.gaze_point_ucs - self.gaze_origin_ucs
    }

    /// Whether both validity flags are set and the gaze vector is finite.
    pub fn is_usable(&self) -> bool {
        self.gaze_valid
            && self.origin_valid
            && is_finite_pt3(&self.gaze_point_ucs)
            && is_finite_pt3(&self.gaze_origin_ucs)
    }
}

/// A snapshot of one tracker reading for both eyes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    pub left: EyeSample,
    pub right: EyeSample,
    /// Tracker clock, microseconds.
    pub device_timestamp_us: i64,
    /// Host clock, microseconds.
    pub system_timestamp_us: i64,
}

impl GazeSample {
    pub fn eye(&self, eye: Eye) -> &EyeSample {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }

    /// Average of the valid per-eye display gaze points, for a live cursor.
    pub fn gaze_cursor(&self) -> Option<Pt2> {
        let valid: Vec<Pt2> = [&self.left, &self.right]
            .into_iter()
            .filter(|e| e.gaze_valid)
            .map(|e| e.gaze_point_display)
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect();
        match valid.as_slice() {
            [] => None,
            [p] => Some(*p),
            [a, b] => Some(Pt2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(display: Pt2) -> EyeSample {
        EyeSample {
            gaze_point_display: display,
            gaze_point_ucs: Pt3::new(0.0, 0.0, 0.0),
            gaze_origin_ucs: Pt3::new(0.0, 0.0, 600.0),
            gaze_origin_trackbox: Pt3::new(0.5, 0.5, 0.5),
            gaze_valid: true,
            origin_valid: true,
        }
    }

    #[test]
    fn selection_includes() {
        assert!(EyeSelection::Both.includes(Eye::Left));
        assert!(EyeSelection::Both.includes(Eye::Right));
        assert!(EyeSelection::Left.includes(Eye::Left));
        assert!(!EyeSelection::Left.includes(Eye::Right));
        assert!(!EyeSelection::Right.includes(Eye::Left));
    }

    #[test]
    fn missing_eye_is_not_usable() {
        assert!(!EyeSample::missing().is_usable());
        assert!(eye(Pt2::new(0.5, 0.5)).is_usable());

        let mut nan_origin = eye(Pt2::new(0.5, 0.5));
        nan_origin.gaze_origin_ucs.y = f64::NAN;
        assert!(!nan_origin.is_usable());
    }

    #[test]
    fn cursor_averages_valid_eyes() {
        let sample = GazeSample {
            left: eye(Pt2::new(0.4, 0.5)),
            right: eye(Pt2::new(0.6, 0.5)),
            device_timestamp_us: 0,
            system_timestamp_us: 0,
        };
        let cursor = sample.gaze_cursor().unwrap();
        assert!((cursor.x - 0.5).abs() < 1e-12);

        let one_eye = GazeSample {
            right: EyeSample::missing(),
            ..sample
        };
        assert_eq!(one_eye.gaze_cursor(), Some(Pt2::new(0.4, 0.5)));

        let none = GazeSample {
            left: EyeSample::missing(),
            right: EyeSample::missing(),
            ..sample
        };
        assert!(none.gaze_cursor().is_none());
    }
}
