//! Per-target and per-eye gaze data-quality estimation.
//!
//! For each validation target and eye:
//!
//! 1. gaze vector = gaze point − gaze origin, target vector = target − gaze
//!    origin (both in UCS);
//! 2. **accuracy** is the median angle between gaze and target vectors;
//! 3. **precision (RMS)** is `sqrt(mean(θ²))` over angles between consecutive
//!    gaze vectors;
//! 4. **SD** is the population standard deviation of the same angle series;
//! 5. **data loss** is the fraction of unusable samples in the window.
//!
//! Targets are then averaged per eye. Degenerate inputs produce NaN rather
//! than errors, and NaN propagates through the average so that a target
//! without data stays visible in the report.

use gaze_calibration_core::{Eye, EyeSelection, GazeSample, Pt2, Pt3, Real, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::angles::{angle_between, successive_angles};
use crate::serde_nan;
use crate::stats::{mean, median, population_std, rms};

/// Samples captured while one validation target was shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationPointResult {
    /// Target position on the display, tracker-normalized.
    pub target_display: Pt2,
    /// Target position in UCS (mm).
    pub target_ucs: Pt3,
    pub samples: Vec<GazeSample>,
}

/// Quality figures for one eye, in degrees (data loss as a fraction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeQuality {
    #[serde(with = "serde_nan")]
    pub accuracy_deg: Real,
    #[serde(with = "serde_nan")]
    pub precision_rms_deg: Real,
    #[serde(with = "serde_nan")]
    pub sd_deg: Real,
    #[serde(with = "serde_nan")]
    pub data_loss: Real,
}

impl EyeQuality {
    pub fn nan() -> Self {
        Self {
            accuracy_deg: Real::NAN,
            precision_rms_deg: Real::NAN,
            sd_deg: Real::NAN,
            data_loss: Real::NAN,
        }
    }
}

/// Quality for one eye at one target, with sample counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointQuality {
    pub quality: EyeQuality,
    pub samples: usize,
    pub usable: usize,
}

impl PointQuality {
    fn excluded(samples: usize) -> Self {
        Self {
            quality: EyeQuality::nan(),
            samples,
            usable: 0,
        }
    }
}

/// Aggregate data quality of one calibration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    #[serde(with = "serde_nan")]
    pub accuracy_left_deg: Real,
    #[serde(with = "serde_nan")]
    pub accuracy_right_deg: Real,
    #[serde(with = "serde_nan")]
    pub precision_rms_left_deg: Real,
    #[serde(with = "serde_nan")]
    pub precision_rms_right_deg: Real,
    #[serde(with = "serde_nan")]
    pub sd_left_deg: Real,
    #[serde(with = "serde_nan")]
    pub sd_right_deg: Real,
    #[serde(with = "serde_nan")]
    pub data_loss_left: Real,
    #[serde(with = "serde_nan")]
    pub data_loss_right: Real,
}

impl DataQualityReport {
    pub fn nan() -> Self {
        Self::from_eyes(EyeQuality::nan(), EyeQuality::nan())
    }

    pub fn from_eyes(left: EyeQuality, right: EyeQuality) -> Self {
        Self {
            accuracy_left_deg: left.accuracy_deg,
            accuracy_right_deg: right.accuracy_deg,
            precision_rms_left_deg: left.precision_rms_deg,
            precision_rms_right_deg: right.precision_rms_deg,
            sd_left_deg: left.sd_deg,
            sd_right_deg: right.sd_deg,
            data_loss_left: left.data_loss,
            data_loss_right: right.data_loss,
        }
    }

    pub fn eye(&self, eye: Eye) -> EyeQuality {
        match eye {
            Eye::Left => EyeQuality {
                accuracy_deg: self.accuracy_left_deg,
                precision_rms_deg: self.precision_rms_left_deg,
                sd_deg: self.sd_left_deg,
                data_loss: self.data_loss_left,
            },
            Eye::Right => EyeQuality {
                accuracy_deg: self.accuracy_right_deg,
                precision_rms_deg: self.precision_rms_right_deg,
                sd_deg: self.sd_right_deg,
                data_loss: self.data_loss_right,
            },
        }
    }
}

/// Per-target breakdown kept next to the aggregate for the results screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointSummary {
    pub target_display: Pt2,
    pub left: PointQuality,
    pub right: PointQuality,
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub report: DataQualityReport,
    pub points: Vec<PointSummary>,
}

/// Estimate quality for one eye at one target.
pub fn estimate_point(point: &ValidationPointResult, eye: Eye) -> PointQuality {
    let total = point.samples.len();
    let usable: Vec<(Vec3, Vec3)> = point
        .samples
        .iter()
        .map(|s| s.eye(eye))
        .filter(|e| e.is_usable())
        .map(|e| (e.gaze_vector(), point.target_ucs - e.gaze_origin_ucs))
        .collect();

    let offsets: Vec<Real> = usable
        .iter()
        .map(|(gaze, target)| angle_between(gaze, target).to_degrees())
        .collect();
    let gaze_vectors: Vec<Vec3> = usable.iter().map(|(gaze, _)| *gaze).collect();
    let jitter: Vec<Real> = successive_angles(&gaze_vectors)
        .into_iter()
        .map(Real::to_degrees)
        .collect();

    let data_loss = if total == 0 {
        Real::NAN
    } else {
        (total - usable.len()) as Real / total as Real
    };

    PointQuality {
        quality: EyeQuality {
            accuracy_deg: median(&offsets),
            precision_rms_deg: rms(&jitter),
            sd_deg: population_std(&jitter),
            data_loss,
        },
        samples: total,
        usable: usable.len(),
    }
}

/// Mean over targets for one eye; NaN in any target propagates.
pub fn aggregate_eye(points: &[EyeQuality]) -> EyeQuality {
    let column = |f: fn(&EyeQuality) -> Real| -> Real {
        mean(&points.iter().map(f).collect::<Vec<_>>())
    };
    EyeQuality {
        accuracy_deg: column(|q| q.accuracy_deg),
        precision_rms_deg: column(|q| q.precision_rms_deg),
        sd_deg: column(|q| q.sd_deg),
        data_loss: column(|q| q.data_loss),
    }
}

/// Estimate the full report for a validation pass.
///
/// Eyes not in `eyes` are reported as NaN.
pub fn estimate_report(points: &[ValidationPointResult], eyes: EyeSelection) -> ValidationSummary {
    let per_eye = |eye: Eye, point: &ValidationPointResult| {
        if eyes.includes(eye) {
            estimate_point(point, eye)
        } else {
            PointQuality::excluded(point.samples.len())
        }
    };

    let summaries: Vec<PointSummary> = points
        .iter()
        .map(|point| {
            let summary = PointSummary {
                target_display: point.target_display,
                left: per_eye(Eye::Left, point),
                right: per_eye(Eye::Right, point),
            };
            debug!(
                "target ({:.2}, {:.2}): n={} acc L={:.3} R={:.3} deg",
                point.target_display.x,
                point.target_display.y,
                point.samples.len(),
                summary.left.quality.accuracy_deg,
                summary.right.quality.accuracy_deg
            );
            summary
        })
        .collect();

    let eye_report = |eye: Eye, pick: fn(&PointSummary) -> EyeQuality| {
        if eyes.includes(eye) {
            aggregate_eye(&summaries.iter().map(pick).collect::<Vec<_>>())
        } else {
            EyeQuality::nan()
        }
    };
    let report = DataQualityReport::from_eyes(
        eye_report(Eye::Left, |s| s.left.quality),
        eye_report(Eye::Right, |s| s.right.quality),
    );

    ValidationSummary {
        report,
        points: summaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_calibration_core::EyeSample;
    use gaze_calibration_core::synthetic::gaze::{Fixation, fixation_samples};
    use gaze_calibration_core::synthetic::noise::AngularJitter;

    fn fixation() -> Fixation {
        Fixation::binocular(Pt3::new(0.0, 180.0, 620.0), Pt3::new(-120.0, 240.0, 40.0))
    }

    fn point(samples: Vec<GazeSample>) -> ValidationPointResult {
        let f = fixation();
        ValidationPointResult {
            target_display: f.target_display,
            target_ucs: f.target_ucs,
            samples,
        }
    }

    #[test]
    fn median_resists_single_outlier() {
        let mut offsets = vec![1.0; 8];
        offsets.push(50.0);
        let p = point(fixation_samples(&fixation(), &offsets, 0, 1_667));
        let q = estimate_point(&p, Eye::Left);
        assert!((q.quality.accuracy_deg - 1.0).abs() < 1e-6);
        assert_eq!(q.usable, 9);
    }

    #[test]
    fn data_loss_counts_nan_origins() {
        let mut samples = fixation_samples(&fixation(), &[0.5; 10], 0, 1_667);
        for s in samples.iter_mut().take(3) {
            s.left.gaze_origin_ucs.x = Real::NAN;
        }
        let q = estimate_point(&point(samples), Eye::Left);
        assert_eq!(q.quality.data_loss, 0.3);
        assert_eq!(q.usable, 7);
        assert!((q.quality.accuracy_deg - 0.5).abs() < 1e-6);
    }

    #[test]
    fn invalid_flag_counts_as_loss() {
        let mut samples = fixation_samples(&fixation(), &[0.0; 4], 0, 1_667);
        samples[0].right.gaze_valid = false;
        let q = estimate_point(&point(samples), Eye::Right);
        assert_eq!(q.quality.data_loss, 0.25);
    }

    #[test]
    fn precision_from_consecutive_angles() {
        // Consecutive differences: 0.2, -0.4, 0.2 -> angles 0.2, 0.4, 0.2.
        let p = point(fixation_samples(&fixation(), &[1.0, 1.2, 0.8, 1.0], 0, 1_667));
        let q = estimate_point(&p, Eye::Left).quality;
        let expected_rms = ((0.04 + 0.16 + 0.04) / 3.0_f64).sqrt();
        assert!((q.precision_rms_deg - expected_rms).abs() < 1e-6);
        let m: f64 = 0.8 / 3.0;
        let expected_sd = ((2.0 * (0.2 - m).powi(2) + (0.4 - m).powi(2)) / 3.0_f64).sqrt();
        assert!((q.sd_deg - expected_sd).abs() < 1e-6);
    }

    #[test]
    fn single_sample_has_undefined_precision() {
        let p = point(fixation_samples(&fixation(), &[0.7], 0, 1_667));
        let q = estimate_point(&p, Eye::Left).quality;
        assert!((q.accuracy_deg - 0.7).abs() < 1e-6);
        assert!(q.precision_rms_deg.is_nan());
        assert!(q.sd_deg.is_nan());
        assert_eq!(q.data_loss, 0.0);
    }

    #[test]
    fn empty_target_poisons_eye_average() {
        let good = point(fixation_samples(&fixation(), &[0.5; 5], 0, 1_667));
        let mut lost = fixation_samples(&fixation(), &[0.5; 5], 10_000, 1_667);
        for s in &mut lost {
            s.left = EyeSample::missing();
        }
        let summary = estimate_report(&[good, point(lost)], EyeSelection::Both);
        assert!(summary.report.accuracy_left_deg.is_nan());
        assert!(summary.report.precision_rms_left_deg.is_nan());
        assert_eq!(summary.report.data_loss_left, 0.5);
        assert!((summary.report.accuracy_right_deg - 0.5).abs() < 1e-6);
    }

    #[test]
    fn excluded_eye_is_nan_not_zero() {
        let p = point(fixation_samples(&fixation(), &[0.0; 5], 0, 1_667));
        let summary = estimate_report(&[p], EyeSelection::Left);
        let right = summary.report.eye(Eye::Right);
        assert!(right.accuracy_deg.is_nan());
        assert!(right.precision_rms_deg.is_nan());
        assert!(right.sd_deg.is_nan());
        assert!(right.data_loss.is_nan());
        assert!(summary.report.accuracy_left_deg < 1e-4);
        assert_eq!(summary.points[0].right.usable, 0);
    }

    #[test]
    fn result_is_independent_of_target_order() {
        let jitter = AngularJitter {
            seed: 9,
            max_abs_deg: 0.4,
        };
        let targets: Vec<ValidationPointResult> = (0..4)
            .map(|i| {
                let f = Fixation::binocular(
                    Pt3::new(0.0, 180.0, 620.0),
                    Pt3::new(-150.0 + 100.0 * i as Real, 200.0, 30.0),
                );
                ValidationPointResult {
                    target_display: f.target_display,
                    target_ucs: f.target_ucs,
                    samples: fixation_samples(&f, &jitter.offsets(i, 30), 0, 1_667),
                }
            })
            .collect();
        let forward = estimate_report(&targets, EyeSelection::Both).report;
        let mut reversed = targets.clone();
        reversed.reverse();
        let backward = estimate_report(&reversed, EyeSelection::Both).report;
        assert!((forward.accuracy_left_deg - backward.accuracy_left_deg).abs() < 1e-12);
        assert!((forward.precision_rms_right_deg - backward.precision_rms_right_deg).abs() < 1e-12);
    }

    #[test]
    fn report_json_keeps_nan_as_null() {
        let report = DataQualityReport::nan();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"accuracy_left_deg\":null"));
        let restored: DataQualityReport = serde_json::from_str(&json).unwrap();
        assert!(restored.accuracy_left_deg.is_nan());
    }
}
