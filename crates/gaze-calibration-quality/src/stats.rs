//! Small statistics helpers with NaN-for-empty semantics.

use gaze_calibration_core::Real;

/// Median of the values; NaN for an empty slice.
pub fn median(values: &[Real]) -> Real {
    if values.is_empty() {
        return Real::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Arithmetic mean; NaN for an empty slice, NaN-propagating otherwise.
pub fn mean(values: &[Real]) -> Real {
    values.iter().sum::<Real>() / values.len() as Real
}

/// Root mean square; NaN for an empty slice.
pub fn rms(values: &[Real]) -> Real {
    (values.iter().map(|v| v * v).sum::<Real>() / values.len() as Real).sqrt()
}

/// Population standard deviation (divides by `n`); NaN for an empty slice.
pub fn population_std(values: &[Real]) -> Real {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<Real>() / values.len() as Real).sqrt()
}
