//! Calibration attempts recorded during a session.
//!
//! Attempts are append-only: an index handed out by
//! [`CalibrationRepository::append`] refers to the same attempt for the life
//! of the session. At most one attempt is marked as used.

use anyhow::{Result, ensure};
use gaze_calibration_core::EyeSelection;
use gaze_calibration_quality::DataQualityReport;
use serde::{Deserialize, Serialize};

/// A computed calibration together with its validation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationAttempt {
    /// `None` only between [`CalibrationRepository::discard_report`] and the
    /// end of the revalidation that replaces it.
    pub report: Option<DataQualityReport>,
    /// Tracker-specific calibration snapshot.
    pub calibration_blob: Vec<u8>,
    pub used: bool,
}

impl CalibrationAttempt {
    pub fn new(report: DataQualityReport, calibration_blob: Vec<u8>) -> Self {
        Self {
            report: Some(report),
            calibration_blob,
            used: false,
        }
    }
}

/// Ordered collection of attempts for one eye selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRepository {
    attempts: Vec<CalibrationAttempt>,
    /// Operator selection made since the last append; the last attempt
    /// otherwise.
    selected: Option<usize>,
}

impl CalibrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an attempt, make it the selection and return its index.
    pub fn append(&mut self, attempt: CalibrationAttempt) -> usize {
        self.attempts.push(attempt);
        self.selected = None;
        self.attempts.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&CalibrationAttempt> {
        self.attempts.get(index)
    }

    pub fn attempts(&self) -> &[CalibrationAttempt] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Operator selection, defaulting to the most recent attempt.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected.or_else(|| self.attempts.len().checked_sub(1))
    }

    pub fn selected(&self) -> Option<&CalibrationAttempt> {
        self.selected_index().and_then(|i| self.attempts.get(i))
    }

    /// # Errors
    ///
    /// Returns an error if `index` does not refer to a stored attempt.
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.selected = Some(index);
        Ok(())
    }

    /// Mark `index` as the attempt in use and every other attempt as unused.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` does not refer to a stored attempt.
    pub fn mark_used(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        for (i, attempt) in self.attempts.iter_mut().enumerate() {
            attempt.used = i == index;
        }
        Ok(())
    }

    /// Drop the report of `index` ahead of revalidation.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` does not refer to a stored attempt.
    pub fn discard_report(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.attempts[index].report = None;
        Ok(())
    }

    /// Store a fresh report for an existing attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` does not refer to a stored attempt.
    pub fn replace_report(&mut self, index: usize, report: DataQualityReport) -> Result<()> {
        self.check_index(index)?;
        self.attempts[index].report = Some(report);
        Ok(())
    }

    /// Reports in attempt order.
    pub fn reports(&self) -> Vec<Option<&DataQualityReport>> {
        self.attempts.iter().map(|a| a.report.as_ref()).collect()
    }

    /// Index of the attempt marked as used, if any.
    pub fn used_index(&self) -> Option<usize> {
        self.attempts.iter().position(|a| a.used)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        ensure!(
            index < self.attempts.len(),
            "attempt index {index} out of range ({} attempts)",
            self.attempts.len()
        );
        Ok(())
    }
}

/// One repository per eye selection, so monocular passes keep their own
/// attempts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySet {
    pub both: CalibrationRepository,
    pub left: CalibrationRepository,
    pub right: CalibrationRepository,
}

impl RepositorySet {
    pub fn get(&self, eyes: EyeSelection) -> &CalibrationRepository {
        match eyes {
            EyeSelection::Both => &self.both,
            EyeSelection::Left => &self.left,
            EyeSelection::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, eyes: EyeSelection) -> &mut CalibrationRepository {
        match eyes {
            EyeSelection::Both => &mut self.both,
            EyeSelection::Left => &mut self.left,
            EyeSelection::Right => &mut self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(accuracy: f64) -> DataQualityReport {
        DataQualityReport {
            accuracy_left_deg: accuracy,
            accuracy_right_deg: accuracy,
            ..DataQualityReport::nan()
        }
    }

    fn attempt(accuracy: f64, blob: &[u8]) -> CalibrationAttempt {
        CalibrationAttempt::new(report(accuracy), blob.to_vec())
    }

    #[test]
    fn selection_defaults_to_last() {
        let mut repo = CalibrationRepository::new();
        assert_eq!(repo.selected_index(), None);
        assert_eq!(repo.append(attempt(1.0, b"a")), 0);
        assert_eq!(repo.append(attempt(0.5, b"b")), 1);
        assert_eq!(repo.selected_index(), Some(1));

        repo.select(0).unwrap();
        assert_eq!(repo.selected().unwrap().calibration_blob, b"a");

        assert_eq!(repo.append(attempt(0.7, b"c")), 2);
        assert_eq!(repo.selected_index(), Some(2));
        assert_eq!(repo.selected().unwrap().calibration_blob, b"c");
    }

    #[test]
    fn select_out_of_range_fails() {
        let mut repo = CalibrationRepository::new();
        repo.append(attempt(1.0, b"a"));
        assert!(repo.select(1).is_err());
        assert_eq!(repo.selected_index(), Some(0));
    }

    #[test]
    fn mark_used_is_exclusive() {
        let mut repo = CalibrationRepository::new();
        for blob in [b"a", b"b", b"c"] {
            repo.append(attempt(1.0, blob));
        }
        repo.mark_used(1).unwrap();
        repo.mark_used(2).unwrap();
        let used: Vec<bool> = repo.attempts().iter().map(|a| a.used).collect();
        assert_eq!(used, vec![false, false, true]);
        assert_eq!(repo.used_index(), Some(2));
    }

    #[test]
    fn revalidation_replaces_report_in_place() {
        let mut repo = CalibrationRepository::new();
        repo.append(attempt(1.0, b"a"));
        repo.append(attempt(2.0, b"b"));

        repo.discard_report(0).unwrap();
        assert!(repo.get(0).unwrap().report.is_none());
        assert_eq!(repo.len(), 2);

        repo.replace_report(0, report(0.4)).unwrap();
        let reports = repo.reports();
        assert_eq!(reports[0].unwrap().accuracy_left_deg, 0.4);
        assert_eq!(reports[1].unwrap().accuracy_left_deg, 2.0);
        assert_eq!(repo.get(0).unwrap().calibration_blob, b"a");
    }

    #[test]
    fn sets_keep_selections_apart() {
        let mut set = RepositorySet::default();
        set.get_mut(EyeSelection::Left).append(attempt(1.0, b"l"));
        assert_eq!(set.get(EyeSelection::Left).len(), 1);
        assert!(set.get(EyeSelection::Right).is_empty());
        assert!(set.get(EyeSelection::Both).is_empty());
    }

    #[test]
    fn json_roundtrip_keeps_nan_reports() {
        let mut repo = CalibrationRepository::new();
        repo.append(attempt(0.8, &[1, 2, 3]));
        repo.mark_used(0).unwrap();
        let json = serde_json::to_string(&repo).unwrap();
        let restored: CalibrationRepository = serde_json::from_str(&json).unwrap();
        let a = restored.get(0).unwrap();
        assert!(a.used);
        assert_eq!(a.calibration_blob, vec![1, 2, 3]);
        assert!(a.report.unwrap().sd_left_deg.is_nan());
    }
}
