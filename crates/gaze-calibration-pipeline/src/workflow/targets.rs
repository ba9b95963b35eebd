//! Target lists for one calibration or validation pass.

use gaze_calibration_core::{CoordinateSpace, MonitorGeometry, Pt2, convert};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// A target in both the tracker's and the renderer's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    /// Tracker-normalized position, handed to the tracker.
    pub tracker_position: Pt2,
    /// Same position in the renderer's space.
    pub display_position: Pt2,
}

/// Build targets for `points` (tracker-normalized) in shuffled order.
pub fn shuffled_targets(
    points: &[Pt2],
    space: CoordinateSpace,
    monitor: &MonitorGeometry,
    rng: &mut StdRng,
) -> Vec<TargetPoint> {
    let display = convert(points, CoordinateSpace::TrackerNormalized, space, monitor);
    let mut targets: Vec<TargetPoint> = points
        .iter()
        .zip(display)
        .map(|(&tracker_position, display_position)| TargetPoint {
            tracker_position,
            display_position,
        })
        .collect();
    targets.shuffle(rng);
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn points() -> Vec<Pt2> {
        (0..9)
            .map(|i| Pt2::new(0.1 + 0.1 * i as f64, 0.5))
            .collect()
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let pts = points();
        let targets = shuffled_targets(
            &pts,
            CoordinateSpace::TrackerNormalized,
            &MonitorGeometry::default(),
            &mut rng,
        );
        let mut xs: Vec<f64> = targets.iter().map(|t| t.tracker_position.x).collect();
        xs.sort_by(f64::total_cmp);
        let expected: Vec<f64> = pts.iter().map(|p| p.x).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn same_seed_same_order() {
        let pts = points();
        let monitor = MonitorGeometry::default();
        let a = shuffled_targets(
            &pts,
            CoordinateSpace::Pixel,
            &monitor,
            &mut StdRng::seed_from_u64(11),
        );
        let b = shuffled_targets(
            &pts,
            CoordinateSpace::Pixel,
            &monitor,
            &mut StdRng::seed_from_u64(11),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn display_position_follows_space() {
        let mut rng = StdRng::seed_from_u64(0);
        let targets = shuffled_targets(
            &[Pt2::new(0.5, 0.5)],
            CoordinateSpace::ScreenNormalized,
            &MonitorGeometry::default(),
            &mut rng,
        );
        assert_eq!(targets[0].tracker_position, Pt2::new(0.5, 0.5));
        assert!(targets[0].display_position.coords.norm() < 1e-12);
    }
}
