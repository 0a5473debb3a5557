// File: src/core/estimator.rs
use crate::core::types::{ClusterObservation, ConfidenceInterval, ThresholdModel};

/// Acceptance ratio the breakpoint is defined at.
const TARGET_RATIO: f64 = 0.5;

/// Counts below one are lifted to one before taking the log.
const MIN_FREQUENCY: f64 = 1.0;

/// Tuning for [`ThresholdEstimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    /// While no observation falls below this ratio, the model reports `all_acceptable`.
    pub all_acceptable_cutoff: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self { all_acceptable_cutoff: 0.7 }
    }
}

#[derive(Debug, Clone, Copy)]
struct Point {
    x: f64,
    y: f64,
}

/// Local-interpolation breakpoint estimator over (ln frequency, acceptance ratio) points.
///
/// Stateless: every call refits from the full observation list, so the order
/// observations were collected in does not matter.
#[derive(Debug, Clone, Default)]
pub struct ThresholdEstimator {
    config: EstimatorConfig,
}

impl ThresholdEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Fits a model to `observations`. `None` only when the list is empty.
    pub fn estimate(&self, observations: &[ClusterObservation]) -> Option<ThresholdModel> {
        if observations.is_empty() {
            return None;
        }

        if observations
            .iter()
            .all(|o| o.acceptance_ratio >= self.config.all_acceptable_cutoff)
        {
            return Some(all_acceptable(observations));
        }

        let mut points: Vec<Point> = observations
            .iter()
            .map(|o| Point {
                x: o.avg_frequency.max(MIN_FREQUENCY).ln(),
                y: o.acceptance_ratio,
            })
            .collect();
        points.sort_by(|a, b| a.x.total_cmp(&b.x));

        if points.len() < 3 {
            let mean_x = points.iter().map(|p| p.x).sum::<f64>() / points.len() as f64;
            let threshold = mean_x.exp();
            return Some(ThresholdModel {
                threshold,
                slope: 1.0,
                confidence: ConfidenceInterval {
                    lower: threshold / 2.0,
                    upper: threshold * 2.0,
                },
                all_acceptable: false,
            });
        }

        let (log_threshold, slope) = interpolate(&points);
        Some(ThresholdModel {
            threshold: log_threshold.exp(),
            slope,
            confidence: log_band(&points, log_threshold),
            all_acceptable: false,
        })
    }
}

/// Nothing rejected yet: place the threshold below everything seen.
fn all_acceptable(observations: &[ClusterObservation]) -> ThresholdModel {
    let min = observations
        .iter()
        .map(|o| o.min_frequency)
        .min()
        .unwrap_or(0) as f64;
    ThresholdModel {
        threshold: min / 2.0,
        slope: 0.0,
        confidence: ConfidenceInterval {
            lower: min / 4.0,
            upper: min,
        },
        all_acceptable: true,
    }
}

/// Returns `(ln threshold, slope)` around the point whose ratio is nearest 0.5.
/// `points` must be sorted by `x` and hold at least three entries.
fn interpolate(points: &[Point]) -> (f64, f64) {
    let pivot = points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (a.y - TARGET_RATIO)
                .abs()
                .total_cmp(&(b.y - TARGET_RATIO).abs())
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    if pivot == 0 || pivot + 1 == points.len() {
        return (points[pivot].x, 1.0);
    }

    let before = points[pivot - 1];
    let at = points[pivot];
    let after = points[pivot + 1];

    for (lo, hi) in [(before, at), (at, after)] {
        if straddles(lo.y, hi.y) {
            let t = (TARGET_RATIO - lo.y) / (hi.y - lo.y);
            return (lo.x + t * (hi.x - lo.x), slope_between(lo, hi));
        }
    }

    // Neither neighbour pair brackets 0.5; the slope still comes from the neighbours.
    (at.x, slope_between(before, after))
}

fn straddles(a: f64, b: f64) -> bool {
    (a > TARGET_RATIO && b < TARGET_RATIO) || (a < TARGET_RATIO && b > TARGET_RATIO)
}

fn slope_between(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    if dx.abs() < f64::EPSILON {
        0.0
    } else {
        (b.y - a.y) / dx
    }
}

/// Heuristic band: two RMS deviations of ln(frequency) around the threshold.
fn log_band(points: &[Point], log_threshold: f64) -> ConfidenceInterval {
    let variance = points
        .iter()
        .map(|p| (p.x - log_threshold).powi(2))
        .sum::<f64>()
        / points.len() as f64;
    let std_dev = variance.sqrt();
    ConfidenceInterval {
        lower: (log_threshold - 2.0 * std_dev).exp(),
        upper: (log_threshold + 2.0 * std_dev).exp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WordFrequencyRecord;
    use proptest::prelude::*;

    /// Ten identical-frequency words with `bad` of them rejected.
    fn obs(frequency: u64, bad: usize) -> ClusterObservation {
        let words = (0..10)
            .map(|i| WordFrequencyRecord::new(format!("w{i}"), frequency))
            .collect();
        ClusterObservation::new(words, 0, bad)
    }

    fn obs_of(frequency: u64, size: usize, bad: usize) -> ClusterObservation {
        let words = (0..size)
            .map(|i| WordFrequencyRecord::new(format!("w{i}"), frequency))
            .collect();
        ClusterObservation::new(words, 0, bad)
    }

    fn fit(observations: &[ClusterObservation]) -> ThresholdModel {
        ThresholdEstimator::default().estimate(observations).unwrap()
    }

    #[test]
    fn empty_input_has_no_model() {
        assert!(ThresholdEstimator::default().estimate(&[]).is_none());
    }

    #[test]
    fn two_points_use_geometric_mean() {
        let model = fit(&[obs(100, 0), obs(10, 10)]);
        assert!((model.threshold - 1000f64.sqrt()).abs() < 1e-9);
        assert_eq!(model.slope, 1.0);
        assert!((model.confidence.ratio() - 4.0).abs() < 1e-12);
        assert!(!model.all_acceptable);
    }

    #[test]
    fn tied_pivot_picks_lowest_frequency() {
        // Sorted by x: 10 (0.0), 100 (1.0), 1000 (1.0). All are 0.5 away, so the first wins and sits on the boundary.
        let model = fit(&[obs(1000, 0), obs(10, 10), obs(100, 0)]);
        assert!((model.threshold - 10.0).abs() < 1e-9);
        assert_eq!(model.slope, 1.0);
    }

    #[test]
    fn straddling_pair_is_interpolated() {
        // 10 (0.2), 100 (0.6), 1000 (1.0): pivot is 100 at 0.6; pair (10, 100) straddles.
        let model = fit(&[obs(10, 8), obs(100, 4), obs(1000, 0)]);
        let t = (0.5 - 0.2) / (0.6 - 0.2);
        let expected = (10f64.ln() + t * (100f64.ln() - 10f64.ln())).exp();
        assert!((model.threshold - expected).abs() < 1e-9);
        let slope = (0.6 - 0.2) / (100f64.ln() - 10f64.ln());
        assert!((model.slope - slope).abs() < 1e-12);
        assert!(model.confidence.lower < model.threshold && model.threshold < model.confidence.upper);
    }

    #[test]
    fn right_hand_pair_is_used_when_left_does_not_straddle() {
        // 10 (0.40), 100 (0.45), 1000 (0.90): pivot is 100; only (100, 1000) brackets 0.5.
        let model = fit(&[obs_of(10, 20, 12), obs_of(100, 20, 11), obs(1000, 1)]);
        let t = (0.5 - 0.45) / (0.9 - 0.45);
        let expected = (100f64.ln() + t * (1000f64.ln() - 100f64.ln())).exp();
        assert!((model.threshold - expected).abs() < 1e-9);
    }

    #[test]
    fn no_straddle_falls_back_to_pivot_with_neighbour_slope() {
        // 10 (0.0), 100 (0.5), 1000 (0.9): pivot sits exactly at 0.5 so nothing straddles.
        let model = fit(&[obs(10, 10), obs(100, 5), obs(1000, 1)]);
        assert!((model.threshold - 100.0).abs() < 1e-9);
        let slope = (0.9 - 0.0) / (1000f64.ln() - 10f64.ln());
        assert!((model.slope - slope).abs() < 1e-12);
    }

    #[test]
    fn boundary_pivot_uses_unit_slope() {
        // 10 (0.4), 100 (0.0), 1000 (0.0): nearest to 0.5 is the lowest-x point.
        let model = fit(&[obs(10, 6), obs(100, 10), obs(1000, 10)]);
        assert!((model.threshold - 10.0).abs() < 1e-9);
        assert_eq!(model.slope, 1.0);
    }

    #[test]
    fn confidence_band_is_two_rms_deviations() {
        let model = fit(&[obs(10, 8), obs(100, 4), obs(1000, 0)]);
        let lt = model.threshold.ln();
        let xs = [10f64.ln(), 100f64.ln(), 1000f64.ln()];
        let sd = (xs.iter().map(|x| (x - lt).powi(2)).sum::<f64>() / 3.0).sqrt();
        assert!((model.confidence.lower - (lt - 2.0 * sd).exp()).abs() < 1e-9);
        assert!((model.confidence.upper - (lt + 2.0 * sd).exp()).abs() < 1e-6);
    }

    #[test]
    fn all_acceptable_override() {
        let model = fit(&[obs(500, 0), obs(40, 3), obs(9000, 1)]);
        assert!(model.all_acceptable);
        assert_eq!(model.threshold, 20.0);
        assert_eq!(model.confidence.lower, 10.0);
        assert_eq!(model.confidence.upper, 40.0);
    }

    #[test]
    fn custom_cutoff_changes_override() {
        let estimator = ThresholdEstimator::new(EstimatorConfig { all_acceptable_cutoff: 0.95 });
        let model = estimator.estimate(&[obs(500, 0), obs(40, 3), obs(9000, 1)]).unwrap();
        assert!(!model.all_acceptable);
    }

    #[test]
    fn collection_order_does_not_matter() {
        let a = [obs(10, 8), obs(100, 4), obs(1000, 0), obs(30, 6)];
        let b = [obs(30, 6), obs(1000, 0), obs(10, 8), obs(100, 4)];
        assert_eq!(fit(&a), fit(&b));
    }

    proptest! {
        #[test]
        fn accepted_sets_always_report_half_the_minimum(
            freqs in proptest::collection::vec(1u64..1_000_000, 1..12),
            bads in proptest::collection::vec(0usize..=3, 12),
        ) {
            let observations: Vec<_> = freqs.iter().zip(&bads).map(|(&f, &b)| obs(f, b)).collect();
            let model = fit(&observations);
            let min = *freqs.iter().min().unwrap() as f64;
            prop_assert!(model.all_acceptable);
            prop_assert_eq!(model.threshold, min / 2.0);
        }

        #[test]
        fn two_mixed_points_have_ratio_four(f1 in 1u64..1_000_000, f2 in 1u64..1_000_000, bad in 4usize..=10) {
            let model = fit(&[obs(f1, 0), obs(f2, bad)]);
            prop_assert!((model.confidence.ratio() - 4.0).abs() < 1e-9);
        }
    }
}
