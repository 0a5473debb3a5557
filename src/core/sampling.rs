// File: src/core/sampling.rs
use crate::core::types::ClusterObservation;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in the frequency-sorted view the next cluster is drawn from.
/// Index 0 is the most common word, so low positions mean high frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    TopTail,
    BottomTail,
    HighFrequency,
    LowFrequency,
    VeryLowFrequency,
    #[default]
    Balanced,
}

impl SamplingStrategy {
    /// Draws a normalized position u in [0, 1) from this strategy's distribution.
    pub fn draw_unit<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        match self {
            Self::TopTail => rng.gen_range(0.0..0.05),
            Self::BottomTail => rng.gen_range(0.95..1.0),
            Self::HighFrequency => rng.gen_range(0.0..0.5),
            Self::LowFrequency => rng.gen_range(0.5..1.0),
            Self::VeryLowFrequency => rng.gen_range(0.7..1.0),
            // Mean of two uniforms: triangular density peaking at 0.5, a cheap stand-in for Beta(2,2).
            Self::Balanced => (rng.gen::<f64>() + rng.gen::<f64>()) / 2.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TopTail => "top_tail",
            Self::BottomTail => "bottom_tail",
            Self::HighFrequency => "high_frequency",
            Self::LowFrequency => "low_frequency",
            Self::VeryLowFrequency => "very_low_frequency",
            Self::Balanced => "balanced",
        }
    }
}

impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a strategy draw onto an index in `[0, n - 1]`. Returns 0 for an empty view.
pub fn position<R: Rng + ?Sized>(n: usize, strategy: SamplingStrategy, rng: &mut R) -> usize {
    if n == 0 {
        return 0;
    }
    let u = strategy.draw_unit(rng).clamp(0.0, 1.0);
    // u * n can round up to n when u sits just below 1.0
    ((u * n as f64).floor() as usize).min(n - 1)
}

/// Coverage pass used for the first samples regardless of responses.
pub const OPENING_SCHEDULE: [SamplingStrategy; 5] = [
    SamplingStrategy::Balanced,
    SamplingStrategy::TopTail,
    SamplingStrategy::BottomTail,
    SamplingStrategy::LowFrequency,
    SamplingStrategy::HighFrequency,
];

/// Rotation used once responses are mixed.
pub const MIXED_ROTATION: [SamplingStrategy; 5] = [
    SamplingStrategy::Balanced,
    SamplingStrategy::Balanced,
    SamplingStrategy::Balanced,
    SamplingStrategy::BottomTail,
    SamplingStrategy::TopTail,
];

/// Acceptance-ratio cutoffs that steer the adaptive phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveCutoffs {
    /// Every ratio above this pushes sampling toward rarer words.
    pub mostly_accepted: f64,
    /// Every ratio below this pushes sampling toward common words.
    pub mostly_rejected: f64,
}

impl Default for AdaptiveCutoffs {
    fn default() -> Self {
        Self { mostly_accepted: 0.7, mostly_rejected: 0.3 }
    }
}

/// Picks the strategy for the zero-based `sample_index` given everything observed so far.
pub fn choose_strategy(
    sample_index: usize,
    observations: &[ClusterObservation],
    cutoffs: AdaptiveCutoffs,
) -> SamplingStrategy {
    if let Some(&strategy) = OPENING_SCHEDULE.get(sample_index) {
        return strategy;
    }

    let all_accepted = !observations.is_empty()
        && observations.iter().all(|o| o.acceptance_ratio > cutoffs.mostly_accepted);
    let all_rejected = !observations.is_empty()
        && observations.iter().all(|o| o.acceptance_ratio < cutoffs.mostly_rejected);

    if all_accepted {
        if sample_index % 2 == 0 {
            SamplingStrategy::VeryLowFrequency
        } else {
            SamplingStrategy::BottomTail
        }
    } else if all_rejected {
        SamplingStrategy::HighFrequency
    } else {
        MIXED_ROTATION[sample_index % MIXED_ROTATION.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WordFrequencyRecord;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ALL: [SamplingStrategy; 6] = [
        SamplingStrategy::TopTail,
        SamplingStrategy::BottomTail,
        SamplingStrategy::HighFrequency,
        SamplingStrategy::LowFrequency,
        SamplingStrategy::VeryLowFrequency,
        SamplingStrategy::Balanced,
    ];

    fn obs_with_ratio(bad: usize) -> ClusterObservation {
        let words = (0..10).map(|i| WordFrequencyRecord::new(format!("w{i}"), 100)).collect();
        ClusterObservation::new(words, 0, bad)
    }

    #[test]
    fn lowest_draw_lands_at_each_region_start() {
        let mut rng = StepRng::new(0, 0);
        assert_eq!(position(1000, SamplingStrategy::TopTail, &mut rng), 0);
        assert_eq!(position(1000, SamplingStrategy::BottomTail, &mut rng), 950);
        assert_eq!(position(1000, SamplingStrategy::LowFrequency, &mut rng), 500);
        assert_eq!(position(1000, SamplingStrategy::VeryLowFrequency, &mut rng), 700);
        assert_eq!(position(1000, SamplingStrategy::Balanced, &mut rng), 0);
    }

    #[test]
    fn highest_draw_stays_inside_view() {
        let mut rng = StepRng::new(u64::MAX, 0);
        for strategy in ALL {
            let idx = position(1000, strategy, &mut rng);
            assert!(idx <= 999, "{strategy} gave {idx}");
        }
        assert_eq!(position(1000, SamplingStrategy::BottomTail, &mut rng), 999);
    }

    #[test]
    fn strategies_stay_in_their_region() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(position(1000, SamplingStrategy::TopTail, &mut rng) < 50);
            assert!(position(1000, SamplingStrategy::BottomTail, &mut rng) >= 950);
            assert!(position(1000, SamplingStrategy::HighFrequency, &mut rng) < 500);
            assert!(position(1000, SamplingStrategy::LowFrequency, &mut rng) >= 500);
            assert!(position(1000, SamplingStrategy::VeryLowFrequency, &mut rng) >= 700);
        }
    }

    #[test]
    fn balanced_concentrates_in_the_middle() {
        let mut rng = StdRng::seed_from_u64(11);
        let middle = (0..4000)
            .map(|_| position(1000, SamplingStrategy::Balanced, &mut rng))
            .filter(|&i| (250..750).contains(&i))
            .count();
        // Triangular density puts 75% of its mass in the middle half.
        assert!(middle > 2800, "middle={middle}");
    }

    #[test]
    fn opening_schedule_ignores_responses() {
        let rejected = vec![obs_with_ratio(10); 3];
        for (i, expected) in OPENING_SCHEDULE.iter().enumerate() {
            assert_eq!(choose_strategy(i, &rejected, AdaptiveCutoffs::default()), *expected);
        }
    }

    #[test]
    fn all_accepted_alternates_toward_rare_words() {
        let accepted = vec![obs_with_ratio(0); 5];
        let cutoffs = AdaptiveCutoffs::default();
        assert_eq!(choose_strategy(5, &accepted, cutoffs), SamplingStrategy::BottomTail);
        assert_eq!(choose_strategy(6, &accepted, cutoffs), SamplingStrategy::VeryLowFrequency);
        assert_eq!(choose_strategy(7, &accepted, cutoffs), SamplingStrategy::BottomTail);
    }

    #[test]
    fn all_rejected_pushes_toward_common_words() {
        let rejected = vec![obs_with_ratio(8); 5];
        assert_eq!(
            choose_strategy(5, &rejected, AdaptiveCutoffs::default()),
            SamplingStrategy::HighFrequency
        );
    }

    #[test]
    fn mixed_responses_cycle_the_rotation() {
        let mut mixed = vec![obs_with_ratio(0); 4];
        mixed.push(obs_with_ratio(9));
        let cutoffs = AdaptiveCutoffs::default();
        let picks: Vec<_> = (5..10).map(|i| choose_strategy(i, &mixed, cutoffs)).collect();
        assert_eq!(
            picks,
            vec![
                SamplingStrategy::Balanced,
                SamplingStrategy::Balanced,
                SamplingStrategy::Balanced,
                SamplingStrategy::BottomTail,
                SamplingStrategy::TopTail,
            ]
        );
    }

    #[test]
    fn ratio_exactly_at_cutoff_is_not_all_accepted() {
        let at_cutoff = vec![obs_with_ratio(3); 5];
        assert_eq!(
            choose_strategy(5, &at_cutoff, AdaptiveCutoffs::default()),
            SamplingStrategy::Balanced
        );
    }

    proptest! {
        #[test]
        fn position_is_always_a_valid_index(n in 1usize..100_000, seed in any::<u64>(), pick in 0usize..6) {
            let mut rng = StdRng::seed_from_u64(seed);
            let idx = position(n, ALL[pick], &mut rng);
            prop_assert!(idx < n);
        }
    }
}
