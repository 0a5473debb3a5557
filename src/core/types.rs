// src/core/types.rs
use serde::{Deserialize, Serialize};

/// A word paired with its occurrence count in the frequency corpus.
/// This is the unit every corpus view is made of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequencyRecord {
    pub word: String,
    pub frequency: u64,
}

impl WordFrequencyRecord {
    pub fn new(word: impl Into<String>, frequency: u64) -> Self {
        Self { word: word.into(), frequency }
    }
}

/// Lower and upper bound of the breakpoint estimate, in frequency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// `upper / lower`. Infinite when the lower bound collapses to zero.
    pub fn ratio(&self) -> f64 {
        if self.lower <= 0.0 {
            f64::INFINITY
        } else {
            self.upper / self.lower
        }
    }
}

/// One operator judgment over one sampled cluster. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterObservation {
    pub words: Vec<WordFrequencyRecord>,
    pub center_index: usize,
    pub avg_frequency: f64,
    pub bad_count: usize,
    /// `1 - bad_count / words.len()`, always in [0, 1].
    pub acceptance_ratio: f64,
    pub min_frequency: u64,
    pub max_frequency: u64,
}

impl ClusterObservation {
    /// Builds an observation from the words actually shown to the operator.
    /// `bad_count` is clamped to the cluster length; an empty cluster counts as fully accepted.
    pub fn new(words: Vec<WordFrequencyRecord>, center_index: usize, bad_count: usize) -> Self {
        let len = words.len();
        let bad_count = bad_count.min(len);
        let (avg_frequency, acceptance_ratio) = if len == 0 {
            (0.0, 1.0)
        } else {
            let total: f64 = words.iter().map(|w| w.frequency as f64).sum();
            (total / len as f64, 1.0 - bad_count as f64 / len as f64)
        };
        let min_frequency = words.iter().map(|w| w.frequency).min().unwrap_or(0);
        let max_frequency = words.iter().map(|w| w.frequency).max().unwrap_or(0);

        Self {
            words,
            center_index,
            avg_frequency,
            bad_count,
            acceptance_ratio,
            min_frequency,
            max_frequency,
        }
    }
}

/// The fitted breakpoint. A pure function of the observation list; rebuilt on every new observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdModel {
    pub threshold: f64,
    /// Change in acceptance ratio per unit of ln(frequency).
    pub slope: f64,
    pub confidence: ConfidenceInterval,
    /// Set when no observation fell below the acceptance cutoff, so no falling edge was seen yet.
    pub all_acceptable: bool,
}

/// Final outcome of one per-length session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub word_length: usize,
    pub model: ThresholdModel,
    /// Words from the same corpus view whose frequency is nearest the threshold.
    pub examples: Vec<WordFrequencyRecord>,
    pub samples: usize,
    pub stopped_early: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(freqs: &[u64]) -> Vec<WordFrequencyRecord> {
        freqs
            .iter()
            .enumerate()
            .map(|(i, &f)| WordFrequencyRecord::new(format!("w{i}"), f))
            .collect()
    }

    #[test]
    fn observation_derives_ratio_and_extremes() {
        let obs = ClusterObservation::new(words(&[40, 30, 20, 10]), 2, 1);
        assert_eq!(obs.acceptance_ratio, 0.75);
        assert_eq!(obs.avg_frequency, 25.0);
        assert_eq!(obs.min_frequency, 10);
        assert_eq!(obs.max_frequency, 40);
    }

    #[test]
    fn bad_count_is_clamped_to_cluster_length() {
        let obs = ClusterObservation::new(words(&[5, 4]), 0, 9);
        assert_eq!(obs.bad_count, 2);
        assert_eq!(obs.acceptance_ratio, 0.0);
    }

    #[test]
    fn confidence_ratio_with_zero_lower_is_infinite() {
        let ci = ConfidenceInterval { lower: 0.0, upper: 10.0 };
        assert!(ci.ratio().is_infinite());
        let ci = ConfidenceInterval { lower: 5.0, upper: 10.0 };
        assert_eq!(ci.ratio(), 2.0);
    }

    proptest! {
        #[test]
        fn ratio_is_one_minus_bad_over_size(
            (size, bad) in (1usize..50).prop_flat_map(|size| (Just(size), 0..=size)),
        ) {
            let obs = ClusterObservation::new(words(&vec![7; size]), 0, bad);
            prop_assert!((0.0..=1.0).contains(&obs.acceptance_ratio));
            prop_assert_eq!(obs.acceptance_ratio, 1.0 - bad as f64 / size as f64);
        }
    }
}
