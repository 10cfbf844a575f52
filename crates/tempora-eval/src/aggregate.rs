use crate::threshold::accepts;
use serde::Serialize;
use std::collections::BTreeMap;
use tempora_scores::ScoreSequences;

/// Decision values per sample, indexed by bucket. Same raggedness as the input scores.
pub type DecisionSequences = BTreeMap<String, Vec<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    Instantaneous,
    Averaged,
}

pub fn aggregate(sequences: &ScoreSequences, mode: AggregationMode) -> DecisionSequences {
    sequences
        .iter()
        .map(|(id, scores)| {
            let values = match mode {
                AggregationMode::Instantaneous => scores.clone(),
                AggregationMode::Averaged => running_mean(scores),
            };
            (id.clone(), values)
        })
        .collect()
}

/// Mean of `values[0..=k]` for every k, updated incrementally.
///
/// Both terms are scaled before they are combined, so finite inputs near `f64::MAX` of either
/// sign never overflow.
pub fn running_mean(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut mean = 0.0f64;
    for (idx, value) in values.iter().enumerate() {
        let n = (idx + 1) as f64;
        mean = mean + value / n - mean / n;
        out.push(mean);
    }
    out
}

/// Running mean of per-window votes: +1 when the window is accepted at `threshold`, -1
/// otherwise. The result is meant to be thresholded at 0.
pub fn vote_average(sequences: &ScoreSequences, threshold: f64) -> DecisionSequences {
    sequences
        .iter()
        .map(|(id, scores)| {
            let votes: Vec<f64> = scores
                .iter()
                .map(|s| if accepts(*s, threshold) { 1.0 } else { -1.0 })
                .collect();
            (id.clone(), running_mean(&votes))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> ScoreSequences {
        let mut seqs = BTreeMap::new();
        seqs.insert("long".to_string(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        seqs.insert("short".to_string(), vec![0.5, -0.5, 0.0]);
        seqs.insert("empty".to_string(), vec![]);
        seqs
    }

    #[test]
    fn instantaneous_is_the_raw_score() {
        let out = aggregate(&batch(), AggregationMode::Instantaneous);
        assert_eq!(out["long"], vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(out["short"].len(), 3);
        assert!(out["empty"].is_empty());
    }

    #[test]
    fn averaged_keeps_lengths_and_means() {
        let out = aggregate(&batch(), AggregationMode::Averaged);
        assert_eq!(out["long"], vec![1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(out["short"], vec![0.5, 0.0, 0.0]);
        assert!(out["empty"].is_empty());
    }

    #[test]
    fn running_mean_survives_extreme_scores() {
        let out = running_mean(&[f64::MAX, -f64::MAX]);
        assert_eq!(out[0], f64::MAX);
        assert!(out[1].is_finite());
        assert!(out[1].abs() < 1e300, "{}", out[1]);

        let out = running_mean(&[1e308, 1e308, 1e308]);
        assert!(out.iter().all(|m| m.is_finite()));
        assert!((out[2] - 1e308).abs() <= 1e308 * 1e-12);
    }

    #[test]
    fn votes_average_window_decisions() {
        let out = vote_average(&batch(), 2.5);
        let expected = [-1.0, -1.0, -1.0 / 3.0, 0.0, 0.2];
        assert_eq!(out["long"].len(), expected.len());
        for (got, want) in out["long"].iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
        assert_eq!(out["short"].len(), 3);
        assert!(out["short"].iter().all(|m| (m + 1.0).abs() < 1e-12));
    }
}
