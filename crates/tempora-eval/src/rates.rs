use crate::aggregate::DecisionSequences;
use crate::threshold::accepts;
use serde::Serialize;

/// Error rates at one bucket. `None` marks a rate with no population behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorRates {
    pub bucket: usize,
    pub far: Option<f64>,
    pub frr: Option<f64>,
    pub hter: Option<f64>,
    pub genuine: usize,
    pub attack: usize,
}

/// One record per bucket from 0 to the longest sequence's last window. Each bucket only
/// counts the samples that reach it.
pub fn evaluate(
    genuine: &DecisionSequences,
    attack: &DecisionSequences,
    threshold: f64,
) -> Vec<ErrorRates> {
    let buckets = genuine
        .values()
        .chain(attack.values())
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    let rejected = tally(genuine, buckets, |v| !accepts(v, threshold));
    let accepted = tally(attack, buckets, |v| accepts(v, threshold));

    rejected
        .iter()
        .zip(&accepted)
        .enumerate()
        .map(|(bucket, (g, a))| {
            let far = a.rate();
            let frr = g.rate();
            ErrorRates {
                bucket,
                far,
                frr,
                hter: far.zip(frr).map(|(far, frr)| (far + frr) / 2.0),
                genuine: g.population,
                attack: a.population,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    population: usize,
    errors: usize,
}

impl Tally {
    fn rate(&self) -> Option<f64> {
        (self.population > 0).then(|| self.errors as f64 / self.population as f64)
    }
}

fn tally(decisions: &DecisionSequences, buckets: usize, is_error: impl Fn(f64) -> bool) -> Vec<Tally> {
    let mut out = vec![Tally::default(); buckets];
    for values in decisions.values() {
        for (slot, value) in out.iter_mut().zip(values) {
            slot.population += 1;
            if is_error(*value) {
                slot.errors += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn one(id: &str, values: Vec<f64>) -> DecisionSequences {
        let mut map = BTreeMap::new();
        map.insert(id.to_string(), values);
        map
    }

    #[test]
    fn both_above_threshold_is_half_error() {
        for t in [-1.0, 0.0, 0.3, 0.99] {
            let rates = evaluate(&one("g", vec![t + 0.01]), &one("a", vec![t + 0.5]), t);
            assert_eq!(rates.len(), 1);
            assert_eq!(rates[0].frr, Some(0.0));
            assert_eq!(rates[0].far, Some(1.0));
            assert_eq!(rates[0].hter, Some(0.5));
        }
    }

    #[test]
    fn value_on_threshold_counts_as_genuine() {
        let rates = evaluate(&one("g", vec![0.5]), &one("a", vec![0.5]), 0.5);
        assert_eq!(rates[0].frr, Some(0.0));
        assert_eq!(rates[0].far, Some(1.0));
    }

    #[test]
    fn ragged_buckets_use_surviving_population() {
        let mut genuine = one("g-long", vec![0.9, 0.9, 0.9, 0.1, 0.9]);
        genuine.insert("g-short".to_string(), vec![0.1, 0.9, 0.9]);
        let attack = one("a-short", vec![0.9, 0.1, 0.1]);

        let rates = evaluate(&genuine, &attack, 0.5);
        assert_eq!(rates.len(), 5);
        assert_eq!(rates[0].frr, Some(0.5));
        assert_eq!(rates[0].far, Some(1.0));
        assert_eq!(rates[1].hter, Some(0.0));
        assert_eq!((rates[3].genuine, rates[3].attack), (1, 0));
        assert_eq!(rates[3].frr, Some(1.0));
        assert_eq!(rates[3].far, None);
        assert_eq!(rates[3].hter, None);
        assert_eq!(rates[4].frr, Some(0.0));
        assert_eq!(rates[4].far, None);
    }

    #[test]
    fn empty_input_has_no_buckets() {
        assert!(evaluate(&BTreeMap::new(), &BTreeMap::new(), 0.0).is_empty());
        let rates = evaluate(&one("g", vec![]), &one("a", vec![0.2]), 0.0);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].frr, None);
    }
}
