use crate::aggregate::DecisionSequences;
use crate::threshold::accepts;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MisclassifiedSet {
    pub horizon: usize,
    /// Real samples rejected as attacks.
    pub false_rejects: BTreeSet<String>,
    /// Attack samples accepted as real.
    pub false_accepts: BTreeSet<String>,
}

impl MisclassifiedSet {
    pub fn ids(&self) -> BTreeSet<&str> {
        self.false_rejects
            .iter()
            .chain(&self.false_accepts)
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.false_rejects.len() + self.false_accepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Verdict per sample at bucket `horizon`, or at its own last bucket when it ends earlier.
/// Samples without any window have no verdict and are left out.
pub fn misclassified(
    genuine: &DecisionSequences,
    attack: &DecisionSequences,
    threshold: f64,
    horizon: usize,
) -> MisclassifiedSet {
    MisclassifiedSet {
        horizon,
        false_rejects: wrong_side(genuine, horizon, |v| !accepts(v, threshold)),
        false_accepts: wrong_side(attack, horizon, |v| accepts(v, threshold)),
    }
}

fn wrong_side(
    decisions: &DecisionSequences,
    horizon: usize,
    is_error: impl Fn(f64) -> bool,
) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for (id, values) in decisions {
        let Some(last) = values.len().checked_sub(1) else {
            tracing::debug!(sample = %id, "sample has no windows; no verdict");
            continue;
        };
        if is_error(values[horizon.min(last)]) {
            out.insert(id.clone());
        }
    }
    out
}
