//! Decision threshold selection on development scores.
//!
//! Candidate cut points are the lowest score (accept everything), the midpoint between
//! every pair of adjacent distinct scores, and a value just above the highest score
//! (reject everything). A score is accepted as genuine when `score >= threshold`.

use crate::aggregate::running_mean;
use serde::Serialize;
use tempora_core::config::{DevReduction, ThresholdCriterion};
use tempora_core::{AppError, AppResult};
use tempora_scores::ScoreSequences;

const TIE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdSelection {
    pub value: f64,
    pub criterion: ThresholdCriterion,
    pub dev_far: f64,
    pub dev_frr: f64,
    pub dev_hter: f64,
    pub genuine_count: usize,
    pub attack_count: usize,
}

/// `true` when a decision value is on the genuine side of `threshold`.
pub fn accepts(value: f64, threshold: f64) -> bool {
    value >= threshold
}

/// Collapses development sequences into threshold-search data points.
pub fn reduce_dev_scores(sequences: &ScoreSequences, reduction: DevReduction) -> Vec<f64> {
    match reduction {
        DevReduction::Windows => sequences.values().flatten().copied().collect(),
        DevReduction::Last => sequences
            .values()
            .filter_map(|scores| scores.last().copied())
            .collect(),
        DevReduction::Mean => sequences
            .values()
            .filter_map(|scores| running_mean(scores).last().copied())
            .collect(),
    }
}

pub fn select_threshold(
    dev_genuine: &ScoreSequences,
    dev_attack: &ScoreSequences,
    reduction: DevReduction,
    criterion: ThresholdCriterion,
) -> AppResult<ThresholdSelection> {
    let genuine = reduce_dev_scores(dev_genuine, reduction);
    let attack = reduce_dev_scores(dev_attack, reduction);
    select_threshold_from_scores(&genuine, &attack, criterion)
}

pub fn select_threshold_from_scores(
    genuine: &[f64],
    attack: &[f64],
    criterion: ThresholdCriterion,
) -> AppResult<ThresholdSelection> {
    if genuine.is_empty() {
        return Err(AppError::insufficient_data(
            "no development scores for the real class",
        ));
    }
    if attack.is_empty() {
        return Err(AppError::insufficient_data(
            "no development scores for the attack class",
        ));
    }

    let mut genuine = genuine.to_vec();
    let mut attack = attack.to_vec();
    genuine.sort_by(f64::total_cmp);
    attack.sort_by(f64::total_cmp);

    let points: Vec<OperatingPoint> = candidate_cuts(&genuine, &attack)
        .into_iter()
        .map(|t| OperatingPoint::at(t, &genuine, &attack))
        .collect();

    let chosen = match criterion {
        ThresholdCriterion::Eer => pick_eer(&points),
        ThresholdCriterion::MinHter => pick_min_hter(&points),
    }
    .ok_or_else(|| AppError::internal("threshold search produced no candidates"))?;

    tracing::debug!(
        threshold = chosen.threshold,
        far = chosen.far,
        frr = chosen.frr,
        candidates = points.len(),
        %criterion,
        "development threshold selected"
    );
    Ok(ThresholdSelection {
        value: chosen.threshold,
        criterion,
        dev_far: chosen.far,
        dev_frr: chosen.frr,
        dev_hter: chosen.hter(),
        genuine_count: genuine.len(),
        attack_count: attack.len(),
    })
}

#[derive(Debug, Clone, Copy)]
struct OperatingPoint {
    threshold: f64,
    far: f64,
    frr: f64,
}

impl OperatingPoint {
    /// `genuine` and `attack` must be sorted ascending.
    fn at(threshold: f64, genuine: &[f64], attack: &[f64]) -> Self {
        let rejected_genuine = genuine.partition_point(|s| !accepts(*s, threshold));
        let rejected_attack = attack.partition_point(|s| !accepts(*s, threshold));
        Self {
            threshold,
            far: (attack.len() - rejected_attack) as f64 / attack.len() as f64,
            frr: rejected_genuine as f64 / genuine.len() as f64,
        }
    }

    fn hter(&self) -> f64 {
        (self.far + self.frr) / 2.0
    }
}

fn candidate_cuts(genuine: &[f64], attack: &[f64]) -> Vec<f64> {
    let mut merged: Vec<f64> = genuine.iter().chain(attack).copied().collect();
    merged.sort_by(f64::total_cmp);
    merged.dedup();

    let mut cuts = Vec::with_capacity(merged.len() + 1);
    if let Some(lowest) = merged.first() {
        cuts.push(*lowest);
    }
    for pair in merged.windows(2) {
        cuts.push(midpoint(pair[0], pair[1]));
    }
    if let Some(highest) = merged.last() {
        cuts.push(just_above(*highest));
    }
    cuts
}

fn midpoint(low: f64, high: f64) -> f64 {
    let mid = (low + high) / 2.0;
    let mid = if mid.is_finite() { mid } else { low / 2.0 + high / 2.0 };
    // adjacent floats: the midpoint rounds onto `low`, which would accept it
    if mid <= low {
        high
    } else {
        mid
    }
}

fn just_above(value: f64) -> f64 {
    value + value.abs().max(1.0) * f64::EPSILON
}

/// Minimizes `|FAR - FRR|`; among ties, the candidate nearest the center of the tied range,
/// the lower one when two are equally near.
fn pick_eer(points: &[OperatingPoint]) -> Option<OperatingPoint> {
    let gap = |p: &OperatingPoint| (p.far - p.frr).abs();
    let best = points.iter().map(gap).min_by(f64::total_cmp)?;
    let tied: Vec<&OperatingPoint> = points
        .iter()
        .filter(|p| gap(p) <= best + TIE_EPSILON)
        .collect();
    let center = (tied.first()?.threshold + tied.last()?.threshold) / 2.0;
    let mut chosen = *tied[0];
    for p in &tied[1..] {
        if (p.threshold - center).abs() < (chosen.threshold - center).abs() - TIE_EPSILON {
            chosen = **p;
        }
    }
    Some(chosen)
}

/// Minimizes HTER; among ties, the smallest `|t|`, then the lower `t`.
fn pick_min_hter(points: &[OperatingPoint]) -> Option<OperatingPoint> {
    let best = points.iter().map(OperatingPoint::hter).min_by(f64::total_cmp)?;
    let mut chosen: Option<OperatingPoint> = None;
    for p in points.iter().filter(|p| p.hter() <= best + TIE_EPSILON) {
        chosen = match chosen {
            Some(c) if c.threshold.abs() <= p.threshold.abs() => Some(c),
            _ => Some(*p),
        };
    }
    chosen
}
