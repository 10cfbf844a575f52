use crate::aggregate::AggregationMode;
use crate::misclassified::MisclassifiedSet;
use crate::threshold::ThresholdSelection;
use crate::window::WindowConfig;
use serde::Serialize;
use tempora_core::config::AveragePolicy;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub window: WindowConfig,
    pub averaging: AveragePolicy,
    pub threshold: ThresholdSelection,
    pub populations: Populations,
    pub instantaneous: ModeAnalysis,
    pub averaged: ModeAnalysis,
    pub determinism_hash: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Populations {
    pub devel_real: usize,
    pub devel_attack: usize,
    pub test_real: usize,
    pub test_attack: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeAnalysis {
    pub mode: AggregationMode,
    /// Cut applied to this mode's decision values; 0 under vote averaging.
    pub decision_threshold: f64,
    pub rates: Vec<TimedRates>,
    pub misclassified: MisclassifiedSet,
}

impl ModeAnalysis {
    pub fn hter_series(&self) -> Vec<(u64, Option<f64>)> {
        self.rates.iter().map(|r| (r.elapsed, r.hter)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimedRates {
    pub bucket: usize,
    pub elapsed: u64,
    pub far: Option<f64>,
    pub frr: Option<f64>,
    pub hter: Option<f64>,
    pub genuine: usize,
    pub attack: usize,
}
