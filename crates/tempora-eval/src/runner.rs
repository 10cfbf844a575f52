use crate::aggregate::{aggregate, vote_average, AggregationMode, DecisionSequences};
use crate::misclassified::misclassified;
use crate::model::{AnalysisOutput, ModeAnalysis, Populations, TimedRates};
use crate::rates::evaluate;
use crate::threshold::select_threshold;
use crate::window::WindowConfig;
use tempora_core::config::{AnalysisConfig, AveragePolicy, DevReduction, ThresholdCriterion};
use tempora_core::json::determinism_hash;
use tempora_core::{AppError, AppResult};
use tempora_scores::{Group, SampleClass, ScoreSequences, ScoreSource};

/// Everything one analysis run needs, passed by value; the engine keeps no other state.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisSettings {
    pub window: WindowConfig,
    pub criterion: ThresholdCriterion,
    pub dev_reduction: DevReduction,
    pub averaging: AveragePolicy,
    pub horizon: usize,
}

impl AnalysisSettings {
    pub fn new(window: WindowConfig, config: &AnalysisConfig) -> Self {
        Self {
            window,
            criterion: config.criterion,
            dev_reduction: config.dev_reduction,
            averaging: config.averaging,
            horizon: config.horizon,
        }
    }
}

pub fn run_analysis<S: ScoreSource + ?Sized>(
    source: &S,
    settings: AnalysisSettings,
) -> AppResult<AnalysisOutput> {
    let dev_real = source.sequences(Group::Devel, SampleClass::Real)?;
    let dev_attack = source.sequences(Group::Devel, SampleClass::Attack)?;
    let threshold = select_threshold(
        &dev_real,
        &dev_attack,
        settings.dev_reduction,
        settings.criterion,
    )?;
    tracing::info!(
        threshold = threshold.value,
        criterion = %settings.criterion,
        dev_hter = threshold.dev_hter,
        "threshold fixed on development set"
    );

    let test_real = source.sequences(Group::Test, SampleClass::Real)?;
    let test_attack = source.sequences(Group::Test, SampleClass::Attack)?;
    require_samples(&test_real, "test", "real")?;
    require_samples(&test_attack, "test", "attack")?;

    let instantaneous = analyze_mode(
        AggregationMode::Instantaneous,
        aggregate(&test_real, AggregationMode::Instantaneous),
        aggregate(&test_attack, AggregationMode::Instantaneous),
        threshold.value,
        &settings,
    );
    let averaged = match settings.averaging {
        AveragePolicy::Scores => analyze_mode(
            AggregationMode::Averaged,
            aggregate(&test_real, AggregationMode::Averaged),
            aggregate(&test_attack, AggregationMode::Averaged),
            threshold.value,
            &settings,
        ),
        AveragePolicy::Votes => analyze_mode(
            AggregationMode::Averaged,
            vote_average(&test_real, threshold.value),
            vote_average(&test_attack, threshold.value),
            0.0,
            &settings,
        ),
    };

    let mut output = AnalysisOutput {
        window: settings.window,
        averaging: settings.averaging,
        threshold,
        populations: Populations {
            devel_real: dev_real.len(),
            devel_attack: dev_attack.len(),
            test_real: test_real.len(),
            test_attack: test_attack.len(),
        },
        instantaneous,
        averaged,
        determinism_hash: String::new(),
    };
    output.determinism_hash = determinism_hash(&output, "determinism_hash")?;
    Ok(output)
}

fn analyze_mode(
    mode: AggregationMode,
    genuine: DecisionSequences,
    attack: DecisionSequences,
    decision_threshold: f64,
    settings: &AnalysisSettings,
) -> ModeAnalysis {
    let rates: Vec<TimedRates> = evaluate(&genuine, &attack, decision_threshold)
        .into_iter()
        .map(|r| TimedRates {
            bucket: r.bucket,
            elapsed: settings.window.elapsed(r.bucket),
            far: r.far,
            frr: r.frr,
            hter: r.hter,
            genuine: r.genuine,
            attack: r.attack,
        })
        .collect();
    let misclassified = misclassified(&genuine, &attack, decision_threshold, settings.horizon);
    tracing::debug!(
        ?mode,
        buckets = rates.len(),
        misclassified = misclassified.len(),
        "mode evaluated"
    );
    ModeAnalysis {
        mode,
        decision_threshold,
        rates,
        misclassified,
    }
}

fn require_samples(sequences: &ScoreSequences, group: &str, class: &str) -> AppResult<()> {
    if sequences.is_empty() {
        return Err(AppError::insufficient_data(format!(
            "no {group} samples for the {class} class"
        )));
    }
    Ok(())
}
