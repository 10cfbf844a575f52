use tempora_core::config::{AnalysisConfig, AveragePolicy, ThresholdCriterion};
use tempora_core::ErrorKind;
use tempora_eval::{run_analysis, AggregationMode, AnalysisSettings, WindowConfig};
use tempora_scores::{Bounds, Group, SampleClass, SampleRecord, ScoreSet};

fn settings(config: &AnalysisConfig) -> AnalysisSettings {
    AnalysisSettings::new(WindowConfig::new(20, 10).unwrap(), config)
}

fn record(id: &str, group: Group, class: SampleClass, scores: Vec<f64>) -> SampleRecord {
    SampleRecord::new(id, group, class, scores)
}

fn separated_set() -> ScoreSet {
    ScoreSet::from_records(
        vec![
            record("dev-r1", Group::Devel, SampleClass::Real, vec![0.9; 4]),
            record("dev-r2", Group::Devel, SampleClass::Real, vec![0.9; 6]),
            record("dev-a1", Group::Devel, SampleClass::Attack, vec![0.1; 3]),
            record("dev-a2", Group::Devel, SampleClass::Attack, vec![0.1; 7]),
            record("test-r", Group::Test, SampleClass::Real, vec![0.9; 5]),
            record("test-a", Group::Test, SampleClass::Attack, vec![0.1; 5]),
        ],
        &Bounds::default(),
    )
    .unwrap()
}

#[test]
fn separated_classes_have_zero_error_everywhere() {
    let output = run_analysis(&separated_set(), settings(&AnalysisConfig::default())).unwrap();

    assert!((output.threshold.value - 0.5).abs() < 1e-12);
    assert_eq!(output.threshold.criterion, ThresholdCriterion::Eer);
    for mode in [&output.instantaneous, &output.averaged] {
        assert_eq!(mode.rates.len(), 5);
        for rates in &mode.rates {
            assert_eq!(rates.hter, Some(0.0));
        }
        assert!(mode.misclassified.is_empty());
    }
    assert_eq!(output.instantaneous.mode, AggregationMode::Instantaneous);
    assert_eq!(output.averaged.mode, AggregationMode::Averaged);
    let elapsed: Vec<u64> = output.averaged.rates.iter().map(|r| r.elapsed).collect();
    assert_eq!(elapsed, vec![20, 30, 40, 50, 60]);
    assert_eq!(output.populations.test_real, 1);
    assert_eq!(output.determinism_hash.len(), 64);
}

#[test]
fn repeated_runs_hash_identically() {
    let set = separated_set();
    let config = AnalysisConfig::default();
    let first = run_analysis(&set, settings(&config)).unwrap();
    let second = run_analysis(&set, settings(&config)).unwrap();
    assert_eq!(first.determinism_hash, second.determinism_hash);
}

#[test]
fn ragged_test_population_shrinks_with_time() {
    let set = ScoreSet::from_records(
        vec![
            record("dev-r", Group::Devel, SampleClass::Real, vec![0.8]),
            record("dev-a", Group::Devel, SampleClass::Attack, vec![0.2]),
            record("long-r", Group::Test, SampleClass::Real, vec![0.9, 0.9, 0.9, 0.3, 0.9]),
            record("short-a", Group::Test, SampleClass::Attack, vec![0.1, 0.7, 0.1]),
        ],
        &Bounds::default(),
    )
    .unwrap();
    let output = run_analysis(&set, settings(&AnalysisConfig::default())).unwrap();
    let rates = &output.instantaneous.rates;
    assert_eq!(rates.len(), 5);
    assert_eq!(rates[1].far, Some(1.0));
    assert_eq!(rates[3].attack, 0);
    assert_eq!(rates[3].far, None);
    assert_eq!(rates[3].frr, Some(1.0));
    assert_eq!(rates[3].hter, None);
    assert_eq!(rates[4].frr, Some(0.0));

    // the short attack sample is judged on its last window, where it is rejected
    let mis = &output.instantaneous.misclassified;
    assert_eq!(mis.horizon, 220);
    assert!(mis.false_accepts.is_empty());
    assert!(mis.false_rejects.is_empty());
}

#[test]
fn vote_averaging_thresholds_the_vote_mean_at_zero() {
    let set = ScoreSet::from_records(
        vec![
            record("dev-r", Group::Devel, SampleClass::Real, vec![0.9]),
            record("dev-a", Group::Devel, SampleClass::Attack, vec![0.1]),
            record("r", Group::Test, SampleClass::Real, vec![0.2, 0.9, 0.9]),
            record("a", Group::Test, SampleClass::Attack, vec![0.1, 0.1, 0.1]),
        ],
        &Bounds::default(),
    )
    .unwrap();
    let config = AnalysisConfig {
        averaging: AveragePolicy::Votes,
        horizon: 1,
        ..AnalysisConfig::default()
    };
    let output = run_analysis(&set, settings(&config)).unwrap();
    assert_eq!(output.averaged.decision_threshold, 0.0);
    let hter: Vec<Option<f64>> = output.averaged.rates.iter().map(|r| r.hter).collect();
    // votes for "r": -1, then mean 0 (accepted), then 1/3
    assert_eq!(hter, vec![Some(0.5), Some(0.0), Some(0.0)]);
    assert!(output.averaged.misclassified.is_empty());
    assert!(output.instantaneous.misclassified.is_empty());
}

#[test]
fn min_hter_criterion_is_honored() {
    let config = AnalysisConfig {
        criterion: ThresholdCriterion::MinHter,
        ..AnalysisConfig::default()
    };
    let output = run_analysis(&separated_set(), settings(&config)).unwrap();
    assert_eq!(output.threshold.criterion, ThresholdCriterion::MinHter);
    assert_eq!(output.threshold.dev_hter, 0.0);
}

#[test]
fn missing_classes_abort_before_any_output() {
    let no_dev_attack = ScoreSet::from_records(
        vec![
            record("dev-r", Group::Devel, SampleClass::Real, vec![0.9]),
            record("r", Group::Test, SampleClass::Real, vec![0.9]),
            record("a", Group::Test, SampleClass::Attack, vec![0.1]),
        ],
        &Bounds::default(),
    )
    .unwrap();
    let err = run_analysis(&no_dev_attack, settings(&AnalysisConfig::default())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);

    let no_test_real = ScoreSet::from_records(
        vec![
            record("dev-r", Group::Devel, SampleClass::Real, vec![0.9]),
            record("dev-a", Group::Devel, SampleClass::Attack, vec![0.1]),
            record("a", Group::Test, SampleClass::Attack, vec![0.1]),
        ],
        &Bounds::default(),
    )
    .unwrap();
    let err = run_analysis(&no_test_real, settings(&AnalysisConfig::default())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
    assert!(err.message().contains("real"));
}
