pub mod aggregate;
pub mod generator;
pub mod misclassified;
pub mod model;
pub mod rates;
pub mod runner;
pub mod threshold;
pub mod window;

pub use aggregate::{aggregate, running_mean, vote_average, AggregationMode, DecisionSequences};
pub use generator::{generate_score_set, SyntheticSpec};
pub use misclassified::{misclassified, MisclassifiedSet};
pub use model::{AnalysisOutput, ModeAnalysis, Populations, TimedRates};
pub use rates::{evaluate, ErrorRates};
pub use runner::{run_analysis, AnalysisSettings};
pub use threshold::{
    accepts, reduce_dev_scores, select_threshold, select_threshold_from_scores,
    ThresholdSelection,
};
pub use window::WindowConfig;
