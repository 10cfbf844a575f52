use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_HORIZON_WINDOWS: usize = 220;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub plot: PlotConfig,
}

impl Config {
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config = if let Some(path) = path {
            let data = std::fs::read_to_string(path).map_err(|e| {
                AppError::usage(format!("failed to read config {}: {e}", path.display()))
            })?;
            serde_yaml::from_str::<Config>(&data).map_err(|e| {
                AppError::usage(format!("failed to parse config {}: {e}", path.display()))
            })?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.plot.validate()
    }
}

/// Rule used to pick the decision threshold on the development set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdCriterion {
    #[default]
    Eer,
    MinHter,
}

impl fmt::Display for ThresholdCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdCriterion::Eer => write!(f, "EER"),
            ThresholdCriterion::MinHter => write!(f, "min. HTER"),
        }
    }
}

/// How a development sample's score sequence becomes threshold-search data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DevReduction {
    #[default]
    Mean,
    Last,
    Windows,
}

/// What the averaged analysis averages: raw scores or thresholded window votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AveragePolicy {
    #[default]
    Scores,
    Votes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub criterion: ThresholdCriterion,
    pub dev_reduction: DevReduction,
    pub averaging: AveragePolicy,
    pub horizon: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            criterion: ThresholdCriterion::default(),
            dev_reduction: DevReduction::default(),
            averaging: AveragePolicy::default(),
            horizon: DEFAULT_HORIZON_WINDOWS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

impl PlotConfig {
    fn validate(&self) -> AppResult<()> {
        if self.width < 200 || self.height < 150 {
            return Err(AppError::usage("plot width must be >= 200 and height >= 150"));
        }
        Ok(())
    }
}
