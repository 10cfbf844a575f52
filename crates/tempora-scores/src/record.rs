use crate::bounds::Bounds;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tempora_core::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    #[serde(alias = "dev", alias = "development")]
    Devel,
    Test,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Devel => write!(f, "devel"),
            Group::Test => write!(f, "test"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleClass {
    #[serde(alias = "genuine")]
    Real,
    #[serde(alias = "spoof")]
    Attack,
}

impl fmt::Display for SampleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleClass::Real => write!(f, "real"),
            SampleClass::Attack => write!(f, "attack"),
        }
    }
}

/// One sample and its per-window classifier scores, in window order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleRecord {
    pub id: String,
    pub group: Group,
    pub class: SampleClass,
    pub scores: Vec<f64>,
}

impl SampleRecord {
    pub fn new(
        id: impl Into<String>,
        group: Group,
        class: SampleClass,
        scores: Vec<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            group,
            class,
            scores,
        }
    }

    pub fn validate(&self, bounds: &Bounds) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::validation("sample id is empty"));
        }
        if self.id.contains('\n') {
            return Err(AppError::validation(format!(
                "sample id {:?} contains a newline",
                self.id
            )));
        }
        if self.scores.len() > bounds.max_windows_per_sample {
            return Err(AppError::validation(format!(
                "sample {} exceeds max_windows_per_sample",
                self.id
            )));
        }
        if let Some(idx) = self.scores.iter().position(|s| !s.is_finite()) {
            return Err(AppError::validation(format!(
                "sample {} has a non-finite score at window {idx}",
                self.id
            )));
        }
        Ok(())
    }

    pub fn sort_key_cmp(&self, other: &Self) -> Ordering {
        (self.group, self.class, &self.id).cmp(&(other.group, other.class, &other.id))
    }
}
