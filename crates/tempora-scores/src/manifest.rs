use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tempora_core::{AppError, AppResult};

pub const SCORE_SET_VERSION: u16 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreManifest {
    pub score_set_version: u16,
    pub score_set_id: String,
    #[serde(default)]
    pub window_size: Option<u32>,
    #[serde(default)]
    pub overlap: Option<u32>,
    pub source: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub support: Option<String>,
    pub counts: SampleCounts,
}

/// Number of samples per group and class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCounts {
    pub devel_real: u64,
    pub devel_attack: u64,
    pub test_real: u64,
    pub test_attack: u64,
}

impl SampleCounts {
    pub fn total(&self) -> u64 {
        self.devel_real + self.devel_attack + self.test_real + self.test_attack
    }
}

impl ScoreManifest {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::validation(format!("failed to read manifest: {e}")))?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::validation(format!("manifest parse error: {e}")))
    }

    pub fn write(&self, path: &Path) -> AppResult<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| AppError::internal(format!("manifest encode error: {e}")))?;
        fs::write(path, content)
            .map_err(|e| AppError::internal(format!("manifest write error: {e}")))
    }

    pub fn validate(&self, expected_id: &str) -> AppResult<()> {
        if self.score_set_version != SCORE_SET_VERSION {
            return Err(AppError::validation("unsupported score_set_version"));
        }
        if !is_lower_hex_64(&self.score_set_id) {
            return Err(AppError::validation("invalid manifest score_set_id"));
        }
        if self.score_set_id != expected_id {
            return Err(AppError::validation("manifest score_set_id mismatch"));
        }
        if self.window_size.is_some() != self.overlap.is_some() {
            return Err(AppError::validation(
                "manifest must declare both window_size and overlap, or neither",
            ));
        }
        if self.source.trim().is_empty() {
            return Err(AppError::validation("manifest source is empty"));
        }
        Ok(())
    }

    pub fn window(&self) -> Option<(u32, u32)> {
        self.window_size.zip(self.overlap)
    }
}

fn is_lower_hex_64(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}
