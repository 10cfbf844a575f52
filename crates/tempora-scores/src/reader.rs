use crate::bounds::Bounds;
use crate::record::SampleRecord;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tempora_core::{AppError, AppResult};

/// Streaming reader over a `scores.jsonl` file, one sample per line.
pub struct ScoreReader {
    reader: BufReader<File>,
    bounds: Bounds,
    line_no: usize,
    line: String,
}

impl ScoreReader {
    pub fn open(path: &Path, bounds: Bounds) -> AppResult<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| AppError::validation(format!("scores file missing: {e}")))?;
        if metadata.len() > bounds.max_scores_file_bytes {
            return Err(AppError::validation(
                "scores file exceeds max_scores_file_bytes",
            ));
        }
        let file = File::open(path)
            .map_err(|e| AppError::validation(format!("failed to open scores: {e}")))?;
        Ok(Self {
            reader: BufReader::new(file),
            bounds,
            line_no: 0,
            line: String::new(),
        })
    }

    pub fn read_next(&mut self) -> AppResult<Option<SampleRecord>> {
        loop {
            self.line.clear();
            let n = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| AppError::validation(format!("scores read error: {e}")))?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if n > self.bounds.max_line_bytes {
                return Err(AppError::validation(format!(
                    "scores line {} exceeds max_line_bytes",
                    self.line_no
                )));
            }
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            let record: SampleRecord = serde_json::from_str(text).map_err(|e| {
                AppError::validation(format!("scores line {} parse error: {e}", self.line_no))
            })?;
            record.validate(&self.bounds)?;
            return Ok(Some(record));
        }
    }

    /// Reads every record, rejecting duplicate `(group, id)` pairs, sorted by group, class, id.
    pub fn read_all_sorted(mut self) -> AppResult<Vec<SampleRecord>> {
        let mut records = Vec::new();
        let mut seen = BTreeSet::new();
        while let Some(record) = self.read_next()? {
            if !seen.insert((record.group, record.id.clone())) {
                return Err(AppError::validation(format!(
                    "duplicate sample {} in group {}",
                    record.id, record.group
                )));
            }
            records.push(record);
            if records.len() > self.bounds.max_samples {
                return Err(AppError::validation("max_samples exceeded"));
            }
        }
        records.sort_by(SampleRecord::sort_key_cmp);
        Ok(records)
    }
}
