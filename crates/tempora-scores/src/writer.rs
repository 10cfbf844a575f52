use crate::bounds::Bounds;
use crate::record::{Group, SampleRecord};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempora_core::{AppError, AppResult};

pub struct ScoreWriter {
    out: BufWriter<File>,
    bounds: Bounds,
    seen: BTreeSet<(Group, String)>,
}

impl ScoreWriter {
    pub fn create(path: &Path, bounds: Bounds) -> AppResult<Self> {
        let file = File::create(path)
            .map_err(|e| AppError::internal(format!("failed to create scores file: {e}")))?;
        Ok(Self {
            out: BufWriter::new(file),
            bounds,
            seen: BTreeSet::new(),
        })
    }

    pub fn write_record(&mut self, record: &SampleRecord) -> AppResult<()> {
        if self.seen.len() >= self.bounds.max_samples {
            return Err(AppError::validation("max_samples exceeded"));
        }
        record.validate(&self.bounds)?;
        if !self.seen.insert((record.group, record.id.clone())) {
            return Err(AppError::validation(format!(
                "duplicate sample {} in group {}",
                record.id, record.group
            )));
        }

        let line = serde_json::to_string(record)
            .map_err(|e| AppError::internal(format!("score record encode error: {e}")))?;
        if line.len() + 1 > self.bounds.max_line_bytes {
            return Err(AppError::validation(format!(
                "sample {} exceeds max_line_bytes",
                record.id
            )));
        }
        self.out
            .write_all(line.as_bytes())
            .and_then(|_| self.out.write_all(b"\n"))
            .map_err(|e| AppError::internal(format!("scores write error: {e}")))
    }

    pub fn records_written(&self) -> usize {
        self.seen.len()
    }

    pub fn finish(self) -> AppResult<()> {
        let file = self
            .out
            .into_inner()
            .map_err(|e| AppError::internal(format!("scores flush error: {e}")))?;
        file.sync_all()
            .map_err(|e| AppError::internal(format!("scores fsync error: {e}")))
    }
}
