use crate::bounds::Bounds;
use crate::checksums::verify_checksums;
use crate::finalize::count_samples;
use crate::manifest::{SampleCounts, ScoreManifest};
use crate::reader::ScoreReader;
use crate::record::{Group, SampleClass, SampleRecord};
use crate::score_id::compute_score_set_id;
use crate::{MANIFEST_FILE, SCORES_FILE};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tempora_core::{AppError, AppResult};

/// Per-window scores keyed by sample id. Lengths may differ between samples.
pub type ScoreSequences = BTreeMap<String, Vec<f64>>;

/// Anything that can hand out the score sequences of one group and class.
pub trait ScoreSource {
    fn sequences(&self, group: Group, class: SampleClass) -> AppResult<ScoreSequences>;
}

/// In-memory score set.
#[derive(Debug, Clone, Default)]
pub struct ScoreSet {
    records: Vec<SampleRecord>,
}

impl ScoreSet {
    pub fn from_records(mut records: Vec<SampleRecord>, bounds: &Bounds) -> AppResult<Self> {
        let mut seen = BTreeSet::new();
        for record in &records {
            record.validate(bounds)?;
            if !seen.insert((record.group, record.id.as_str())) {
                return Err(AppError::validation(format!(
                    "duplicate sample {} in group {}",
                    record.id, record.group
                )));
            }
        }
        records.sort_by(SampleRecord::sort_key_cmp);
        Ok(Self { records })
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn counts(&self) -> SampleCounts {
        count_samples(&self.records)
    }
}

impl ScoreSource for ScoreSet {
    fn sequences(&self, group: Group, class: SampleClass) -> AppResult<ScoreSequences> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.group == group && r.class == class)
            .map(|r| (r.id.clone(), r.scores.clone()))
            .collect())
    }
}

/// A finalized score directory: `manifest.yaml`, `scores.jsonl`, `checksums.sha256`.
#[derive(Debug, Clone)]
pub struct ScoreDir {
    dir: PathBuf,
    manifest: ScoreManifest,
    set: ScoreSet,
}

impl ScoreDir {
    pub fn open(dir: &Path, bounds: Bounds) -> AppResult<Self> {
        if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(".partial") {
                return Err(AppError::validation("partial score dir is not valid"));
            }
        }
        if !dir.is_dir() {
            return Err(AppError::validation(format!(
                "score dir {} is not a directory",
                dir.display()
            )));
        }

        verify_checksums(dir)?;
        let scores_path = dir.join(SCORES_FILE);
        let score_set_id = compute_score_set_id(&scores_path)?;
        let manifest = ScoreManifest::load(&dir.join(MANIFEST_FILE))?;
        manifest.validate(&score_set_id)?;

        let records = ScoreReader::open(&scores_path, bounds)?.read_all_sorted()?;
        let set = ScoreSet { records };
        if set.counts() != manifest.counts {
            return Err(AppError::validation("manifest counts do not match scores"));
        }
        tracing::debug!(
            dir = %dir.display(),
            score_set_id = %manifest.score_set_id,
            samples = manifest.counts.total(),
            "score dir loaded"
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
            set,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest(&self) -> &ScoreManifest {
        &self.manifest
    }

    pub fn set(&self) -> &ScoreSet {
        &self.set
    }
}

impl ScoreSource for ScoreDir {
    fn sequences(&self, group: Group, class: SampleClass) -> AppResult<ScoreSequences> {
        self.set.sequences(group, class)
    }
}
