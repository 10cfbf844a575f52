use crate::bounds::Bounds;
use crate::checksums::write_checksums;
use crate::manifest::{SampleCounts, ScoreManifest, SCORE_SET_VERSION};
use crate::reader::ScoreReader;
use crate::record::{Group, SampleClass, SampleRecord};
use crate::score_id::compute_score_set_id;
use crate::{MANIFEST_FILE, SCORES_FILE};
use std::fs;
use std::path::Path;
use tempora_core::{AppError, AppResult};

/// Manifest fields supplied by whoever produced the scores.
#[derive(Debug, Clone, Default)]
pub struct ManifestDraft {
    pub window_size: Option<u32>,
    pub overlap: Option<u32>,
    pub source: String,
    pub protocol: Option<String>,
    pub support: Option<String>,
}

/// Seals a `<name>.partial` directory holding `scores.jsonl`: writes the manifest and
/// checksums, then moves it to `final_dir`.
pub fn finalize_score_dir(
    partial_dir: &Path,
    final_dir: &Path,
    draft: &ManifestDraft,
    bounds: Bounds,
) -> AppResult<ScoreManifest> {
    if !partial_dir.is_dir() {
        return Err(AppError::validation("partial score dir does not exist"));
    }
    if final_dir.exists() {
        return Err(AppError::validation("final score dir already exists"));
    }

    let scores_path = partial_dir.join(SCORES_FILE);
    let records = ScoreReader::open(&scores_path, bounds)?.read_all_sorted()?;
    let score_set_id = compute_score_set_id(&scores_path)?;

    let manifest = ScoreManifest {
        score_set_version: SCORE_SET_VERSION,
        score_set_id: score_set_id.clone(),
        window_size: draft.window_size,
        overlap: draft.overlap,
        source: draft.source.clone(),
        protocol: draft.protocol.clone(),
        support: draft.support.clone(),
        counts: count_samples(&records),
    };
    manifest.validate(&score_set_id)?;
    manifest.write(&partial_dir.join(MANIFEST_FILE))?;
    write_checksums(partial_dir, &[MANIFEST_FILE, SCORES_FILE])?;

    fs::rename(partial_dir, final_dir)
        .map_err(|e| AppError::internal(format!("failed to finalize score dir: {e}")))?;
    tracing::debug!(
        dir = %final_dir.display(),
        samples = manifest.counts.total(),
        "score dir finalized"
    );
    Ok(manifest)
}

pub(crate) fn count_samples(records: &[SampleRecord]) -> SampleCounts {
    let mut counts = SampleCounts::default();
    for record in records {
        let slot = match (record.group, record.class) {
            (Group::Devel, SampleClass::Real) => &mut counts.devel_real,
            (Group::Devel, SampleClass::Attack) => &mut counts.devel_attack,
            (Group::Test, SampleClass::Real) => &mut counts.test_real,
            (Group::Test, SampleClass::Attack) => &mut counts.test_attack,
        };
        *slot += 1;
    }
    counts
}
