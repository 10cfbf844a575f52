use crate::checksums::hash_file;
use std::path::Path;
use tempora_core::AppResult;

/// Content id of a score set: the sha256 of its `scores.jsonl`.
pub fn compute_score_set_id(scores_path: &Path) -> AppResult<String> {
    hash_file(scores_path)
}
