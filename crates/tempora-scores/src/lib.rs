pub mod bounds;
pub mod checksums;
pub mod finalize;
pub mod layout;
pub mod manifest;
pub mod reader;
pub mod record;
pub mod score_id;
pub mod source;
pub mod writer;

pub use bounds::Bounds;
pub use checksums::{verify_checksums, write_checksums};
pub use finalize::{finalize_score_dir, ManifestDraft};
pub use layout::{infer_run_layout, RunLayout};
pub use manifest::{SampleCounts, ScoreManifest};
pub use reader::ScoreReader;
pub use record::{Group, SampleClass, SampleRecord};
pub use score_id::compute_score_set_id;
pub use source::{ScoreDir, ScoreSequences, ScoreSet, ScoreSource};
pub use writer::ScoreWriter;

pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const SCORES_FILE: &str = "scores.jsonl";
pub const CHECKSUMS_FILE: &str = "checksums.sha256";
