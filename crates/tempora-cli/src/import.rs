use std::fs;
use std::path::Path;
use tempora_core::{AppError, AppResult};
use tempora_eval::WindowConfig;
use tempora_scores::{
    finalize_score_dir, Bounds, ManifestDraft, ScoreReader, ScoreWriter, SCORES_FILE,
};

pub fn import_command(
    from: &Path,
    out: &Path,
    window_size: Option<i64>,
    overlap: Option<i64>,
    protocol: Option<String>,
    support: Option<String>,
    overwrite: bool,
) -> AppResult<()> {
    if !from.is_file() {
        return Err(AppError::usage(format!(
            "input {} is not a file",
            from.display()
        )));
    }
    let window = match (window_size, overlap) {
        (Some(ws), Some(ol)) => Some(WindowConfig::new(ws, ol)?),
        (None, None) => None,
        _ => {
            return Err(AppError::usage(
                "--window-size and --overlap must be given together",
            ))
        }
    };

    let bounds = Bounds::default();
    let records = ScoreReader::open(from, bounds)?.read_all_sorted()?;

    if out.exists() {
        if !overwrite {
            return Err(AppError::usage(format!(
                "{} already exists; use --overwrite to replace",
                out.display()
            )));
        }
        fs::remove_dir_all(out)
            .map_err(|e| AppError::internal(format!("failed to remove existing score dir: {e}")))?;
    }
    let name = out
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::usage("--out has no final path component"))?;
    let partial_dir = out.with_file_name(format!("{name}.partial"));
    if partial_dir.exists() {
        fs::remove_dir_all(&partial_dir)
            .map_err(|e| AppError::internal(format!("failed to remove stale partial dir: {e}")))?;
    }
    fs::create_dir_all(&partial_dir)
        .map_err(|e| AppError::internal(format!("failed to create partial dir: {e}")))?;

    let mut writer = ScoreWriter::create(&partial_dir.join(SCORES_FILE), bounds)?;
    for record in &records {
        writer.write_record(record)?;
    }
    let written = writer.records_written();
    writer.finish()?;

    let draft = ManifestDraft {
        window_size: window.map(|w| w.window_size()),
        overlap: window.map(|w| w.overlap()),
        source: from.display().to_string(),
        protocol,
        support,
    };
    let manifest = finalize_score_dir(&partial_dir, out, &draft, bounds)?;
    tracing::info!(
        score_set_id = %manifest.score_set_id,
        samples = written,
        "score directory imported"
    );
    println!("{}", manifest.score_set_id);
    Ok(())
}
