use std::path::Path;
use tempora_core::AppResult;
use tempora_eval::{generate_score_set, SyntheticSpec, WindowConfig};

pub fn generate_command(out: &Path, spec: SyntheticSpec, overwrite: bool) -> AppResult<()> {
    WindowConfig::new(i64::from(spec.window_size), i64::from(spec.overlap))?;
    let manifest = generate_score_set(&spec, out, overwrite)?;
    tracing::info!(
        score_set_id = %manifest.score_set_id,
        samples = manifest.counts.total(),
        seed = spec.seed,
        "synthetic score set written"
    );
    println!("{}", manifest.score_set_id);
    Ok(())
}
