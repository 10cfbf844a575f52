use std::path::Path;
use tempora_core::AppResult;
use tempora_eval::WindowConfig;
use tempora_scores::{Bounds, ScoreDir};

pub fn validate_command(score_dir: &Path) -> AppResult<()> {
    let store = ScoreDir::open(score_dir, Bounds::default())?;
    let manifest = store.manifest();
    if let Some((ws, ol)) = manifest.window() {
        WindowConfig::new(i64::from(ws), i64::from(ol))?;
    }
    let counts = &manifest.counts;
    println!(
        "ok {} devel={}/{} test={}/{}",
        manifest.score_set_id,
        counts.devel_real,
        counts.devel_attack,
        counts.test_real,
        counts.test_attack
    );
    Ok(())
}
