use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::Path;
use tempora_core::{AppError, AppResult};
use tempora_scores::{
    finalize_score_dir, Bounds, Group, ManifestDraft, SampleClass, SampleRecord, ScoreManifest,
    ScoreWriter, SCORES_FILE,
};

/// Shape of a synthetic score set. Scores live in `[-1, 1]` like a tanh classifier output.
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub seed: u64,
    pub samples_per_class: u32,
    pub min_windows: u32,
    pub max_windows: u32,
    pub window_size: u32,
    pub overlap: u32,
    pub separation: f64,
    pub noise: f64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            seed: 1,
            samples_per_class: 10,
            min_windows: 5,
            max_windows: 40,
            window_size: 20,
            overlap: 10,
            separation: 0.5,
            noise: 0.6,
        }
    }
}

impl SyntheticSpec {
    pub fn validate(&self) -> AppResult<()> {
        if self.samples_per_class == 0 {
            return Err(AppError::usage("samples per class must be >= 1"));
        }
        if self.min_windows == 0 || self.min_windows > self.max_windows {
            return Err(AppError::usage(
                "windows range must satisfy 1 <= min_windows <= max_windows",
            ));
        }
        if !(0.0..=1.0).contains(&self.separation) || !(0.0..=2.0).contains(&self.noise) {
            return Err(AppError::usage(
                "separation must be within [0, 1] and noise within [0, 2]",
            ));
        }
        Ok(())
    }
}

/// Writes a finalized score dir at `out_dir` with both groups and both classes.
pub fn generate_score_set(
    spec: &SyntheticSpec,
    out_dir: &Path,
    overwrite: bool,
) -> AppResult<ScoreManifest> {
    spec.validate()?;
    if out_dir.exists() {
        if !overwrite {
            return Err(AppError::usage(format!(
                "{} already exists; use --overwrite",
                out_dir.display()
            )));
        }
        fs::remove_dir_all(out_dir).map_err(|e| {
            AppError::internal(format!("failed to remove existing score dir: {e}"))
        })?;
    }

    let name = out_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::usage("score dir path has no final component"))?;
    let partial_dir = out_dir.with_file_name(format!("{name}.partial"));
    if partial_dir.exists() {
        fs::remove_dir_all(&partial_dir).map_err(|e| {
            AppError::internal(format!("failed to remove existing partial dir: {e}"))
        })?;
    }
    fs::create_dir_all(&partial_dir)
        .map_err(|e| AppError::internal(format!("failed to create score dir: {e}")))?;

    let bounds = Bounds::default();
    let mut writer = ScoreWriter::create(&partial_dir.join(SCORES_FILE), bounds)?;
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);
    for group in [Group::Devel, Group::Test] {
        for class in [SampleClass::Real, SampleClass::Attack] {
            for idx in 0..spec.samples_per_class {
                let id = format!("{group}/{class}/client{:03}", idx + 1);
                let scores = synthesize(spec, class, &mut rng);
                writer.write_record(&SampleRecord::new(id, group, class, scores))?;
            }
        }
    }
    writer.finish()?;

    let draft = ManifestDraft {
        window_size: Some(spec.window_size),
        overlap: Some(spec.overlap),
        source: format!("synthetic(seed={})", spec.seed),
        protocol: None,
        support: None,
    };
    finalize_score_dir(&partial_dir, out_dir, &draft, bounds)
}

fn synthesize(spec: &SyntheticSpec, class: SampleClass, rng: &mut ChaCha8Rng) -> Vec<f64> {
    let windows = rng.gen_range(spec.min_windows..=spec.max_windows);
    let center = match class {
        SampleClass::Real => spec.separation,
        SampleClass::Attack => -spec.separation,
    };
    // per-sample offset so some samples sit on the wrong side for a while
    let bias = rng.gen_range(-0.5f64..=0.5) * spec.noise;
    (0..windows)
        .map(|_| {
            let jitter = rng.gen_range(-1.0f64..=1.0) * spec.noise;
            (center + bias + jitter).clamp(-1.0, 1.0)
        })
        .collect()
}
