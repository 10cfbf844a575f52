#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub max_scores_file_bytes: u64,
    pub max_line_bytes: usize,
    pub max_samples: usize,
    pub max_windows_per_sample: usize,
}

impl Default for Bounds {
    fn default() -> Self {
        let max_windows_per_sample = 100_000;
        Self {
            max_scores_file_bytes: 2 * 1024 * 1024 * 1024,
            // ~32 bytes per serialized f64 plus room for the id and labels
            max_line_bytes: max_windows_per_sample * 32 + 4096,
            max_samples: 1_000_000,
            max_windows_per_sample,
        }
    }
}
