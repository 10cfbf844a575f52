use serde::Serialize;
use tempora_core::{AppError, AppResult};

/// Window geometry shared by every score sequence of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowConfig {
    window_size: u32,
    overlap: u32,
}

impl WindowConfig {
    /// Both values must be positive and the overlap must stay below the window size.
    pub fn new(window_size: i64, overlap: i64) -> AppResult<Self> {
        if window_size <= 0 {
            return Err(AppError::invalid_window(format!(
                "window-size has to be greater than zero (got {window_size})"
            )));
        }
        if overlap <= 0 {
            return Err(AppError::invalid_window(format!(
                "overlap has to be greater than zero (got {overlap})"
            )));
        }
        if overlap >= window_size {
            return Err(AppError::invalid_window(format!(
                "overlap ({overlap}) has to be smaller than window-size ({window_size})"
            )));
        }
        let window_size = u32::try_from(window_size)
            .map_err(|_| AppError::invalid_window("window-size does not fit in 32 bits"))?;
        Ok(Self {
            window_size,
            overlap: overlap as u32,
        })
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    pub fn overlap(&self) -> u32 {
        self.overlap
    }

    pub fn step(&self) -> u32 {
        self.window_size - self.overlap
    }

    /// Observation time covered once window `bucket` is complete.
    pub fn elapsed(&self, bucket: usize) -> u64 {
        u64::from(self.window_size)
            .saturating_add((bucket as u64).saturating_mul(u64::from(self.step())))
    }

    /// Last bucket fully observed by `elapsed`, if any.
    pub fn bucket_at(&self, elapsed: u64) -> Option<usize> {
        let first = u64::from(self.window_size);
        if elapsed < first {
            return None;
        }
        usize::try_from((elapsed - first) / u64::from(self.step())).ok()
    }
}
