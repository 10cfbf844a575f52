pub mod config;
pub mod error;
pub mod json;

pub use error::{AppError, AppResult, ErrorKind};
