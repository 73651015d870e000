use thiserror::Error;

#[derive(Error, Debug)]
pub enum StereoError {
    #[error("{name} is {actual_rows}x{actual_cols}, expected {rows}x{cols}")]
    DimensionMismatch {
        name: &'static str,
        rows: usize,
        cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    #[error("NCC window size must be an odd positive integer, got {0}")]
    InvalidWindowSize(usize),

    #[error("graph-cut penalty {name} must be non-negative, got {value}")]
    NegativePenalty { name: &'static str, value: i32 },

    #[error("iteration count must be positive")]
    InvalidIterationCount,
}

pub type Result<T> = std::result::Result<T, StereoError>;
