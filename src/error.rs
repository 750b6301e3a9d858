use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Truncated cascade: {needed} byte(s) required at offset {offset}")]
    TruncatedCascade { offset: usize, needed: usize },

    #[error("Invalid cascade: {0}")]
    InvalidCascade(String),

    #[error("Pixel buffer too small: geometry requires {expected} byte(s), got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Invalid stride: {stride} is smaller than column count {cols}")]
    InvalidStride { stride: usize, cols: usize },

    #[error(
        "Detection window (row {row}, col {col}, scale {scale}) out of bounds for {rows}x{cols} image"
    )]
    WindowOutOfBounds {
        row: usize,
        col: usize,
        scale: usize,
        rows: usize,
        cols: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
