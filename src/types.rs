use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Read-only view over row-major 8-bit grayscale pixel data.
///
/// `dim` is the element stride between row starts: it equals `cols` for a
/// contiguous buffer and may be larger when the view covers a sub-region of
/// a wider image. The constructor validates the geometry so that every view
/// handed to the scanner is backed by enough pixels.
#[derive(Debug, Clone, Copy)]
pub struct ImageParams<'a> {
    pixels: &'a [u8],
    rows: usize,
    cols: usize,
    dim: usize,
}

impl<'a> ImageParams<'a> {
    /// Create a validated pixel view.
    ///
    /// Fails with [`Error::InvalidStride`] if `dim < cols`, or
    /// [`Error::SizeMismatch`] if the buffer cannot hold `rows` rows of
    /// `cols` pixels spaced `dim` apart (the last row only needs `cols`
    /// pixels, so a trailing stride pad may be absent).
    pub fn new(pixels: &'a [u8], rows: usize, cols: usize, dim: usize) -> Result<Self> {
        if dim < cols {
            return Err(Error::InvalidStride { stride: dim, cols });
        }

        let expected = min_required_len(rows, cols, dim).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: pixels.len(),
        })?;

        if pixels.len() < expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            pixels,
            rows,
            cols,
            dim,
        })
    }

    /// View over a contiguous buffer, where the stride equals the column
    /// count.
    pub fn from_contiguous(pixels: &'a [u8], rows: usize, cols: usize) -> Result<Self> {
        Self::new(pixels, rows, cols, cols)
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

fn min_required_len(rows: usize, cols: usize, dim: usize) -> Option<usize> {
    if rows == 0 || cols == 0 {
        return Some(0);
    }
    (rows - 1).checked_mul(dim)?.checked_add(cols)
}

/// Scan configuration for [`crate::Cascade::run_cascade`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadeParams {
    /// Minimum detection window side length, in pixels.
    pub min_size: usize,
    /// Maximum detection window side length, in pixels.
    pub max_size: usize,
    /// Fraction of the window size to step between positions, in (0, 1].
    pub shift_factor: f64,
    /// Multiplicative window growth between scale levels, greater than 1.
    pub scale_factor: f64,
}

/// One detected object instance.
///
/// `(row, col)` is the detection window center and `scale` its side length,
/// all in pixels. `q` is the classification score: the scanner only emits
/// detections with `q > 0`, and clustering sums the scores of merged
/// members, so a large `q` means strong and/or repeated positive responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub row: usize,
    pub col: usize,
    pub scale: usize,
    pub q: f32,
}
