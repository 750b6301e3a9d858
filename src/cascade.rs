//! Cascade decoding and detection-window classification.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bzip2::read::BzDecoder;

use crate::error::{Error, Result};
use crate::types::ImageParams;

/// A decoded detection cascade: an ordered forest of fixed-depth binary
/// decision trees over pairwise pixel comparisons.
///
/// The forest is stored as flat arenas indexed per tree rather than as
/// per-node objects: each tree owns a fixed-stride block of probe codes, a
/// block of leaf predictions, and one rejection threshold. A cascade is
/// immutable after decoding and can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Cascade {
    tree_depth: u32,
    tree_num: u32,
    tree_codes: Vec<i8>,
    tree_pred: Vec<f32>,
    tree_threshold: Vec<f32>,
}

/// Bounds-checked cursor over the raw cascade bytes.
///
/// Every read is validated against the remaining buffer, so the decoder
/// never trusts the counts declared in the header.
struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::TruncatedCascade {
                offset: self.pos,
                needed: n,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reinterpret the next 4 bytes, bit-exactly, as an IEEE-754 float.
    fn read_f32(&mut self) -> Result<f32> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

impl Cascade {
    /// Decode a packed binary cascade.
    ///
    /// The format is little-endian throughout:
    ///
    /// ```text
    /// [8 bytes]         header, not interpreted
    /// [u32]             tree depth D (every tree is perfect, 2^D leaves)
    /// [u32]             tree count N
    /// then N times:
    ///   [4*2^D - 4 i8]  probe offsets, 4 per internal node
    ///   [2^D x f32]     leaf predictions
    ///   [f32]           tree rejection threshold
    /// ```
    ///
    /// Decoding is all-or-nothing: a buffer shorter than the forest it
    /// declares fails with [`Error::TruncatedCascade`] and no partial
    /// cascade is ever returned. A header describing an undecodable forest
    /// (zero trees, or a depth whose block sizes overflow) fails with
    /// [`Error::InvalidCascade`]. Trailing bytes after the last tree are
    /// ignored.
    pub fn decode(packet: &[u8]) -> Result<Self> {
        let mut r = PacketReader::new(packet);

        // Format/version preamble, not interpreted.
        r.skip(8)?;
        let tree_depth = r.read_u32()?;
        let tree_num = r.read_u32()?;

        if tree_num == 0 {
            return Err(Error::InvalidCascade("cascade contains no trees".into()));
        }
        let leaves = 1usize
            .checked_shl(tree_depth)
            .ok_or_else(|| Error::InvalidCascade(format!("tree depth {tree_depth} is too large")))?;
        let code_block = leaves
            .checked_mul(4)
            .ok_or_else(|| Error::InvalidCascade(format!("tree depth {tree_depth} is too large")))?;

        // Each tree record is (code_block - 4) code bytes, a leaf block of
        // the same byte size, and a 4-byte threshold. Verify the whole
        // forest is present before sizing the arenas from declared counts.
        let n = tree_num as usize;
        let required = code_block
            .checked_mul(2)
            .and_then(|record| record.checked_mul(n))
            .ok_or_else(|| Error::InvalidCascade(format!("tree count {tree_num} is too large")))?;
        if required > r.remaining() {
            return Err(Error::TruncatedCascade {
                offset: r.pos,
                needed: required,
            });
        }

        let mut tree_codes = Vec::with_capacity(n * code_block);
        let mut tree_pred = Vec::with_capacity(n * leaves);
        let mut tree_threshold = Vec::with_capacity(n);

        for _ in 0..n {
            // Node index 0 of each tree's code block is unused: internal
            // nodes are 1-indexed so a descent is `idx = 2*idx + bit`.
            tree_codes.extend_from_slice(&[0, 0, 0, 0]);
            tree_codes.extend(r.take(code_block - 4)?.iter().map(|&b| b as i8));

            for _ in 0..leaves {
                tree_pred.push(r.read_f32()?);
            }
            tree_threshold.push(r.read_f32()?);
        }

        Ok(Self {
            tree_depth,
            tree_num,
            tree_codes,
            tree_pred,
            tree_threshold,
        })
    }

    /// Load a cascade from a file, transparently decompressing `.bz2`
    /// files.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        if path.extension().is_some_and(|ext| ext == "bz2") {
            Self::from_reader(BzDecoder::new(reader))
        } else {
            Self::from_reader(reader)
        }
    }

    /// Read a packed cascade to the end of `reader` and decode it.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut packet = Vec::new();
        reader.read_to_end(&mut packet)?;
        Self::decode(&packet)
    }

    /// Depth of every tree in the forest.
    pub fn tree_depth(&self) -> u32 {
        self.tree_depth
    }

    /// Number of trees in the forest.
    pub fn tree_num(&self) -> u32 {
        self.tree_num
    }

    /// Classify a single detection window, validating it against the image.
    ///
    /// `(row, col)` is the window center and `scale` its side length, in
    /// pixels. Probes stay within `scale/2 + 1` pixels of the center, so
    /// with `offset = scale/2 + 1` the window must satisfy
    /// `offset <= row <= rows - offset` (and likewise for columns);
    /// anything else fails with [`Error::WindowOutOfBounds`] instead of
    /// reading out of range.
    ///
    /// A returned score of exactly `-1.0` is the early-rejection sentinel:
    /// some tree's threshold was not met and the remaining trees were never
    /// evaluated. Any other value is the full-forest total minus the final
    /// tree's threshold; values above `0.0` indicate a positive detection.
    pub fn classify_region(
        &self,
        row: usize,
        col: usize,
        scale: usize,
        image: &ImageParams<'_>,
    ) -> Result<f32> {
        let offset = scale / 2 + 1;
        if row < offset
            || col < offset
            || row > image.rows().saturating_sub(offset)
            || col > image.cols().saturating_sub(offset)
        {
            return Err(Error::WindowOutOfBounds {
                row,
                col,
                scale,
                rows: image.rows(),
                cols: image.cols(),
            });
        }
        Ok(self.classify_window(row, col, scale, image.pixels(), image.dim()))
    }

    /// Tight classification loop over one window.
    ///
    /// Callers must guarantee the window's probes stay inside the pixel
    /// buffer; the scanner's loop bounds do, and [`Self::classify_region`]
    /// checks before delegating here.
    pub(crate) fn classify_window(
        &self,
        row: usize,
        col: usize,
        scale: usize,
        pixels: &[u8],
        dim: usize,
    ) -> f32 {
        let depth = self.tree_depth as usize;
        let leaves = 1usize << depth;
        let tree_num = self.tree_num as usize;

        // 8-bit fixed point: the center is scaled by 256 so a probe offset
        // (signed byte scaled by the window size) resolves to a pixel
        // coordinate with a single shift, keeping the loop integer-only.
        let r = (row as isize) << 8;
        let c = (col as isize) << 8;
        let s = scale as isize;
        let dim = dim as isize;

        let mut root = 0usize;
        let mut out = 0.0f32;

        for i in 0..tree_num {
            let mut idx = 1usize;

            for _ in 0..depth {
                let node = root + 4 * idx;
                let code = &self.tree_codes[node..node + 4];

                let x1 = ((r + code[0] as isize * s) >> 8) * dim + ((c + code[1] as isize * s) >> 8);
                let x2 = ((r + code[2] as isize * s) >> 8) * dim + ((c + code[3] as isize * s) >> 8);

                let bit = usize::from(pixels[x1 as usize] <= pixels[x2 as usize]);
                idx = 2 * idx + bit;
            }
            out += self.tree_pred[leaves * i + idx - leaves];

            if out <= self.tree_threshold[i] {
                return -1.0;
            }
            root += 4 * leaves;
        }
        out - self.tree_threshold[tree_num - 1]
    }
}
