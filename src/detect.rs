//! Multiscale sliding-window scanning.

use crate::cascade::Cascade;
use crate::types::{CascadeParams, Detection, ImageParams};

impl Cascade {
    /// Slide a detection window over `image` at every scale and collect
    /// the windows the cascade scores positively.
    ///
    /// The window side length starts at `params.min_size` and is
    /// multiplied by `params.scale_factor` until it exceeds
    /// `params.max_size`; at each scale the window is stepped by
    /// `scale * shift_factor` pixels (at least one). Window centers keep
    /// `scale/2 + 1` pixels of margin to the image border, so every probe
    /// stays inside the pixel buffer.
    ///
    /// A configuration that describes no scales at all, such as a zero
    /// minimum size, an empty size range, a non-positive shift factor or a
    /// scale factor of one or less, yields no detections rather than an
    /// error. Candidates are returned in scan order; they are unclustered
    /// and usually overlap heavily.
    pub fn run_cascade(&self, image: &ImageParams<'_>, params: &CascadeParams) -> Vec<Detection> {
        let mut detections = Vec::new();

        if params.min_size == 0
            || params.min_size > params.max_size
            || params.shift_factor <= 0.0
            || params.scale_factor <= 1.0
        {
            return detections;
        }

        let pixels = image.pixels();
        let dim = image.dim();

        let mut scale = params.min_size;
        while scale <= params.max_size {
            let step = ((scale as f64 * params.shift_factor) as usize).max(1);
            let offset = scale / 2 + 1;

            let mut row = offset;
            while row <= image.rows().saturating_sub(offset) {
                let mut col = offset;
                while col <= image.cols().saturating_sub(offset) {
                    let q = self.classify_window(row, col, scale, pixels, dim);
                    if q > 0.0 {
                        detections.push(Detection { row, col, scale, q });
                    }
                    col = col.saturating_add(step);
                }
                row = row.saturating_add(step);
            }

            // Truncating the product can repeat a small scale, so the
            // scale always advances by at least one pixel.
            let next = (scale as f64 * params.scale_factor) as usize;
            scale = match scale.checked_add(1) {
                Some(bumped) => next.max(bumped),
                None => break,
            };
        }
        detections
    }
}
