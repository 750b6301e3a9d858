//! Greedy clustering of overlapping detections.

use crate::types::Detection;

/// Intersection area of two detection windows over the area of their
/// union, with each window taken as an axis-aligned square of side
/// `scale` centered on `(row, col)`.
fn overlap_ratio(a: &Detection, b: &Detection) -> f64 {
    let (r1, c1, s1) = (a.row as f64, a.col as f64, a.scale as f64);
    let (r2, c2, s2) = (b.row as f64, b.col as f64, b.scale as f64);

    let over_row =
        ((r1 + s1 / 2.0).min(r2 + s2 / 2.0) - (r1 - s1 / 2.0).max(r2 - s2 / 2.0)).max(0.0);
    let over_col =
        ((c1 + s1 / 2.0).min(c2 + s2 / 2.0) - (c1 - s1 / 2.0).max(c2 - s2 / 2.0)).max(0.0);

    let overlap = over_row * over_col;
    overlap / (s1 * s1 + s2 * s2 - overlap)
}

/// Merge overlapping detections into one detection per cluster.
///
/// Detections are processed in ascending score order. Each detection that
/// no cluster has claimed yet seeds a new cluster and greedily claims
/// every still-unclaimed detection whose overlap ratio with the seed
/// exceeds `iou_threshold`; a claimed detection belongs to exactly one
/// cluster. Each cluster collapses to a single [`Detection`] at the
/// integer mean position and scale of its members, with the members'
/// scores summed, so a cluster's `q` grows with the amount of agreement
/// behind it.
///
/// A window always overlaps itself completely, so any `iou_threshold`
/// below `1.0` leaves no detection behind. Thresholds of `1.0` or more
/// exceed every possible ratio and yield an empty result.
pub fn cluster_detections(detections: &[Detection], iou_threshold: f64) -> Vec<Detection> {
    let mut sorted = detections.to_vec();
    sorted.sort_by(|a, b| a.q.total_cmp(&b.q));

    let mut claimed = vec![false; sorted.len()];
    let mut clusters = Vec::new();

    for i in 0..sorted.len() {
        if claimed[i] {
            continue;
        }
        let mut row_sum = 0usize;
        let mut col_sum = 0usize;
        let mut scale_sum = 0usize;
        let mut q_sum = 0.0f32;
        let mut members = 0usize;

        for j in 0..sorted.len() {
            if claimed[j] {
                continue;
            }
            if overlap_ratio(&sorted[i], &sorted[j]) > iou_threshold {
                claimed[j] = true;
                row_sum += sorted[j].row;
                col_sum += sorted[j].col;
                scale_sum += sorted[j].scale;
                q_sum += sorted[j].q;
                members += 1;
            }
        }
        if members > 0 {
            clusters.push(Detection {
                row: row_sum / members,
                col: col_sum / members,
                scale: scale_sum / members,
                q: q_sum,
            });
        }
    }
    clusters
}
