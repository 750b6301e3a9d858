//! End-to-end detection flows through the public API.

use std::io::Write;

use bzip2::write::BzEncoder;
use bzip2::Compression;

use facefinder::{cluster_detections, Cascade, CascadeParams, Error, ImageParams};

/// Serialize trees into the packed cascade layout.
fn pack_cascade(depth: u32, trees: &[(Vec<i8>, Vec<f32>, f32)]) -> Vec<u8> {
    let leaves = 1usize << depth;
    let mut packet = vec![0u8; 8];
    packet.extend_from_slice(&depth.to_le_bytes());
    packet.extend_from_slice(&(trees.len() as u32).to_le_bytes());

    for (codes, preds, threshold) in trees {
        assert_eq!(codes.len(), 4 * leaves - 4);
        assert_eq!(preds.len(), leaves);
        for &c in codes {
            packet.push(c as u8);
        }
        for &p in preds {
            packet.extend_from_slice(&p.to_le_bytes());
        }
        packet.extend_from_slice(&threshold.to_le_bytes());
    }
    packet
}

/// A detector whose single tree compares a probe a quarter-window above
/// the center against one a quarter-window below. It fires on windows
/// that get brighter downward and rejects the opposite.
fn gradient_detector() -> Cascade {
    let packet = pack_cascade(1, &[(vec![-64, 0, 64, 0], vec![-1.0, 3.0], -0.5)]);
    Cascade::decode(&packet).unwrap()
}

fn vertical_gradient(rows: usize, cols: usize, descending: bool) -> Vec<u8> {
    (0..rows * cols)
        .map(|i| {
            let level = ((i / cols) * 4) as u8;
            if descending {
                252 - level
            } else {
                level
            }
        })
        .collect()
}

const SCAN: CascadeParams = CascadeParams {
    min_size: 20,
    max_size: 40,
    shift_factor: 0.1,
    scale_factor: 1.1,
};

#[test]
fn gradient_detector_end_to_end() {
    let cascade = gradient_detector();

    let lit = vertical_gradient(64, 64, false);
    let image = ImageParams::from_contiguous(&lit, 64, 64).unwrap();
    let candidates = cascade.run_cascade(&image, &SCAN);

    assert!(!candidates.is_empty());
    assert!(candidates.iter().all(|d| d.q == 3.5));

    let faces = cluster_detections(&candidates, 0.2);
    assert!(!faces.is_empty());
    assert!(faces.len() <= candidates.len());
    for face in &faces {
        assert!(face.row < 64 && face.col < 64);
        assert!((SCAN.min_size..=SCAN.max_size).contains(&face.scale));
        assert!(face.q >= 3.5);
    }

    // Flipping the gradient flips every probe comparison, so the one
    // tree rejects every window.
    let dark = vertical_gradient(64, 64, true);
    let image = ImageParams::from_contiguous(&dark, 64, 64).unwrap();
    assert!(cascade.run_cascade(&image, &SCAN).is_empty());
}

#[test]
fn clustering_collapses_the_scan_grid() {
    let packet = pack_cascade(1, &[(vec![0, 0, 0, 0], vec![1.0, 1.0], -100.0)]);
    let cascade = Cascade::decode(&packet).unwrap();

    let pixels = vec![128u8; 100 * 100];
    let image = ImageParams::from_contiguous(&pixels, 100, 100).unwrap();
    let params = CascadeParams {
        min_size: 24,
        max_size: 24,
        shift_factor: 0.1,
        scale_factor: 1.2,
    };

    let candidates = cascade.run_cascade(&image, &params);
    assert_eq!(candidates.len(), 38 * 38);

    let faces = cluster_detections(&candidates, 0.2);
    assert!(!faces.is_empty());
    assert!(faces.len() < candidates.len());

    // Every face is the mean of windows from the scan grid.
    for face in &faces {
        assert_eq!(face.scale, 24);
        assert!((13..=87).contains(&face.row) && (13..=87).contains(&face.col));
    }
}

#[test]
fn cascade_files_load_from_raw_and_bz2() {
    let packet = pack_cascade(1, &[(vec![-64, 0, 64, 0], vec![-1.0, 3.0], -0.5)]);
    let reference = Cascade::decode(&packet).unwrap();

    let raw_path = std::env::temp_dir().join("facefinder_it_cascade.bin");
    std::fs::write(&raw_path, &packet).unwrap();
    let from_raw = Cascade::load(&raw_path).unwrap();
    std::fs::remove_file(&raw_path).ok();

    let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&packet).unwrap();
    let compressed = encoder.finish().unwrap();
    let bz2_path = std::env::temp_dir().join("facefinder_it_cascade.bin.bz2");
    std::fs::write(&bz2_path, &compressed).unwrap();
    let from_bz2 = Cascade::load(&bz2_path).unwrap();
    std::fs::remove_file(&bz2_path).ok();

    // All three decodes must classify identically, bit for bit.
    let lit = vertical_gradient(64, 64, false);
    let image = ImageParams::from_contiguous(&lit, 64, 64).unwrap();
    let expected = reference.classify_region(32, 32, 20, &image).unwrap();

    for cascade in [&from_raw, &from_bz2] {
        assert_eq!(cascade.tree_num(), 1);
        assert_eq!(cascade.tree_depth(), 1);
        let q = cascade.classify_region(32, 32, 20, &image).unwrap();
        assert_eq!(q.to_bits(), expected.to_bits());
    }
}

#[test]
fn errors_surface_through_the_public_api() {
    let err = Cascade::load("/no/such/facefinder_cascade.bin").unwrap_err();
    assert!(matches!(err, Error::Io(_)));

    let packet = pack_cascade(1, &[(vec![0, 0, 0, 0], vec![1.0, 1.0], 0.0)]);
    let err = Cascade::decode(&packet[..packet.len() - 1]).unwrap_err();
    assert!(matches!(err, Error::TruncatedCascade { .. }));

    let cascade = Cascade::decode(&packet).unwrap();
    let pixels = vec![0u8; 32 * 32];
    let image = ImageParams::from_contiguous(&pixels, 32, 32).unwrap();
    let err = cascade.classify_region(2, 2, 10, &image).unwrap_err();
    assert!(matches!(err, Error::WindowOutOfBounds { .. }));

    let err = ImageParams::new(&pixels, 33, 32, 32).unwrap_err();
    assert!(matches!(err, Error::SizeMismatch { .. }));
}
