//! # facefinder
//!
//! Pure Rust face detection with pixel-intensity-comparison decision
//! tree cascades.
//!
//! This crate provides:
//! - **Cascade decoding**: packed binary forests of fixed-depth trees
//! - **Window classification**: integer-only probe comparisons with
//!   early rejection
//! - **Multiscale scanning**: a sliding detection window over every
//!   scale in a configured range
//! - **Clustering**: greedy merging of overlapping detections
//!
//! Implements the detection method from "Object Detection with Pixel
//! Intensity Comparisons Organized in Decision Trees" (Markus et al.,
//! 2014).
//!
//! ## Algorithm Overview
//!
//! 1. Decode a trained cascade into flat per-tree arenas
//! 2. Slide a square window across the image at increasing scales
//! 3. For each window, walk every tree by comparing pairs of pixels
//!    around the window center, summing the leaf predictions
//! 4. Drop the window as soon as any tree's running total falls to its
//!    rejection threshold
//! 5. Cluster the surviving windows so each face is reported once
//!
//! ## Quick Start
//!
//! ```rust
//! use facefinder::{cluster_detections, Cascade, CascadeParams, ImageParams};
//!
//! // Assemble a minimal single-tree cascade by hand; trained models are
//! // files loaded with `Cascade::load`.
//! let mut packet = vec![0u8; 8];
//! packet.extend_from_slice(&1u32.to_le_bytes()); // tree depth
//! packet.extend_from_slice(&1u32.to_le_bytes()); // tree count
//! packet.extend_from_slice(&[0u8; 4]); // probe codes
//! packet.extend_from_slice(&1.0f32.to_le_bytes()); // leaf predictions
//! packet.extend_from_slice(&1.0f32.to_le_bytes());
//! packet.extend_from_slice(&(-1.0f32).to_le_bytes()); // threshold
//! let cascade = Cascade::decode(&packet).unwrap();
//!
//! // Scan a grayscale image, row-major, one byte per pixel.
//! let pixels = vec![128u8; 64 * 64];
//! let image = ImageParams::from_contiguous(&pixels, 64, 64).unwrap();
//!
//! let params = CascadeParams {
//!     min_size: 20,
//!     max_size: 40,
//!     shift_factor: 0.1,
//!     scale_factor: 1.1,
//! };
//! let candidates = cascade.run_cascade(&image, &params);
//! let faces = cluster_detections(&candidates, 0.2);
//! assert!(!faces.is_empty());
//! ```
//!
//! ## Cascade Files
//!
//! Models use the packed binary layout produced by pico-style training
//! tools: an eight byte header, the tree depth and tree count, then each
//! tree's probe codes, leaf predictions and rejection threshold, all
//! little-endian. Files ending in `.bz2` are decompressed transparently
//! by [`Cascade::load`].

mod cascade;
mod cluster;
mod detect;
mod error;
mod types;

pub use cascade::Cascade;
pub use cluster::cluster_detections;
pub use error::{Error, Result};
pub use types::{CascadeParams, Detection, ImageParams};
