//! CLI application for face detection.
//!
//! Usage:
//!   facefinder <image>                    # Human-readable output
//!   facefinder <image> --json             # JSON output
//!   facefinder <image> -o faces.json      # Save to file

use clap::Parser;
use facefinder::{cluster_detections, Cascade, CascadeParams, ImageParams};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "facefinder")]
#[command(author, version, about = "Face detection with decision tree cascades", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Cascade model path (plain or .bz2)
    #[arg(long, default_value = "facefinder.bin")]
    cascade: PathBuf,

    /// Smallest detection window side, in pixels
    #[arg(long, default_value = "20")]
    min_size: usize,

    /// Largest detection window side, in pixels
    #[arg(long, default_value = "1000")]
    max_size: usize,

    /// Window step as a fraction of the window size
    #[arg(long, default_value = "0.1")]
    shift_factor: f64,

    /// Window growth factor between scales
    #[arg(long, default_value = "1.1")]
    scale_factor: f64,

    /// Overlap ratio above which detections are merged
    #[arg(long, default_value = "0.2")]
    iou_threshold: f64,

    /// Discard clustered detections scoring below this
    #[arg(long, default_value = "5.0")]
    min_score: f32,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    image: String,
    width: u32,
    height: u32,
    faces_detected: usize,
    faces: Vec<FaceOutput>,
}

#[derive(Serialize)]
struct FaceOutput {
    /// Face index (1-based)
    index: usize,
    /// Window center row, in pixels from the top
    row: usize,
    /// Window center column, in pixels from the left
    col: usize,
    /// Window side length in pixels
    size: usize,
    /// Summed cascade score of the cluster
    score: f32,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.verbose {
        eprintln!("Loading cascade from {:?}...", args.cascade);
    }
    let cascade = Cascade::load(&args.cascade)?;

    if args.verbose {
        eprintln!(
            "Cascade: {} trees of depth {}",
            cascade.tree_num(),
            cascade.tree_depth()
        );
        eprintln!("Loading image {:?}...", args.image);
    }
    let img = image::open(&args.image)?;
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();
    let image = ImageParams::new(
        gray.as_raw(),
        height as usize,
        width as usize,
        width as usize,
    )?;

    let params = CascadeParams {
        min_size: args.min_size,
        max_size: args.max_size,
        shift_factor: args.shift_factor,
        scale_factor: args.scale_factor,
    };

    if args.verbose {
        eprintln!("Detecting faces...");
    }
    let candidates = cascade.run_cascade(&image, &params);
    if args.verbose {
        eprintln!("{} raw candidate window(s)", candidates.len());
    }

    let mut faces = cluster_detections(&candidates, args.iou_threshold);
    faces.retain(|d| d.q >= args.min_score);
    faces.sort_by(|a, b| b.q.total_cmp(&a.q));

    let output = Output {
        image: args.image.display().to_string(),
        width,
        height,
        faces_detected: faces.len(),
        faces: faces
            .iter()
            .enumerate()
            .map(|(i, d)| FaceOutput {
                index: i + 1,
                row: d.row,
                col: d.col,
                size: d.scale,
                score: d.q,
            })
            .collect(),
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        if args.verbose {
            eprintln!("Output written to {:?}", path);
        }
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "Image: {} ({}x{})\n",
        output.image, output.width, output.height
    ));
    s.push_str(&format!("Faces detected: {}\n", output.faces_detected));

    if output.faces.is_empty() {
        s.push_str("\nNo faces found.\n");
        return s;
    }

    s.push('\n');
    for face in &output.faces {
        s.push_str(&format!(
            "  {}. {}x{} window at (row {}, col {}), score {:.2}\n",
            face.index, face.size, face.size, face.row, face.col, face.score
        ));
    }

    s
}
