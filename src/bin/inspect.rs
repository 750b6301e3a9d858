use std::env;
use std::fs;

use facefinder::Cascade;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <cascade.bin>", args[0]);
        std::process::exit(1);
    }

    let path = &args[1];
    println!("Inspecting cascade: {}", path);

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    println!("File size: {} bytes", bytes.len());

    // The 16-byte preamble: 8 ignored bytes, then depth and tree count
    // (or bzip2 magic when the cascade is compressed).
    print!("First bytes:");
    for b in bytes.iter().take(16) {
        print!(" {:02x}", b);
    }
    println!();

    println!("\nTrying facefinder::Cascade::load...");
    match Cascade::load(path) {
        Ok(cascade) => {
            let trees = u64::from(cascade.tree_num());
            let leaves = 1u64 << cascade.tree_depth();
            println!("SUCCESS! Cascade loaded:");
            println!("  tree depth: {}", cascade.tree_depth());
            println!("  trees: {}", trees);
            println!("  leaves per tree: {}", leaves);
            println!("  probe codes: {}", trees * 4 * leaves);
            println!("  leaf predictions: {}", trees * leaves);
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
