/// Pack a directory into an archive and unpack it again
///
/// Run with: cargo run --example pack_and_unpack -- <DIR>
use foldpack::{Archive, LEVEL_MAX};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let source = std::env::args().nth(1).unwrap_or_else(|| "src".to_string());

    println!("=== Foldpack Example ===\n");

    // Compress
    println!("1. Packing {} ...", source);
    let mut archive = Archive::new();
    archive.add_directory(&source, true)?;
    let stats = archive.to_file("output.zst", LEVEL_MAX)?;
    println!("   number of files: {}", stats.entry_count);
    println!("   original size:   {} b", stats.raw_size);
    println!("   compressed size: {} b", stats.compressed_size);

    // Decompress
    println!("\n2. Unpacking into output_dir ...");
    let archive = Archive::from_file("output.zst")?;
    for (entry, bytes) in archive.iter() {
        println!("   - {} ({} bytes)", entry.path, bytes.len());
    }
    let written = archive.extract_to("output_dir", true)?;

    println!("\n✓ Extracted {} files", written);
    Ok(())
}
