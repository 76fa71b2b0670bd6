//! Compact command implementation.

use super::Site;
use std::fs;

/// Runs the compact command.
pub fn run(site: &Site) -> Result<(), Box<dyn std::error::Error>> {
    let path = site.store.path();
    let bytes_before = fs::metadata(path)?.len();
    site.store.compact()?;
    let bytes_after = fs::metadata(path)?.len();

    println!("Compacted {}", path.display());
    println!("  Size before: {bytes_before} bytes");
    println!("  Size after:  {bytes_after} bytes");
    println!(
        "  Space saved: {} bytes",
        bytes_before.saturating_sub(bytes_after)
    );
    Ok(())
}
