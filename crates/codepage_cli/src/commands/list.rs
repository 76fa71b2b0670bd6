//! List command implementation.

use super::Site;
use codepage_core::Entry;

/// Runs the list command.
pub fn run(site: &Site, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let entries = site.pages.directory().entries()?;
    print!("{}", format_entries(&entries, format)?);
    Ok(())
}

/// Formats entries as a text table or JSON.
pub fn format_entries(entries: &[Entry], format: &str) -> Result<String, Box<dyn std::error::Error>> {
    match format {
        "json" => Ok(format!("{}\n", serde_json::to_string_pretty(entries)?)),
        "text" => {
            let mut out = format!("{:>6}  {:<10} {:<12} {:<24} {}\n", "ID", "STATUS", "KIND", "SLUG", "TITLE");
            for entry in entries {
                out.push_str(&format!(
                    "{:>6}  {:<10} {:<12} {:<24} {}\n",
                    entry.id,
                    entry.status,
                    entry.kind,
                    entry.slug(),
                    entry.title
                ));
            }
            Ok(out)
        }
        other => Err(format!("Unknown format: {other}").into()),
    }
}
