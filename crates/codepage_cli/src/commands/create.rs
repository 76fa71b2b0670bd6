//! Create command implementation.

use super::Site;
use codepage_core::Entry;

/// Runs the create command.
pub fn run(
    site: &Site,
    title: &str,
    author: u64,
    kind: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let entry = create(site, title, author, kind)?;
    println!("Created {} {} ({})", entry.kind, entry.id, entry.status);
    println!("  slug: {}", entry.slug());
    Ok(())
}

/// Creates the entry and makes sure it reached the log.
pub fn create(
    site: &Site,
    title: &str,
    author: u64,
    kind: Option<&str>,
) -> Result<Entry, Box<dyn std::error::Error>> {
    let kind = kind.unwrap_or(site.pages.config().content_kind.as_str());
    let entry = site.pages.directory().create(kind, title, author)?;
    site.pages.meta().flush()?;
    Ok(entry)
}
