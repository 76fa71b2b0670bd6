//! Publish and unpublish command implementations.

use super::Site;
use codepage_core::{EntityId, Entry, EntryStatus};

/// Runs the publish command.
pub fn publish(site: &Site, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let entry = set(site, id, EntryStatus::Published)?;
    println!("Published {} ({})", entry.id, entry.title);
    Ok(())
}

/// Runs the unpublish command.
pub fn unpublish(site: &Site, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let entry = set(site, id, EntryStatus::Draft)?;
    println!("Unpublished {} ({})", entry.id, entry.title);
    Ok(())
}

fn set(site: &Site, id: u64, status: EntryStatus) -> Result<Entry, Box<dyn std::error::Error>> {
    let entry = site
        .pages
        .directory()
        .set_status(EntityId::new(id), status)?;
    site.pages.meta().flush()?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, testing};

    #[test]
    fn publish_then_unpublish() {
        let (_dir, site) = testing::site();
        let entry = create::create(&site, "Page", 1, None).unwrap();

        assert!(set(&site, entry.id.as_u64(), EntryStatus::Published)
            .unwrap()
            .status
            .is_published());
        assert_eq!(
            set(&site, entry.id.as_u64(), EntryStatus::Draft).unwrap().status,
            EntryStatus::Draft
        );
    }

    #[test]
    fn missing_entry_fails() {
        let (_dir, site) = testing::site();
        assert!(publish(&site, 9).is_err());
    }
}
