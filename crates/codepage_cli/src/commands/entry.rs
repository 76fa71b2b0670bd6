//! Rename and delete command implementations.

use super::Site;
use codepage_core::EntityId;

/// Runs the rename command.
pub fn rename(site: &Site, id: u64, title: &str) -> Result<(), Box<dyn std::error::Error>> {
    let entry = site.pages.directory().set_title(EntityId::new(id), title)?;
    site.pages.meta().flush()?;
    println!("Renamed {} to {:?} (/{})", entry.id, entry.title, entry.slug());
    Ok(())
}

/// Runs the delete command. Removes the entry and its code fields.
pub fn delete(site: &Site, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let id = EntityId::new(id);
    if !site.pages.directory().remove(id)? {
        return Err(format!("Entry {id} not found").into());
    }
    site.pages.meta().flush()?;
    println!("Deleted {id}");
    Ok(())
}
