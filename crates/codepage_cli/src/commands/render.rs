//! Render command implementation.

use super::Site;
use codepage_core::{EntityId, View, ViewTarget};

/// Runs the render command.
pub fn run(site: &Site, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(site, id)?);
    Ok(())
}

/// Renders entry `id` if it is routed to the page renderer.
pub fn render(site: &Site, id: u64) -> Result<String, Box<dyn std::error::Error>> {
    match site.pages.view(ViewTarget::Entry(EntityId::new(id)))? {
        View::Page(document) => Ok(document),
        View::Default(_) => Err(format!("Entry {id} is not a published code page").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, testing};

    #[test]
    fn drafts_do_not_render() {
        let (_dir, site) = testing::site();
        let entry = create::create(&site, "Draft", 1, None).unwrap();
        assert!(render(&site, entry.id.as_u64()).is_err());
        assert!(render(&site, 404).is_err());
    }
}
