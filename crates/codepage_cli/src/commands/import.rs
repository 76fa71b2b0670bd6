//! Import command implementation.
//!
//! Imports go through the regular save contract: the CLI acts as an
//! administrator with a freshly issued edit token, and the file contents
//! pass through the same transport escaping as a form submission.

use super::Site;
use codepage_core::{
    add_slashes, CodeField, EntityId, Principal, Role, SaveContext, SaveRequest, Snippet,
};
use std::fs;
use std::path::PathBuf;

/// User id the CLI acts as.
const CLI_USER: u64 = 0;

/// Session id bound into CLI edit tokens.
const CLI_SESSION: &str = "codepage-cli";

/// Source files for the code fields.
#[derive(Debug, Default)]
pub struct CodeFiles {
    /// HTML source.
    pub html: Option<PathBuf>,
    /// CSS source.
    pub css: Option<PathBuf>,
    /// JavaScript source.
    pub js: Option<PathBuf>,
}

/// Runs the import command.
pub fn run(site: &Site, id: u64, files: &CodeFiles) -> Result<(), Box<dyn std::error::Error>> {
    let fields = import(site, EntityId::new(id), files)?;
    let names: Vec<String> = fields.iter().map(ToString::to_string).collect();
    println!("Imported {} into entry {id}", names.join(", "));
    Ok(())
}

/// Saves the given files onto `id`. Returns the fields submitted.
pub fn import(
    site: &Site,
    id: EntityId,
    files: &CodeFiles,
) -> Result<Vec<CodeField>, Box<dyn std::error::Error>> {
    let admin = Principal::new(CLI_USER, Role::Administrator);
    let store = site.pages.store();
    store
        .editable_entry(id, &admin)?
        .ok_or_else(|| format!("Entry {id} is not editable"))?;

    let mut request = SaveRequest::new();
    for (field, path) in [
        (CodeField::Html, &files.html),
        (CodeField::Css, &files.css),
        (CodeField::Js, &files.js),
    ] {
        if let Some(path) = path {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
            request.set(field, add_slashes(&text));
        }
    }
    if request.is_empty() {
        return Err("Nothing to import: pass --html, --css or --js".into());
    }

    let token = store.issue_token(id, &admin, CLI_SESSION);
    store.save(id, &request, &SaveContext::new(admin, CLI_SESSION, Some(token)));
    site.pages.meta().flush()?;
    check_stored(&store.load(id)?, &request)?;

    Ok(request.fields().map(|(field, _)| field).collect())
}

/// `save` reports nothing, so read the fields back.
fn check_stored(snippet: &Snippet, request: &SaveRequest) -> Result<(), String> {
    let lost: Vec<String> = request
        .fields()
        .filter(|(field, value)| snippet.field(*field) != *value)
        .map(|(field, _)| field.to_string())
        .collect();
    if lost.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "Entry {} was not saved ({} not stored, see the log)",
            snippet.entry.id,
            lost.join(", ")
        ))
    }
}
