//! Site chrome: the edit form and the fallback theme.
//!
//! Unlike code pages, everything here is escaped.

use crate::form::{AUTOSAVE_FIELD, NONCE_FIELD};
use codepage_core::{escape_html, strip_slashes, CodeField, Entry, Snippet};
use std::fmt::Write;

/// Renders the edit form for a snippet.
///
/// Textareas show the fields as the author typed them: the transport
/// escaping is removed from all three, so resubmitting an unchanged form
/// stores the same values again.
pub fn edit_form(snippet: &Snippet, nonce: &str, action: &str) -> String {
    let entry = &snippet.entry;
    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         \x20   <meta charset=\"UTF-8\">\n\
         \x20   <title>Edit: {title}</title>\n\
         </head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         <p>Status: {status}</p>\n\
         <form method=\"post\" action=\"{action}\">\n\
         <input type=\"hidden\" name=\"{NONCE_FIELD}\" value=\"{nonce}\">\n\
         <input type=\"hidden\" name=\"{AUTOSAVE_FIELD}\" value=\"0\">\n",
        title = escape_html(&entry.title),
        status = entry.status,
        action = escape_html(action),
        nonce = escape_html(nonce),
    );
    for field in CodeField::ALL {
        let _ = writeln!(
            page,
            "<label for=\"{key}\">{label}</label>\n\
             <textarea name=\"{key}\" id=\"{key}\">{value}</textarea>",
            key = field.form_key(),
            label = field.to_string().to_uppercase(),
            value = escape_html(&strip_slashes(snippet.field(field))),
        );
    }
    page.push_str("<button type=\"submit\">Save</button>\n</form>\n</body>\n</html>\n");
    page
}

/// Renders the themed page for a published entry that is not a code page.
pub fn entry_page(site_name: &str, entry: &Entry) -> String {
    layout(
        site_name,
        &entry.title,
        &format!("<article>\n<h1>{}</h1>\n</article>\n", escape_html(&entry.title)),
    )
}

/// Renders the home page: links to every published entry.
pub fn home_page(site_name: &str, links: &[(String, &Entry)]) -> String {
    let mut body = String::from("<ul>\n");
    for (href, entry) in links {
        let _ = writeln!(
            body,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(href),
            escape_html(&entry.title)
        );
    }
    body.push_str("</ul>\n");
    layout(site_name, site_name, &body)
}

/// Renders the not-found page.
pub fn not_found_page(site_name: &str) -> String {
    layout(site_name, "Not Found", "<p>Nothing here.</p>\n")
}

fn layout(site_name: &str, title: &str, main: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         \x20   <meta charset=\"UTF-8\">\n\
         \x20   <title>{title} | {site}</title>\n\
         </head>\n\
         <body>\n\
         <header><a href=\"/\">{site}</a></header>\n\
         <main>\n{main}</main>\n\
         </body>\n\
         </html>\n",
        title = escape_html(title),
        site = escape_html(site_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepage_core::{EntityId, EntryStatus};

    fn snippet(html: &str, css: &str) -> Snippet {
        Snippet {
            entry: Entry {
                id: EntityId::new(42),
                kind: "code_page".into(),
                title: "A & B".into(),
                status: EntryStatus::Draft,
                author: 1,
            },
            html_code: html.into(),
            css_code: css.into(),
            js_code: String::new(),
        }
    }

    #[test]
    fn edit_form_escapes_contents() {
        let form = edit_form(&snippet("</textarea><script>x</script>", ""), "n0nce", "/edit/42");
        assert!(form.contains(
            "<textarea name=\"html_code\" id=\"html_code\">&lt;/textarea&gt;&lt;script&gt;x&lt;/script&gt;</textarea>"
        ));
        assert!(form.contains("<title>Edit: A &amp; B</title>"));
        assert!(form.contains("name=\"codepage_nonce\" value=\"n0nce\""));
        assert!(form.contains("action=\"/edit/42\""));
    }

    #[test]
    fn edit_form_shows_unescaped_fields() {
        let form = edit_form(&snippet(r"it\'s", r#"a::after{content:\"x\"}"#), "n", "/edit/42");
        assert!(form.contains(">it&#039;s</textarea>"));
        assert!(form.contains(">a::after{content:&quot;x&quot;}</textarea>"));
    }

    #[test]
    fn home_page_lists_links() {
        let entry = snippet("", "").entry;
        let page = home_page("Site", &[("/p/a-b".into(), &entry)]);
        assert!(page.contains("<li><a href=\"/p/a-b\">A &amp; B</a></li>"));
    }
}
