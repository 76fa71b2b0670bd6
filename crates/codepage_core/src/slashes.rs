//! Backslash escaping applied by the request transport.
//!
//! Form values reach the store with `'`, `"`, `\` and NUL escaped by a
//! backslash (NUL becomes `\0`). The store persists that text as received and
//! the renderer reverses the layer exactly once. [`strip_slashes`] is the
//! inverse of [`add_slashes`] for every input.

/// Escapes `'`, `"`, `\` and NUL with a backslash.
#[must_use]
pub fn add_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\'' | '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out
}

/// Removes one layer of backslash escaping.
///
/// `\0` becomes NUL, `\x` becomes `x` for any other character, and a lone
/// trailing backslash is dropped.
#[must_use]
pub fn strip_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some(next) => out.push(next),
            None => {}
        }
    }
    out
}
