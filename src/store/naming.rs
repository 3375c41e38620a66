//! Task filenames: `{id}-{slug}.md`.

use regex::Regex;
use std::sync::LazyLock;

/// Pattern a file must match to be treated as a task file.
static TASK_FILENAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-.*\.md$").expect("Invalid task filename regex"));

/// Maximum slug length in bytes (the slug is always ASCII).
pub const MAX_SLUG_LENGTH: usize = 100;

/// Slugify a title for use in a task filename.
///
/// Lowercases ASCII letters and digits and collapses every other run of
/// characters into one hyphen. Non-ASCII characters are dropped rather than
/// transliterated.
pub fn slugify_title(title: &str) -> String {
    let mut slug = String::new();
    let mut last_was_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen && !slug.is_empty() {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.len() > MAX_SLUG_LENGTH {
        // Truncate at word boundary if possible
        if let Some(pos) = slug[..MAX_SLUG_LENGTH].rfind('-') {
            slug.truncate(pos);
        } else {
            slug.truncate(MAX_SLUG_LENGTH);
        }
    }

    if slug.is_empty() {
        slug = "untitled".to_string();
    }

    slug
}

/// Filename for the task `id` titled `title`.
pub fn task_filename(id: u64, title: &str) -> String {
    format!("{}-{}.md", id, slugify_title(title))
}

/// Id encoded in a task filename, if the name matches the task pattern.
///
/// Ids too large for `u64` do not match.
pub fn filename_id(filename: &str) -> Option<u64> {
    let captures = TASK_FILENAME_REGEX.captures(filename)?;
    captures.get(1)?.as_str().parse().ok()
}
