use gray_matter::Matter;
use gray_matter::engine::YAML;
use tera::Tera;

use crate::error::IndexResult;
use crate::template::render_index_body;

/// Build the full text of an index note.
///
/// Frontmatter already present in `existing` is carried over verbatim; the
/// rest of the old note is replaced by the freshly rendered body.
pub fn compose_index_note(
    tera: &Tera,
    root: &str,
    index_title: &str,
    outline: &str,
    existing: Option<&str>,
) -> IndexResult<String> {
    let body = render_index_body(tera, root, index_title, outline)?;
    match existing.and_then(existing_frontmatter) {
        Some(matter) => Ok(format!("---\n{matter}\n---\n\n{body}")),
        None => Ok(body),
    }
}

fn existing_frontmatter(text: &str) -> Option<String> {
    let matter = Matter::<YAML>::new();
    let result = matter.parse(text);
    if result.data.is_none() {
        return None;
    }
    let raw = result.matter.trim_matches('\n');
    if raw.trim().is_empty() {
        return None;
    }
    Some(raw.to_string())
}
