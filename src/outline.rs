//! Folder-to-outline rendering.
//!
//! Produces the nested bullet list written into index notes:
//!
//! ```text
//! - Resources
//!     + [[General]]
//!     - Projects
//!         + [[Plan]]
//! ```
//!
//! Folders are `- ` bullets, qualifying documents are `+ ` bullets one level
//! deeper than their folder, and every level is four spaces. Siblings are
//! sorted by name before they are emitted so the output never depends on
//! the order the store enumerated them in.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::domain::{Folder, Node};
use crate::error::{IndexError, IndexResult};

pub const INDENT: &str = "    ";
pub const MARKDOWN_EXTENSION: &str = "md";

/// Stateless outline renderer for one markup extension.
#[derive(Debug, Clone, Copy)]
pub struct OutlineRenderer<'a> {
    extension: &'a str,
}

impl<'a> OutlineRenderer<'a> {
    pub fn new(extension: &'a str) -> Self {
        Self { extension }
    }

    pub fn markdown() -> Self {
        Self::new(MARKDOWN_EXTENSION)
    }

    /// Render `node` and its whole subtree at `depth`.
    ///
    /// Only folders can head an outline; anything else is rejected before
    /// any output is produced.
    pub fn render(&self, node: &Node, depth: usize) -> IndexResult<String> {
        match node {
            Node::Folder(folder) => Ok(self.render_folder(folder, depth)),
            Node::Document(document) => Err(IndexError::InvalidArgument(format!(
                "outline root must be a folder, got document {:?}",
                document.name
            ))),
        }
    }

    pub fn render_folder(&self, folder: &Folder, depth: usize) -> String {
        let mut out = String::new();
        self.write_folder(folder, depth, &mut out);
        out
    }

    fn write_folder(&self, folder: &Folder, depth: usize, out: &mut String) {
        push_line(out, depth, "- ", &folder.name);

        let mut children: Vec<&Node> = folder.children.iter().collect();
        children.sort_by(|a, b| compare_names(a.name(), b.name()));

        for child in children {
            match child {
                Node::Folder(sub) => self.write_folder(sub, depth + 1, out),
                Node::Document(doc) if doc.extension == self.extension => {
                    push_line(out, depth + 1, "+ ", &format!("[[{}]]", doc.stem()));
                }
                Node::Document(_) => {}
            }
        }
    }
}

impl Default for OutlineRenderer<'_> {
    fn default() -> Self {
        Self::markdown()
    }
}

/// Render a folder outline for markdown documents.
pub fn render(folder: &Folder, depth: usize) -> String {
    OutlineRenderer::markdown().render_folder(folder, depth)
}

fn push_line(out: &mut String, depth: usize, marker: &str, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(marker);
    out.push_str(text);
    out.push('\n');
}

/// Case- and accent-aware name collation.
///
/// Names compare with accents and case folded away first, so `élan` sits
/// between `e` and `f`. Ties go to the unaccented spelling, then to the
/// lowercase form at the first letter differing only in case, and the raw
/// bytes decide anything left.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| lowercased(a).cmp(lowercased(b)))
        .then_with(|| lowercase_first(a, b))
        .then_with(|| a.cmp(b))
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn lowercased(name: &str) -> impl Iterator<Item = char> + '_ {
    name.chars().flat_map(char::to_lowercase)
}

fn lowercase_first(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}
