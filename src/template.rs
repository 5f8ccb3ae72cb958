use tera::{Context, Tera};

use crate::error::IndexResult;

pub const INDEX_TEMPLATE_NAME: &str = "index.md";

pub const DEFAULT_INDEX_TEMPLATE: &str =
    "This is an auto-generated index of files in the {{ root }} folder.\n\n{{ outline }}";

/// Build the engine holding the index note template. `custom` replaces the
/// default body when given.
pub fn init_tera(custom: Option<&str>) -> IndexResult<Tera> {
    let mut tera = Tera::default();
    // .md names are outside tera's autoescape set, so outline text is kept raw
    tera.add_raw_template(INDEX_TEMPLATE_NAME, custom.unwrap_or(DEFAULT_INDEX_TEMPLATE))?;
    Ok(tera)
}

pub fn render_index_body(
    tera: &Tera,
    root: &str,
    index_title: &str,
    outline: &str,
) -> IndexResult<String> {
    let mut context = Context::new();
    context.insert("root", root);
    context.insert("index_title", index_title);
    context.insert("outline", outline);
    Ok(tera.render(INDEX_TEMPLATE_NAME, &context)?)
}
