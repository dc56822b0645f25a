//! Default allow-lists.
//!
//! [`base_schema`] is a conservative list for user-authored HTML. The
//! [`standard_schema`] extends it with the classes and data attributes the
//! renderer emits (containers, static code blocks, code groups) and with
//! embedded frames.

use super::types::SanitizationSchema;
use mdview_core::MdviewError;
use once_cell::sync::Lazy;

/// Process-wide standard schema, built on first use.
pub static STANDARD_SCHEMA: Lazy<SanitizationSchema> = Lazy::new(standard_schema);

const BASE_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "code", "dd", "del", "details", "div", "dl",
    "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img",
    "input", "ins", "kbd", "li", "mark", "ol", "p", "pre", "q", "rp", "rt", "ruby", "s", "samp",
    "small", "span", "strike", "strong", "sub", "summary", "sup", "table", "tbody", "td", "tfoot",
    "th", "thead", "tr", "tt", "u", "ul", "var",
];

const BASE_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "hreflang"]),
    ("blockquote", &["cite"]),
    ("del", &["cite", "datetime"]),
    ("details", &["open"]),
    ("img", &["src", "alt", "width", "height"]),
    ("input", &["type", "checked", "disabled"]),
    ("ins", &["cite", "datetime"]),
    ("li", &["value"]),
    ("ol", &["start", "reversed"]),
    ("q", &["cite"]),
    ("td", &["align", "colspan", "rowspan"]),
    ("th", &["align", "colspan", "rowspan", "scope"]),
];

const BASE_GENERIC_ATTRIBUTES: &[&str] = &["title", "lang"];

const BASE_URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Tags the renderer decorates with a class.
const CLASSED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "li", "table", "blockquote", "a", "hr",
    "img", "details", "summary",
];

const IFRAME_ATTRIBUTES: &[&str] = &[
    "src",
    "width",
    "height",
    "frameborder",
    "allowfullscreen",
    "loading",
    "title",
    "class",
];

impl SanitizationSchema {
    /// Conservative allow-list; see [`base_schema`].
    pub fn base() -> Self {
        base_schema()
    }

    /// Allow-list for rendered documents; see [`standard_schema`].
    pub fn standard() -> Self {
        standard_schema()
    }
}

/// Conservative allow-list for authored HTML.
pub fn base_schema() -> SanitizationSchema {
    let mut schema = SanitizationSchema::empty();
    if let Err(err) = populate_base(&mut schema) {
        log::error!("Base sanitization schema is incomplete: {}", err);
    }
    schema
}

fn populate_base(schema: &mut SanitizationSchema) -> Result<(), MdviewError> {
    for tag in BASE_TAGS {
        schema.allow_tag(tag)?;
    }
    for (tag, attributes) in BASE_ATTRIBUTES {
        schema.allow_attributes(tag, attributes.iter().copied())?;
    }
    for attribute in BASE_GENERIC_ATTRIBUTES {
        schema.allow_generic_attribute(attribute)?;
    }
    for scheme in BASE_URL_SCHEMES {
        schema.allow_url_scheme(scheme)?;
    }
    Ok(())
}

/// Base schema plus everything the renderer emits.
pub fn standard_schema() -> SanitizationSchema {
    let mut schema = base_schema();
    if let Err(err) = populate_standard(&mut schema) {
        log::error!("Standard sanitization schema is incomplete: {}", err);
    }
    schema
}

fn populate_standard(schema: &mut SanitizationSchema) -> Result<(), MdviewError> {
    schema.allow_attributes("div", ["class", "data-language", "data-title", "data-directive"])?;
    schema.allow_attributes("pre", ["class", "data-language", "data-title"])?;
    schema.allow_attributes("code", ["class", "data-language", "data-title"])?;
    schema.allow_attributes("span", ["class", "data-language", "data-title"])?;
    for tag in CLASSED_TAGS {
        schema.allow_attributes(tag, ["class"])?;
    }
    schema.allow_attributes("img", ["loading"])?;
    schema.allow_attributes("iframe", IFRAME_ATTRIBUTES.iter().copied())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_schema_is_conservative() {
        let schema = base_schema();
        assert!(schema.is_tag_allowed("p"));
        assert!(schema.is_tag_allowed("details"));
        assert!(!schema.is_tag_allowed("iframe"));
        assert!(!schema.is_tag_allowed("script"));
        assert!(!schema.is_attribute_allowed("div", "class"));
        assert!(schema.is_attribute_allowed("a", "href"));
        assert!(schema.is_attribute_allowed("em", "title"));
    }

    #[test]
    fn default_tables_populate_without_errors() {
        let mut schema = SanitizationSchema::empty();
        populate_base(&mut schema).unwrap();
        populate_standard(&mut schema).unwrap();
        assert_eq!(schema, standard_schema());
    }

    #[test]
    fn standard_schema_allows_rendered_markup() {
        let schema = &*STANDARD_SCHEMA;
        for (tag, attribute) in [
            ("div", "class"),
            ("div", "data-title"),
            ("pre", "data-language"),
            ("code", "class"),
            ("span", "class"),
            ("h1", "class"),
            ("iframe", "src"),
            ("iframe", "allowfullscreen"),
        ] {
            assert!(
                schema.is_attribute_allowed(tag, attribute),
                "{} {}",
                tag,
                attribute
            );
        }
        assert!(!schema.is_attribute_allowed("div", "style"));
        assert!(schema.is_attribute_allowed("span", "data-title"));
        assert!(schema.is_attribute_allowed("span", "data-language"));
        assert_eq!(
            schema.url_schemes().collect::<Vec<_>>(),
            vec!["http", "https", "mailto", "tel"]
        );
    }
}
