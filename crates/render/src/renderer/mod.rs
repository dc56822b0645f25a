//! Tree-to-HTML renderer.
//!
//! Turns the document tree from `mdview_core` into class-qualified HTML and
//! runs the result through the sanitizer.
//!
//! # Module Structure
//!
//! - `types` - Output and host-style types
//! - `context` - Output buffer and scope stack
//! - `render` - Node rendering functions

mod context;
pub mod render;
mod types;

pub use context::Context;
pub use types::{CodeOutline, DEFAULT_HOST_STYLE, HostStyle, Rendered, Scope};

use crate::sanitize::Sanitizer;
use crate::schema::{STANDARD_SCHEMA, SchemaExtension};
use mdview_core::{MdviewError, Node, ParseOptions, parse_document};
use render::render_node;
use serde::{Deserialize, Serialize};

/// Inline message shown when a document cannot be rendered.
pub const RENDER_ERROR_HTML: &str = "<p class=\"markdown-error\">Markdown 渲染出错</p>";

/// Rendering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// GitHub Flavored Markdown (tables, task lists, strikethrough, autolinks).
    pub gfm: bool,
    /// Emit raw HTML from the document; the sanitizer still filters it.
    #[serde(alias = "allowDangerousHtml")]
    pub allow_raw_html: bool,
    /// Recognize `:::name` container directives.
    #[serde(alias = "directives")]
    pub enable_directives: bool,
    /// Group runs of adjacent code blocks into a code group.
    pub group_adjacent_code: bool,
    /// Add `loading="lazy"` to images.
    #[serde(alias = "lazyImages")]
    pub enable_lazy_images: bool,
    /// Wrapper class and style overrides used by [`render_document`].
    pub host: HostStyle,
    /// Additions to the standard sanitization schema.
    pub schema: Option<SchemaExtension>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            allow_raw_html: true,
            enable_directives: true,
            group_adjacent_code: false,
            enable_lazy_images: true,
            host: HostStyle::default(),
            schema: None,
        }
    }
}

impl RenderOptions {
    /// Parser options matching these render options.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            gfm: self.gfm,
            raw_html: self.allow_raw_html,
            directives: self.enable_directives,
            group_adjacent_code: self.group_adjacent_code,
            ..ParseOptions::standard()
        }
    }
}

/// Renders a tree to unsanitized HTML.
pub fn render_tree(root: &Node, options: &RenderOptions) -> String {
    let mut ctx = Context::new(options);
    render_node(root, &mut ctx);
    ctx.finish()
}

/// Parses, renders and sanitizes a document.
///
/// Fails only on a parser failure outside any recoverable segment or on a
/// rejected schema extension.
///
/// # Examples
///
/// ```
/// use mdview_render::renderer::{RenderOptions, render_markdown};
///
/// let rendered = render_markdown(":::tip\nHello\n:::\n", &RenderOptions::default()).unwrap();
/// assert!(rendered.html.contains("custom-container-tip"));
/// ```
pub fn render_markdown(input: &str, options: &RenderOptions) -> Result<Rendered, MdviewError> {
    let parsed = parse_document(input, &options.parse_options())?;
    let raw = render_tree(&parsed.root, options);

    let html = match &options.schema {
        Some(extension) => {
            let mut schema = STANDARD_SCHEMA.clone();
            schema.extend(extension)?;
            Sanitizer::new(&schema).clean(&raw)
        }
        None => Sanitizer::standard().clean(&raw),
    };

    let code_blocks = parsed
        .root
        .code_blocks()
        .into_iter()
        .enumerate()
        .map(|(index, block)| CodeOutline::of(block, index))
        .collect();

    Ok(Rendered {
        html,
        diagnostics: parsed.diagnostics,
        code_blocks,
    })
}

/// Renders a document inside the host wrapper, never failing.
///
/// Empty input yields an empty string. Any error is logged and replaced by
/// [`RENDER_ERROR_HTML`].
pub fn render_document(input: &str, options: &RenderOptions) -> String {
    if input.trim().is_empty() {
        return String::new();
    }
    let body = match render_markdown(input, options) {
        Ok(rendered) => rendered.html,
        Err(err) => {
            log::error!("Markdown rendering failed: {}", err);
            RENDER_ERROR_HTML.to_string()
        }
    };
    wrap_host(&body, &options.host)
}

/// Wraps `body` in `<div class="markdown-renderer …" style="…">`.
pub fn wrap_host(body: &str, host: &HostStyle) -> String {
    let mut html = String::with_capacity(body.len() + 160);
    html.push_str("<div class=\"");
    html_escape::encode_double_quoted_attribute_to_string(host.class_attr(), &mut html);
    html.push_str("\" style=\"");
    html_escape::encode_double_quoted_attribute_to_string(host.style_attr(), &mut html);
    html.push_str("\">");
    html.push_str(body);
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdview_core::ParseWarning;

    #[test]
    fn options_deserialize_from_camel_case() {
        let options: RenderOptions = serde_json::from_str(
            r#"{"allowDangerousHtml":false,"groupAdjacentCode":true,"host":{"className":"doc"}}"#,
        )
        .unwrap();
        assert!(!options.allow_raw_html);
        assert!(options.group_adjacent_code);
        assert!(options.gfm);
        assert_eq!(options.host.class_name.as_deref(), Some("doc"));
    }

    #[test]
    fn render_markdown_collects_outline_and_diagnostics() {
        let rendered = render_markdown(
            ":::mystery\n```rust\nfn main() {}\n```\n:::\n",
            &RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(
            rendered.code_blocks,
            vec![CodeOutline {
                language: "rust".into(),
                title: "rust".into(),
                lines: 1,
            }]
        );
        assert!(matches!(
            rendered.diagnostics.warnings.as_slice(),
            [ParseWarning::UnknownDirective { name, .. }] if name == "mystery"
        ));
    }

    #[test]
    fn sanitizes_rendered_output() {
        let rendered = render_markdown(
            "<script>alert(1)</script>\n\n<p onclick=\"x()\">hi</p>\n",
            &RenderOptions::default(),
        )
        .unwrap();
        assert!(!rendered.html.contains("script"));
        assert!(!rendered.html.contains("onclick"));
        assert!(rendered.html.contains("hi"));
    }

    #[test]
    fn rejected_schema_extension_is_an_error() {
        let options = RenderOptions {
            schema: Some(SchemaExtension {
                tags: vec!["script".into()],
                ..SchemaExtension::default()
            }),
            ..RenderOptions::default()
        };
        assert!(matches!(
            render_markdown("hi", &options),
            Err(MdviewError::Schema(_))
        ));
        assert_eq!(render_document("hi", &options), wrap_host(RENDER_ERROR_HTML, &options.host));
    }

    #[test]
    fn document_wrapper() {
        assert_eq!(render_document("  \n", &RenderOptions::default()), "");
        let html = render_document("hi", &RenderOptions::default());
        assert_eq!(
            html,
            r#"<div class="markdown-renderer" style="line-height: 1.8; font-size: 16px; color: #333; background-color: transparent;"><p>hi</p></div>"#
        );
    }
}
