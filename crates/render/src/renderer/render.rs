//! Rendering functions for the HTML renderer.

use super::context::Context;
use super::types::Scope;
use mdview_core::{Align, CodeBlock, ContainerDirective, ContainerKind, Node, NodeKind};

const IFRAME_DEFAULT_WIDTH: &str = "100%";
const IFRAME_DEFAULT_HEIGHT: &str = "400";

/// Renders a node and its subtree.
pub fn render_node(node: &Node, ctx: &mut Context) {
    match &node.kind {
        NodeKind::Root => render_children(node, ctx),
        NodeKind::Paragraph => render_paragraph(node, ctx),
        NodeKind::Heading { depth } => render_heading(*depth, node, ctx),
        NodeKind::List {
            ordered,
            start,
            spread,
        } => render_list(*ordered, *start, *spread, node, ctx),
        NodeKind::ListItem { checked } => render_list_item(*checked, node, ctx),
        NodeKind::Blockquote => {
            ctx.push_raw("<blockquote class=\"markdown-blockquote\">");
            render_children(node, ctx);
            ctx.push_raw("</blockquote>");
        }
        NodeKind::ThematicBreak => ctx.push_raw("<hr class=\"markdown-divider\">"),
        NodeKind::Table { align } => render_table(align, node, ctx),
        // Rows and cells are rendered by `render_table`; stray ones render their content.
        NodeKind::TableRow | NodeKind::TableCell => render_children(node, ctx),
        NodeKind::CodeBlock(code) => render_code_block(code, ctx),
        NodeKind::InlineCode { value } => {
            ctx.push_raw("<code class=\"markdown-inline-code\">");
            ctx.push_text(value);
            ctx.push_raw("</code>");
        }
        NodeKind::ContainerDirective(directive) => render_container(directive, node, ctx),
        NodeKind::RawHtml { value } => {
            if ctx.raw_html_allowed() {
                ctx.push_raw(value);
            } else {
                ctx.push_text(value);
            }
        }
        NodeKind::Text { value } => ctx.push_text(value),
        NodeKind::Emphasis => wrap("em", node, ctx),
        NodeKind::Strong => wrap("strong", node, ctx),
        NodeKind::Delete => wrap("del", node, ctx),
        NodeKind::Break => ctx.push_raw("<br>"),
        NodeKind::Link { url, title } => {
            ctx.push_raw("<a class=\"markdown-link\"");
            ctx.push_attr("href", url);
            ctx.push_opt_attr("title", title.as_deref());
            ctx.push_raw(">");
            render_children(node, ctx);
            ctx.push_raw("</a>");
        }
        NodeKind::Image { url, alt, title } => render_image(url, alt, title.as_deref(), ctx),
    }
}

fn render_children(node: &Node, ctx: &mut Context) {
    for child in &node.children {
        render_node(child, ctx);
    }
}

fn wrap(tag: &str, node: &Node, ctx: &mut Context) {
    ctx.push_raw(&format!("<{}>", tag));
    render_children(node, ctx);
    ctx.push_raw(&format!("</{}>", tag));
}

fn render_paragraph(node: &Node, ctx: &mut Context) {
    if let [only] = node.children.as_slice()
        && matches!(only.kind, NodeKind::Image { .. })
    {
        ctx.push_raw("<div class=\"markdown-image\">");
        render_node(only, ctx);
        ctx.push_raw("</div>");
        return;
    }

    if ctx.is_in_tight_list() {
        render_children(node, ctx);
        return;
    }

    ctx.push_raw("<p>");
    ctx.enter(Scope::Paragraph);
    render_children(node, ctx);
    ctx.exit();
    ctx.push_raw("</p>");
}

fn render_heading(depth: u8, node: &Node, ctx: &mut Context) {
    let depth = depth.clamp(1, 6);
    if depth == 1 {
        ctx.push_raw("<h1 class=\"markdown-heading markdown-heading-primary\">");
        render_children(node, ctx);
        ctx.push_raw("<span class=\"markdown-heading-decoration\"></span></h1>");
    } else {
        ctx.push_raw(&format!("<h{} class=\"markdown-heading\">", depth));
        render_children(node, ctx);
        ctx.push_raw(&format!("</h{}>", depth));
    }
}

fn render_list(ordered: bool, start: Option<u32>, spread: bool, node: &Node, ctx: &mut Context) {
    let tag = if ordered { "ol" } else { "ul" };
    ctx.push_raw(&format!("<{} class=\"markdown-list\"", tag));
    if ordered && let Some(start) = start.filter(|start| *start != 1) {
        ctx.push_attr("start", &start.to_string());
    }
    ctx.push_raw(">");
    ctx.enter(Scope::List { spread });
    render_children(node, ctx);
    ctx.exit();
    ctx.push_raw(&format!("</{}>", tag));
}

fn render_list_item(checked: Option<bool>, node: &Node, ctx: &mut Context) {
    match checked {
        Some(checked) => {
            ctx.push_raw("<li class=\"markdown-list-item task-list-item\">");
            ctx.push_raw("<input type=\"checkbox\" disabled=\"\"");
            if checked {
                ctx.push_raw(" checked=\"\"");
            }
            ctx.push_raw("> ");
        }
        None => ctx.push_raw("<li class=\"markdown-list-item\">"),
    }
    ctx.enter(Scope::ListItem);
    render_children(node, ctx);
    ctx.exit();
    ctx.push_raw("</li>");
}

fn render_table(align: &[Align], node: &Node, ctx: &mut Context) {
    ctx.push_raw("<div class=\"markdown-table-wrapper\"><table class=\"markdown-table\">");
    ctx.enter(Scope::Table);

    let mut rows = node.children.iter();
    if let Some(head) = rows.next() {
        ctx.push_raw("<thead>");
        ctx.enter(Scope::TableHead);
        render_table_row(head, align, ctx);
        ctx.exit();
        ctx.push_raw("</thead>");
    }

    let body: Vec<&Node> = rows.collect();
    if !body.is_empty() {
        ctx.push_raw("<tbody>");
        for row in body {
            render_table_row(row, align, ctx);
        }
        ctx.push_raw("</tbody>");
    }

    ctx.exit();
    ctx.push_raw("</table></div>");
}

fn render_table_row(row: &Node, align: &[Align], ctx: &mut Context) {
    let tag = if ctx.is_in_table_head() { "th" } else { "td" };
    ctx.push_raw("<tr>");
    for (i, cell) in row.children.iter().enumerate() {
        ctx.push_raw(&format!("<{}", tag));
        let alignment = match align.get(i) {
            Some(Align::Left) => Some("left"),
            Some(Align::Right) => Some("right"),
            Some(Align::Center) => Some("center"),
            Some(Align::None) | None => None,
        };
        ctx.push_opt_attr("align", alignment);
        ctx.push_raw(">");
        ctx.enter(Scope::TableCell);
        render_children(cell, ctx);
        ctx.exit();
        ctx.push_raw(&format!("</{}>", tag));
    }
    ctx.push_raw("</tr>");
}

fn render_image(url: &str, alt: &str, title: Option<&str>, ctx: &mut Context) {
    ctx.push_raw("<img");
    ctx.push_attr("src", url);
    ctx.push_attr("alt", alt);
    ctx.push_opt_attr("title", title);
    if ctx.lazy_images_enabled() {
        ctx.push_attr("loading", "lazy");
    }
    ctx.push_raw(">");
}

/// Static form of a code block; the hydration pass upgrades it to a widget.
fn render_code_block(code: &CodeBlock, ctx: &mut Context) {
    ctx.push_raw("<pre class=\"code-block-static\"");
    ctx.push_attr("data-language", &code.language);
    ctx.push_raw("><code");
    ctx.push_attr("class", &format!("language-{}", code.language));
    ctx.push_attr("data-language", &code.language);
    ctx.push_opt_attr("data-title", code.title.as_deref());
    ctx.push_raw(">");
    ctx.push_text(&code.content);
    ctx.push_raw("</code></pre>");
}

fn container_class(directive: &ContainerDirective, node: &Node) -> String {
    let mut class = format!(
        "custom-container custom-container-{}",
        directive.kind.class_suffix()
    );
    if let Some(extra) = node.attributes.get("class") {
        class.push(' ');
        class.push_str(extra);
    }
    class
}

fn render_container(directive: &ContainerDirective, node: &Node, ctx: &mut Context) {
    match directive.kind {
        ContainerKind::Iframe => render_iframe(directive, node, ctx),
        ContainerKind::Details => render_details(directive, node, ctx),
        ContainerKind::CodeGroup => {
            ctx.push_raw("<div class=\"code-group\"");
            ctx.push_opt_attr("data-title", directive.title.as_deref());
            ctx.push_raw(">");
            ctx.enter(Scope::Container);
            render_children(node, ctx);
            ctx.exit();
            ctx.push_raw("</div>");
        }
        ContainerKind::Generic => {
            ctx.push_raw("<div");
            ctx.push_attr("class", &container_class(directive, node));
            ctx.push_attr("data-directive", &directive.name);
            ctx.push_opt_attr("data-title", directive.title.as_deref());
            ctx.push_raw(">");
            if let Some(title) = &directive.title {
                ctx.push_raw("<div class=\"custom-container-title\">");
                ctx.push_text(title);
                ctx.push_raw("</div>");
            }
            render_container_content(node, ctx);
            ctx.push_raw("</div>");
        }
        _ => {
            ctx.push_raw("<div");
            ctx.push_attr("class", &container_class(directive, node));
            ctx.push_opt_attr("data-title", directive.resolved_title().as_deref());
            ctx.push_raw(">");
            if let Some(header) = directive.header_text() {
                ctx.push_raw("<div class=\"custom-container-title\">");
                ctx.push_text(&header);
                ctx.push_raw("</div>");
            }
            render_container_content(node, ctx);
            ctx.push_raw("</div>");
        }
    }
}

fn render_container_content(node: &Node, ctx: &mut Context) {
    ctx.push_raw("<div class=\"custom-container-content\">");
    ctx.enter(Scope::Container);
    render_children(node, ctx);
    ctx.exit();
    ctx.push_raw("</div>");
}

fn render_details(directive: &ContainerDirective, node: &Node, ctx: &mut Context) {
    ctx.push_raw("<details");
    ctx.push_attr("class", &container_class(directive, node));
    if node.attributes.contains_key("open") {
        ctx.push_raw(" open=\"\"");
    }
    ctx.push_raw("><summary class=\"custom-container-title\">");
    ctx.push_text(&directive.resolved_title().unwrap_or_default());
    ctx.push_raw("</summary>");
    render_container_content(node, ctx);
    ctx.push_raw("</details>");
}

/// The body is either iframe markup, passed through for the sanitizer, or a
/// URL on its first non-blank line.
fn render_iframe(directive: &ContainerDirective, node: &Node, ctx: &mut Context) {
    let body: String = node
        .children
        .iter()
        .map(|child| match &child.kind {
            NodeKind::RawHtml { value } => value.clone(),
            _ => child.plain_text(),
        })
        .collect();
    let body = body.trim();

    ctx.push_raw("<div");
    ctx.push_attr("class", &container_class(directive, node));
    ctx.push_raw(">");

    if body.starts_with("<iframe") {
        ctx.push_raw(body);
    } else if let Some(url) = body.lines().map(str::trim).find(|line| !line.is_empty()) {
        let attribute = |name: &str| node.attributes.get(name).map(String::as_str);
        ctx.push_raw("<iframe");
        ctx.push_attr("src", url);
        ctx.push_attr("width", attribute("width").unwrap_or(IFRAME_DEFAULT_WIDTH));
        ctx.push_attr("height", attribute("height").unwrap_or(IFRAME_DEFAULT_HEIGHT));
        ctx.push_raw(" frameborder=\"0\" allowfullscreen=\"\" loading=\"lazy\"");
        ctx.push_opt_attr("title", directive.title.as_deref());
        ctx.push_raw("></iframe>");
    } else {
        log::debug!("Empty iframe directive");
    }

    ctx.push_raw("</div>");
}
