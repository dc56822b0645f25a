//! Document tree produced by the parser pipeline.
//!
//! The tree is a simplified, owned view of the markdown-rs mdast with two
//! additions: fenced code carries a resolved [`CodeBlock`], and container
//! directives appear as [`NodeKind::ContainerDirective`] nodes.

use std::collections::{BTreeMap, HashMap};

use markdown::mdast;
use serde::Serialize;

use crate::code_title::CodeBlock;
use crate::container::ContainerDirective;

/// Table column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    /// No alignment.
    None,
    /// `:--`
    Left,
    /// `--:`
    Right,
    /// `:-:`
    Center,
}

impl From<&mdast::AlignKind> for Align {
    fn from(kind: &mdast::AlignKind) -> Self {
        match kind {
            mdast::AlignKind::Left => Align::Left,
            mdast::AlignKind::Right => Align::Right,
            mdast::AlignKind::Center => Align::Center,
            mdast::AlignKind::None => Align::None,
        }
    }
}

/// Kind of a tree node and its kind-specific data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    /// Document root.
    Root,
    /// Paragraph.
    Paragraph,
    /// Heading of level 1-6.
    Heading {
        /// Level.
        depth: u8,
    },
    /// Ordered or bullet list.
    List {
        /// Ordered (`1.`) list.
        ordered: bool,
        /// Start number of ordered lists.
        start: Option<u32>,
        /// Loose list (items separated by blank lines).
        spread: bool,
    },
    /// List item; `checked` is set for GFM task items.
    ListItem {
        /// Task state.
        checked: Option<bool>,
    },
    /// Hyperlink.
    Link {
        /// Destination.
        url: String,
        /// Optional title.
        title: Option<String>,
    },
    /// Image.
    Image {
        /// Source.
        url: String,
        /// Alternative text.
        alt: String,
        /// Optional title.
        title: Option<String>,
    },
    /// GFM table; the first row is the header.
    Table {
        /// Column alignments.
        align: Vec<Align>,
    },
    /// Table row.
    TableRow,
    /// Table cell.
    TableCell,
    /// Block quote.
    Blockquote,
    /// Horizontal rule.
    ThematicBreak,
    /// Fenced or indented code.
    CodeBlock(CodeBlock),
    /// Inline code span.
    InlineCode {
        /// Code text.
        value: String,
    },
    /// `:::name` container.
    ContainerDirective(ContainerDirective),
    /// Raw HTML passed through to the sanitizer.
    RawHtml {
        /// HTML source.
        value: String,
    },
    /// Literal text.
    Text {
        /// Text value.
        value: String,
    },
    /// Emphasis (`*a*`).
    Emphasis,
    /// Strong emphasis (`**a**`).
    Strong,
    /// GFM strikethrough (`~~a~~`).
    Delete,
    /// Hard line break.
    Break,
}

/// A node of the document tree. Children are owned, so the tree is acyclic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Kind and kind-specific data.
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Ordered children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Extra attributes (e.g. `class`/`id` from a directive attribute block).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    /// Leaf node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Node with children.
    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            attributes: BTreeMap::new(),
        }
    }

    /// Text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            value: value.into(),
        })
    }

    /// Concatenated text of this subtree (text, inline code and code content).
    pub fn plain_text(&self) -> String {
        let mut buffer = String::new();
        self.collect_text(&mut buffer);
        buffer
    }

    fn collect_text(&self, buffer: &mut String) {
        match &self.kind {
            NodeKind::Text { value } | NodeKind::InlineCode { value } => buffer.push_str(value),
            NodeKind::CodeBlock(code) => buffer.push_str(&code.content),
            NodeKind::Image { alt, .. } => buffer.push_str(alt),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(buffer);
        }
    }

    /// Pre-order traversal.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// All code blocks in document order.
    pub fn code_blocks(&self) -> Vec<&CodeBlock> {
        let mut blocks = Vec::new();
        self.walk(&mut |node| {
            if let NodeKind::CodeBlock(code) = &node.kind {
                blocks.push(code);
            }
        });
        blocks
    }

    /// Whether this node is a code block.
    pub fn is_code_block(&self) -> bool {
        matches!(self.kind, NodeKind::CodeBlock(_))
    }
}

/// Link and image definitions keyed by normalized identifier.
#[derive(Debug, Default)]
pub(crate) struct Definitions {
    entries: HashMap<String, (String, Option<String>)>,
}

impl Definitions {
    /// Collect every definition in `node`.
    pub(crate) fn collect(&mut self, node: &mdast::Node) {
        if let mdast::Node::Definition(def) = node {
            // First definition wins, as in CommonMark.
            self.entries
                .entry(def.identifier.clone())
                .or_insert_with(|| (def.url.clone(), def.title.clone()));
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect(child);
            }
        }
    }

    fn get(&self, identifier: &str) -> Option<&(String, Option<String>)> {
        self.entries.get(identifier)
    }
}

/// Convert the children of an mdast node.
pub(crate) fn convert_children(children: &[mdast::Node], defs: &Definitions) -> Vec<Node> {
    children
        .iter()
        .filter_map(|child| convert_node(child, defs))
        .collect()
}

/// Convert a single mdast node; definitions and unsupported nodes yield `None`.
pub(crate) fn convert_node(node: &mdast::Node, defs: &Definitions) -> Option<Node> {
    let converted = match node {
        mdast::Node::Root(root) => {
            Node::with_children(NodeKind::Root, convert_children(&root.children, defs))
        }
        mdast::Node::Paragraph(p) => {
            Node::with_children(NodeKind::Paragraph, convert_children(&p.children, defs))
        }
        mdast::Node::Heading(h) => Node::with_children(
            NodeKind::Heading { depth: h.depth },
            convert_children(&h.children, defs),
        ),
        mdast::Node::List(list) => Node::with_children(
            NodeKind::List {
                ordered: list.ordered,
                start: list.start,
                spread: list.spread,
            },
            convert_children(&list.children, defs),
        ),
        mdast::Node::ListItem(item) => Node::with_children(
            NodeKind::ListItem {
                checked: item.checked,
            },
            convert_children(&item.children, defs),
        ),
        mdast::Node::Blockquote(quote) => {
            Node::with_children(NodeKind::Blockquote, convert_children(&quote.children, defs))
        }
        mdast::Node::ThematicBreak(_) => Node::new(NodeKind::ThematicBreak),
        mdast::Node::Code(code) => Node::new(NodeKind::CodeBlock(CodeBlock::from_fence(
            code.lang.as_deref(),
            code.meta.as_deref(),
            code.value.clone(),
        ))),
        mdast::Node::InlineCode(code) => Node::new(NodeKind::InlineCode {
            value: code.value.clone(),
        }),
        mdast::Node::Html(html) => Node::new(NodeKind::RawHtml {
            value: html.value.clone(),
        }),
        mdast::Node::Text(text) => Node::text(text.value.clone()),
        mdast::Node::Emphasis(em) => {
            Node::with_children(NodeKind::Emphasis, convert_children(&em.children, defs))
        }
        mdast::Node::Strong(strong) => {
            Node::with_children(NodeKind::Strong, convert_children(&strong.children, defs))
        }
        mdast::Node::Delete(del) => {
            Node::with_children(NodeKind::Delete, convert_children(&del.children, defs))
        }
        mdast::Node::Break(_) => Node::new(NodeKind::Break),
        mdast::Node::Link(link) => Node::with_children(
            NodeKind::Link {
                url: link.url.clone(),
                title: link.title.clone(),
            },
            convert_children(&link.children, defs),
        ),
        mdast::Node::Image(image) => Node::new(NodeKind::Image {
            url: image.url.clone(),
            alt: image.alt.clone(),
            title: image.title.clone(),
        }),
        mdast::Node::LinkReference(reference) => {
            let children = convert_children(&reference.children, defs);
            match defs.get(&reference.identifier) {
                Some((url, title)) => Node::with_children(
                    NodeKind::Link {
                        url: url.clone(),
                        title: title.clone(),
                    },
                    children,
                ),
                None => {
                    let label: String = children.iter().map(Node::plain_text).collect();
                    Node::text(format!("[{}]", label))
                }
            }
        }
        mdast::Node::ImageReference(reference) => match defs.get(&reference.identifier) {
            Some((url, title)) => Node::new(NodeKind::Image {
                url: url.clone(),
                alt: reference.alt.clone(),
                title: title.clone(),
            }),
            None => Node::text(reference.alt.clone()),
        },
        mdast::Node::Table(table) => Node::with_children(
            NodeKind::Table {
                align: table.align.iter().map(Align::from).collect(),
            },
            convert_children(&table.children, defs),
        ),
        mdast::Node::TableRow(row) => {
            Node::with_children(NodeKind::TableRow, convert_children(&row.children, defs))
        }
        mdast::Node::TableCell(cell) => {
            Node::with_children(NodeKind::TableCell, convert_children(&cell.children, defs))
        }
        mdast::Node::Definition(_) => return None,
        other => {
            log::warn!("Unhandled markdown node type: {:?}", other);
            return None;
        }
    };
    Some(converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(input: &str) -> Node {
        let options = markdown::ParseOptions::gfm();
        let mdast = markdown::to_mdast(input, &options).unwrap();
        let mut defs = Definitions::default();
        defs.collect(&mdast);
        convert_node(&mdast, &defs).unwrap()
    }

    #[test]
    fn converts_fenced_code() {
        let root = convert("```rust title=\"main.rs\"\nfn main() {}\n```\n");
        let blocks = root.code_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "rust");
        assert_eq!(blocks[0].content, "fn main() {}");
        assert_eq!(blocks[0].title.as_deref(), Some("main.rs"));
    }

    #[test]
    fn fence_without_language_is_text() {
        let root = convert("```\nplain\n\n```\n");
        let blocks = root.code_blocks();
        assert_eq!(blocks[0].language, "text");
        assert_eq!(blocks[0].content, "plain\n");
    }

    #[test]
    fn resolves_reference_links() {
        let root = convert("See [docs][d].\n\n[d]: https://example.com \"Docs\"\n");
        assert_eq!(root.children.len(), 1);
        let paragraph = &root.children[0];
        let link = paragraph
            .children
            .iter()
            .find(|n| matches!(n.kind, NodeKind::Link { .. }))
            .unwrap();
        assert_eq!(
            link.kind,
            NodeKind::Link {
                url: "https://example.com".into(),
                title: Some("Docs".into()),
            }
        );
        assert_eq!(link.plain_text(), "docs");
    }

    #[test]
    fn converts_gfm_constructs() {
        let root = convert("- [x] done\n- [ ] todo\n\n| a | b |\n|:--|--:|\n| 1 | 2 |\n\n~~old~~\n");
        assert!(matches!(
            root.children[0].kind,
            NodeKind::List { ordered: false, .. }
        ));
        assert_eq!(
            root.children[0].children[0].kind,
            NodeKind::ListItem { checked: Some(true) }
        );
        assert_eq!(
            root.children[1].kind,
            NodeKind::Table {
                align: vec![Align::Left, Align::Right]
            }
        );
        assert_eq!(root.children[1].children.len(), 2);
        assert_eq!(root.children[2].children[0].kind, NodeKind::Delete);
    }

    #[test]
    fn serializes_with_type_tag() {
        let node = Node::with_children(NodeKind::Heading { depth: 2 }, vec![Node::text("Hi")]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["depth"], 2);
        assert_eq!(json["children"][0]["value"], "Hi");
        assert!(json.get("attributes").is_none());
    }
}
