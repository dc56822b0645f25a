//! Document parsing: directive normalization, markdown-rs, and tree building.

use crate::container::{ContainerDirective, ContainerKind};
use crate::directives::{Segment, split_directives};
use crate::error::{MdviewError, ParseDiagnostics, RecoverableError, SourceLocation};
use crate::tree::{Definitions, Node, NodeKind, convert_children};
use markdown::mdast;
use markdown::message::{Message, Place};
use std::borrow::Cow;

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs (tables, task lists, strikethrough, autolinks).
    pub gfm: bool,
    /// Keep raw HTML as nodes; the sanitizer decides what survives.
    pub raw_html: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
    /// Recognize `:::name` container directives.
    pub directives: bool,
    /// Wrap runs of two or more adjacent code blocks into a code group.
    pub group_adjacent_code: bool,
}

impl ParseOptions {
    /// Defaults for authored documents.
    pub const fn standard() -> Self {
        Self {
            gfm: true,
            raw_html: true,
            code_indented: true,
            directives: true,
            group_adjacent_code: false,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Trait for preprocessing raw markdown text before parsing.
pub trait TextTransform {
    /// Transform the input markdown text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Trait for mutating the document tree after parsing.
pub trait AstTransform {
    /// Mutate the tree in place.
    fn transform(&self, root: &mut Node);
}

impl<F> AstTransform for F
where
    F: Fn(&mut Node),
{
    fn transform(&self, root: &mut Node) {
        (self)(root)
    }
}

/// Parse result: the tree plus non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Root node (`NodeKind::Root`).
    pub root: Node,
    /// Warnings and recovered errors.
    pub diagnostics: ParseDiagnostics,
}

/// Configurable parsing pipeline with optional transforms.
pub struct ParserPipeline {
    options: ParseOptions,
    markdown: markdown::ParseOptions,
    text_transforms: Vec<Box<dyn TextTransform>>,
    ast_transforms: Vec<Box<dyn AstTransform>>,
}

impl ParserPipeline {
    /// Create a pipeline without transforms.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            markdown: options.to_markdown(),
            text_transforms: Vec::new(),
            ast_transforms: Vec::new(),
        }
    }

    /// Pipeline with line-ending normalization and, when enabled, code grouping.
    pub fn standard(options: ParseOptions) -> Self {
        let mut pipeline = Self::new(options);
        pipeline.add_text_transform(normalize_line_endings);
        if options.group_adjacent_code {
            pipeline.add_ast_transform(group_adjacent_code_blocks);
        }
        pipeline
    }

    /// Add a text preprocessor transform.
    pub fn add_text_transform<T: TextTransform + 'static>(&mut self, transform: T) {
        self.text_transforms.push(Box::new(transform));
    }

    /// Add a tree transform.
    pub fn add_ast_transform<T: AstTransform + 'static>(&mut self, transform: T) {
        self.ast_transforms.push(Box::new(transform));
    }

    /// Parse a document into a tree using the configured pipeline.
    pub fn parse(&self, input: &str) -> Result<ParsedDocument, MdviewError> {
        let mut current = Cow::Borrowed(input);
        for transform in &self.text_transforms {
            let next = transform.transform(current.as_ref());
            current = Cow::Owned(next.into_owned());
        }

        let mut diagnostics = ParseDiagnostics::new();
        let segments = if self.options.directives {
            split_directives(&current, &mut diagnostics)
        } else {
            vec![Segment::Markdown(crate::directives::MarkdownSegment {
                text: current.to_string(),
                first_line: 1,
            })]
        };

        let parsed = self.parse_segments(segments, &mut diagnostics)?;

        let mut definitions = Definitions::default();
        for part in &parsed {
            part.collect_definitions(&mut definitions);
        }

        let children = parsed
            .into_iter()
            .flat_map(|part| part.into_nodes(&definitions))
            .collect();
        let mut root = Node::with_children(NodeKind::Root, children);

        for transform in &self.ast_transforms {
            transform.transform(&mut root);
        }

        Ok(ParsedDocument { root, diagnostics })
    }

    fn parse_segments(
        &self,
        segments: Vec<Segment>,
        diagnostics: &mut ParseDiagnostics,
    ) -> Result<Vec<Parsed>, MdviewError> {
        let mut parsed = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Markdown(md) => {
                    match parse_mdast_with_options(&md.text, &self.markdown) {
                        Ok(tree) => parsed.push(Parsed::Markdown(tree)),
                        Err(MdviewError::Parse { message, location }) => {
                            diagnostics.add_error(RecoverableError::new(
                                message,
                                location.offset_lines(md.first_line - 1),
                            ));
                            parsed.push(Parsed::Literal(md.text));
                        }
                        Err(other) => return Err(other),
                    }
                }
                Segment::Container(block) => {
                    let children = if block.directive.kind.has_raw_body() {
                        Vec::new()
                    } else {
                        self.parse_segments(block.children, diagnostics)?
                    };
                    parsed.push(Parsed::Container {
                        directive: block.directive,
                        children,
                        raw_body: block.raw_body,
                    });
                }
            }
        }
        Ok(parsed)
    }
}

/// Intermediate form: mdast per markdown segment, kept until all
/// definitions are known.
enum Parsed {
    Markdown(mdast::Node),
    Literal(String),
    Container {
        directive: ContainerDirective,
        children: Vec<Parsed>,
        raw_body: String,
    },
}

impl Parsed {
    fn collect_definitions(&self, definitions: &mut Definitions) {
        match self {
            Parsed::Markdown(tree) => definitions.collect(tree),
            Parsed::Literal(_) => {}
            Parsed::Container { children, .. } => {
                for child in children {
                    child.collect_definitions(definitions);
                }
            }
        }
    }

    fn into_nodes(self, definitions: &Definitions) -> Vec<Node> {
        match self {
            Parsed::Markdown(tree) => tree
                .children()
                .map(|children| convert_children(children, definitions))
                .unwrap_or_default(),
            Parsed::Literal(text) => vec![Node::with_children(
                NodeKind::Paragraph,
                vec![Node::text(text.trim_end())],
            )],
            Parsed::Container {
                mut directive,
                children,
                raw_body,
            } => {
                let attributes = std::mem::take(&mut directive.attributes);
                let children = if directive.kind.has_raw_body() {
                    vec![Node::new(NodeKind::RawHtml { value: raw_body })]
                } else {
                    children
                        .into_iter()
                        .flat_map(|child| child.into_nodes(definitions))
                        .collect()
                };
                let mut node = Node::with_children(NodeKind::ContainerDirective(directive), children);
                node.attributes = attributes;
                vec![node]
            }
        }
    }
}

/// Parse a document with the standard pipeline for `options`.
pub fn parse_document(input: &str, options: &ParseOptions) -> Result<ParsedDocument, MdviewError> {
    ParserPipeline::standard(*options).parse(input)
}

/// Normalize `\r\n` and lone `\r` to `\n`.
pub fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }
    Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Wrap runs of two or more adjacent code blocks into `code-group` containers.
///
/// Recurses into containers other than existing code groups.
pub fn group_adjacent_code_blocks(root: &mut Node) {
    let children = std::mem::take(&mut root.children);
    let mut grouped = Vec::with_capacity(children.len());
    let mut run: Vec<Node> = Vec::new();

    for mut child in children {
        if child.is_code_block() {
            run.push(child);
            continue;
        }
        flush_code_run(&mut run, &mut grouped);
        if let NodeKind::ContainerDirective(directive) = &child.kind
            && directive.kind != ContainerKind::CodeGroup
        {
            group_adjacent_code_blocks(&mut child);
        }
        grouped.push(child);
    }
    flush_code_run(&mut run, &mut grouped);

    root.children = grouped;
}

fn flush_code_run(run: &mut Vec<Node>, output: &mut Vec<Node>) {
    if run.len() >= 2 {
        let group = ContainerDirective::new("code-group", None);
        output.push(Node::with_children(
            NodeKind::ContainerDirective(group),
            std::mem::take(run),
        ));
    } else {
        output.append(run);
    }
}

/// Parse markdown into an mdast tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<mdast::Node, MdviewError> {
    markdown::to_mdast(input, options).map_err(|err| MdviewError::Parse {
        message: err.to_string(),
        location: message_location(&err),
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}
