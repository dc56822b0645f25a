//! Container directive normalization.
//!
//! Splits a document into markdown segments and `:::name` container blocks
//! before markdown parsing, so the parser never sees directive markers:
//!
//! ```text
//! :::tip [Title]
//! Content here
//! :::
//! ```
//!
//! Openers and closers are recognized only at column 0 and never inside fenced
//! code. Containers nest; a closer always closes the innermost open container.
//! Malformed openers, stray closers and unclosed containers degrade to literal
//! text and are reported through [`ParseDiagnostics`].

use std::collections::BTreeMap;

use crate::code_fence::FenceTracker;
use crate::container::{ContainerDirective, ContainerKind};
use crate::error::{ParseDiagnostics, ParseWarning, SourceLocation};

/// Parsed representation of a directive opening line (e.g. `:::note [Title] {key="v"}`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveOpening {
    /// Lowercased directive name.
    pub name: String,
    /// Title captured from bracket syntax `[...]`, trimmed; empty brackets yield `None`.
    pub bracket_title: Option<String>,
    /// Attributes from the optional `{...}` block.
    pub attributes: BTreeMap<String, String>,
}

impl DirectiveOpening {
    /// Resolved container kind.
    pub fn kind(&self) -> ContainerKind {
        ContainerKind::from_name(&self.name)
    }

    /// Explicit title: bracket title wins over a `title` attribute.
    pub fn title(&self) -> Option<&str> {
        self.bracket_title
            .as_deref()
            .or_else(|| self.attributes.get("title").map(String::as_str))
            .filter(|t| !t.is_empty())
    }

    /// Convert into the tree-level directive description.
    pub fn into_directive(self) -> ContainerDirective {
        let title = self.title().map(str::to_string);
        let mut directive = ContainerDirective::new(self.name, title);
        directive.attributes = self.attributes;
        directive.attributes.remove("title");
        directive
    }
}

/// Parse an opening directive line like `:::note [Title]`.
///
/// Returns `None` for anything that is not a well-formed opener; such lines
/// stay literal markdown.
pub fn parse_opening_directive(line: &str) -> Option<DirectiveOpening> {
    let line = line.trim_end();
    let after_colons = line.strip_prefix(":::")?;

    let name_len = after_colons
        .char_indices()
        .take_while(|&(i, c)| {
            if i == 0 {
                c.is_ascii_alphabetic()
            } else {
                c.is_ascii_alphanumeric() || c == '-' || c == '_'
            }
        })
        .count();
    if name_len == 0 {
        return None;
    }
    let name = after_colons[..name_len].to_ascii_lowercase();
    let mut rest = after_colons[name_len..].trim_start();

    let mut bracket_title = None;
    if let Some(inner) = rest.strip_prefix('[') {
        let close = inner.find(']')?;
        let title = inner[..close].trim();
        if !title.is_empty() {
            bracket_title = Some(title.to_string());
        }
        rest = inner[close + 1..].trim_start();
    }

    let mut attributes = BTreeMap::new();
    if let Some(inner) = rest.strip_prefix('{') {
        let body = inner.strip_suffix('}')?;
        attributes = parse_attribute_block(body)?;
        rest = "";
    }

    if !rest.is_empty() {
        return None;
    }

    Some(DirectiveOpening {
        name,
        bracket_title,
        attributes,
    })
}

/// Check if a line is a directive closer: exactly `:::`, trailing whitespace allowed.
pub fn is_directive_closer(line: &str) -> bool {
    line.trim_end() == ":::"
}

/// Parse `key="value" key2='v' flag .class #id` into a map.
fn parse_attribute_block(body: &str) -> Option<BTreeMap<String, String>> {
    let mut attributes = BTreeMap::new();
    for token in tokenize_attrs(body) {
        if let Some(class) = token.strip_prefix('.') {
            let entry = attributes.entry("class".to_string()).or_insert_with(String::new);
            if !entry.is_empty() {
                entry.push(' ');
            }
            entry.push_str(class);
            continue;
        }
        if let Some(id) = token.strip_prefix('#') {
            attributes.insert("id".to_string(), id.to_string());
            continue;
        }

        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (key, unquote(value)?),
            None => (token, ""),
        };
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
        {
            return None;
        }
        attributes.insert(key.to_ascii_lowercase(), value.to_string());
    }
    Some(attributes)
}

fn unquote(value: &str) -> Option<&str> {
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote) {
            return inner.strip_suffix(quote);
        }
    }
    Some(value)
}

/// Tokenize attributes respecting quoted values.
/// Splits on whitespace but keeps quoted strings intact.
fn tokenize_attrs(attrs: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut token_start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (i, c) in attrs.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => {
                token_start.get_or_insert(i);
                quote = Some(c);
            }
            None if c.is_whitespace() => {
                if let Some(start) = token_start.take() {
                    tokens.push(&attrs[start..i]);
                }
            }
            None => {
                token_start.get_or_insert(i);
            }
        }
    }

    if let Some(start) = token_start {
        tokens.push(&attrs[start..]);
    }

    tokens
}

/// A run of plain markdown lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSegment {
    /// Verbatim text including line endings.
    pub text: String,
    /// 1-indexed line of the first line in the source document.
    pub first_line: usize,
}

/// A closed container and everything between its opener and closer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerBlock {
    /// The directive parsed from the opener.
    pub directive: ContainerDirective,
    /// 1-indexed line of the opener.
    pub line: usize,
    /// Body split into segments (empty for raw-body containers).
    pub children: Vec<Segment>,
    /// Exact body text between opener and closer.
    pub raw_body: String,
}

/// Output unit of [`split_directives`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain markdown, parsed as-is.
    Markdown(MarkdownSegment),
    /// A container directive.
    Container(ContainerBlock),
}

struct Frame {
    opening: DirectiveOpening,
    opener_text: String,
    line: usize,
    body_start: usize,
    children: Vec<Segment>,
}

impl Frame {
    fn is_raw(&self) -> bool {
        self.opening.kind().has_raw_body()
    }
}

fn push_markdown(target: &mut Vec<Segment>, text: &str, line: usize) {
    if let Some(Segment::Markdown(last)) = target.last_mut() {
        last.text.push_str(text);
        return;
    }
    target.push(Segment::Markdown(MarkdownSegment {
        text: text.to_string(),
        first_line: line,
    }));
}

fn target<'a>(stack: &'a mut [Frame], root: &'a mut Vec<Segment>) -> &'a mut Vec<Segment> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

/// Split `input` into markdown segments and container blocks.
pub fn split_directives(input: &str, diagnostics: &mut ParseDiagnostics) -> Vec<Segment> {
    let mut root: Vec<Segment> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut fence = FenceTracker::new();
    let mut offset = 0usize;

    for (index, raw_line) in input.split_inclusive('\n').enumerate() {
        let line_no = index + 1;
        let line_start = offset;
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(['\n', '\r']);

        // Raw-body containers only end at a closer; nothing inside is interpreted.
        if stack.last().is_some_and(Frame::is_raw) {
            if is_directive_closer(line)
                && let Some(frame) = stack.pop()
            {
                let block = close_frame(frame, &input[..line_start]);
                target(&mut stack, &mut root).push(Segment::Container(block));
            }
            continue;
        }

        if fence.observe(line_no, line) {
            push_markdown(target(&mut stack, &mut root), raw_line, line_no);
            continue;
        }

        if let Some(opening) = parse_opening_directive(line) {
            if !opening.kind().is_known() {
                diagnostics.add_warning(ParseWarning::UnknownDirective {
                    location: SourceLocation::new(line_no, 1),
                    name: opening.name.clone(),
                });
            }
            stack.push(Frame {
                opening,
                opener_text: raw_line.to_string(),
                line: line_no,
                body_start: offset,
                children: Vec::new(),
            });
            continue;
        }

        if is_directive_closer(line) {
            match stack.pop() {
                Some(frame) => {
                    let block = close_frame(frame, &input[..line_start]);
                    target(&mut stack, &mut root).push(Segment::Container(block));
                }
                None => {
                    diagnostics.add_warning(ParseWarning::StrayCloser {
                        location: SourceLocation::new(line_no, 1),
                    });
                    push_markdown(&mut root, raw_line, line_no);
                }
            }
            continue;
        }

        push_markdown(target(&mut stack, &mut root), raw_line, line_no);
    }

    // Unclosed containers become literal text in their parent.
    while let Some(frame) = stack.pop() {
        diagnostics.add_warning(ParseWarning::UnclosedDirective {
            location: SourceLocation::new(frame.line, 1),
            name: frame.opening.name.clone(),
        });
        let raw = frame.is_raw();
        let parent = target(&mut stack, &mut root);
        push_markdown(parent, &frame.opener_text, frame.line);
        if raw {
            push_markdown(parent, &input[frame.body_start..], frame.line + 1);
        }
        for child in frame.children {
            match child {
                Segment::Markdown(md) => push_markdown(parent, &md.text, md.first_line),
                container => parent.push(container),
            }
        }
    }

    fence.finish(diagnostics);
    root
}

fn close_frame(frame: Frame, before_closer: &str) -> ContainerBlock {
    let raw_body = before_closer
        .get(frame.body_start..)
        .unwrap_or_default()
        .to_string();
    ContainerBlock {
        directive: frame.opening.into_directive(),
        line: frame.line,
        children: frame.children,
        raw_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> (Vec<Segment>, ParseDiagnostics) {
        let mut diagnostics = ParseDiagnostics::new();
        let segments = split_directives(input, &mut diagnostics);
        (segments, diagnostics)
    }

    fn container(segment: &Segment) -> &ContainerBlock {
        match segment {
            Segment::Container(block) => block,
            other => panic!("expected container, got {:?}", other),
        }
    }

    fn markdown(segment: &Segment) -> &str {
        match segment {
            Segment::Markdown(md) => &md.text,
            other => panic!("expected markdown, got {:?}", other),
        }
    }

    #[test]
    fn parse_simple_opener() {
        let opening = parse_opening_directive(":::tip").unwrap();
        assert_eq!(opening.name, "tip");
        assert!(opening.bracket_title.is_none());
        assert!(opening.attributes.is_empty());
    }

    #[test]
    fn parse_bracket_title_with_and_without_space() {
        let spaced = parse_opening_directive(":::tip [Note]").unwrap();
        assert_eq!(spaced.bracket_title.as_deref(), Some("Note"));

        let tight = parse_opening_directive(":::Warning[ Heads up ]  ").unwrap();
        assert_eq!(tight.name, "warning");
        assert_eq!(tight.bracket_title.as_deref(), Some("Heads up"));

        let empty = parse_opening_directive(":::info []").unwrap();
        assert_eq!(empty.title(), None);
    }

    #[test]
    fn parse_attribute_block() {
        let opening =
            parse_opening_directive(r#":::note {title="From attr" .wide #intro open}"#).unwrap();
        assert_eq!(opening.title(), Some("From attr"));
        assert_eq!(opening.attributes.get("class").map(String::as_str), Some("wide"));
        assert_eq!(opening.attributes.get("id").map(String::as_str), Some("intro"));
        assert_eq!(opening.attributes.get("open").map(String::as_str), Some(""));

        let directive = opening.into_directive();
        assert_eq!(directive.title.as_deref(), Some("From attr"));
        assert!(!directive.attributes.contains_key("title"));
    }

    #[test]
    fn bracket_title_beats_attribute_title() {
        let opening = parse_opening_directive(r#":::tip [Bracket] {title="attr"}"#).unwrap();
        assert_eq!(opening.title(), Some("Bracket"));
    }

    #[test]
    fn rejects_malformed_openers() {
        assert!(parse_opening_directive(" :::tip").is_none());
        assert!(parse_opening_directive(":::").is_none());
        assert!(parse_opening_directive(":::1tip").is_none());
        assert!(parse_opening_directive(":::tip trailing words").is_none());
        assert!(parse_opening_directive(":::tip [unterminated").is_none());
        assert!(parse_opening_directive(":::tip {unterminated").is_none());
        assert!(parse_opening_directive("::::tip").is_none());
    }

    #[test]
    fn closer_is_exact() {
        assert!(is_directive_closer(":::"));
        assert!(is_directive_closer(":::  "));
        assert!(is_directive_closer(":::\r"));
        assert!(!is_directive_closer(" :::"));
        assert!(!is_directive_closer("::::"));
        assert!(!is_directive_closer(":::tip"));
    }

    #[test]
    fn splits_single_container() {
        let (segments, diagnostics) = split("Intro\n\n:::tip [Note]\nHello\n:::\nOutro\n");
        assert!(!diagnostics.has_any());
        assert_eq!(segments.len(), 3);
        assert_eq!(markdown(&segments[0]), "Intro\n\n");

        let block = container(&segments[1]);
        assert_eq!(block.directive.kind, ContainerKind::Tip);
        assert_eq!(block.directive.title.as_deref(), Some("Note"));
        assert_eq!(block.line, 3);
        assert_eq!(block.raw_body, "Hello\n");
        assert_eq!(block.children.len(), 1);
        assert_eq!(markdown(&block.children[0]), "Hello\n");

        match &segments[2] {
            Segment::Markdown(md) => {
                assert_eq!(md.text, "Outro\n");
                assert_eq!(md.first_line, 6);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nested_containers_close_innermost_first() {
        let input = ":::warning\nouter\n:::tip\ninner\n:::\nafter\n:::\n";
        let (segments, diagnostics) = split(input);
        assert!(!diagnostics.has_any());
        assert_eq!(segments.len(), 1);

        let outer = container(&segments[0]);
        assert_eq!(outer.directive.kind, ContainerKind::Warning);
        assert_eq!(outer.children.len(), 3);
        assert_eq!(markdown(&outer.children[0]), "outer\n");
        assert_eq!(container(&outer.children[1]).directive.kind, ContainerKind::Tip);
        assert_eq!(markdown(&outer.children[2]), "after\n");
        assert_eq!(outer.raw_body, "outer\n:::tip\ninner\n:::\nafter\n");
    }

    #[test]
    fn markers_inside_code_fence_are_literal() {
        let input = "```md\n:::tip\n:::\n```\n";
        let (segments, diagnostics) = split(input);
        assert!(!diagnostics.has_any());
        assert_eq!(segments.len(), 1);
        assert_eq!(markdown(&segments[0]), input);
    }

    #[test]
    fn fenced_code_inside_container_keeps_closer_literal() {
        let input = ":::note\n```\n:::\n```\n:::\n";
        let (segments, _) = split(input);
        let block = container(&segments[0]);
        assert_eq!(markdown(&block.children[0]), "```\n:::\n```\n");
    }

    #[test]
    fn stray_closer_is_literal() {
        let (segments, diagnostics) = split("text\n:::\n");
        assert_eq!(segments.len(), 1);
        assert_eq!(markdown(&segments[0]), "text\n:::\n");
        assert!(matches!(
            diagnostics.warnings.as_slice(),
            [ParseWarning::StrayCloser { location }] if location.line == 2
        ));
    }

    #[test]
    fn unclosed_container_unwinds_to_literal_text() {
        let (segments, diagnostics) = split("before\n:::tip [T]\nbody\n:::note\ninner\n:::\n");
        assert_eq!(segments.len(), 2);
        assert_eq!(markdown(&segments[0]), "before\n:::tip [T]\nbody\n");
        assert_eq!(container(&segments[1]).directive.kind, ContainerKind::Note);
        assert!(matches!(
            diagnostics.warnings.as_slice(),
            [ParseWarning::UnclosedDirective { name, .. }] if name == "tip"
        ));
    }

    #[test]
    fn unknown_directive_is_kept_as_generic() {
        let (segments, diagnostics) = split(":::custom\nX\n:::\n");
        let block = container(&segments[0]);
        assert_eq!(block.directive.kind, ContainerKind::Generic);
        assert_eq!(block.directive.name, "custom");
        assert_eq!(diagnostics.warnings.len(), 1);
    }

    #[test]
    fn iframe_body_is_captured_raw() {
        let input = ":::iframe\nhttps://example.com/embed\n:::tip\n:::\n:::\n";
        let (segments, diagnostics) = split(input);
        assert_eq!(segments.len(), 2);
        let block = container(&segments[0]);
        assert_eq!(block.directive.kind, ContainerKind::Iframe);
        assert!(block.children.is_empty());
        assert_eq!(block.raw_body, "https://example.com/embed\n:::tip\n");
        assert_eq!(markdown(&segments[1]), ":::\n");
        assert_eq!(diagnostics.warnings.len(), 1);
    }

    #[test]
    fn crlf_lines_are_recognized() {
        let (segments, diagnostics) = split(":::info\r\nbody\r\n:::\r\n");
        assert!(!diagnostics.has_any());
        let block = container(&segments[0]);
        assert_eq!(block.raw_body, "body\r\n");
    }

    #[test]
    fn final_closer_without_newline() {
        let (segments, _) = split(":::tip\nHello\n:::");
        assert_eq!(segments.len(), 1);
        assert_eq!(container(&segments[0]).raw_body, "Hello\n");
    }
}
