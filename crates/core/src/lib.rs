#![deny(missing_docs)]
//! mdview core: container directives, code-block metadata, and the document tree.

/// Code fence tracking used while scanning for directives.
pub mod code_fence;
/// Code block language and title resolution.
pub mod code_title;
/// Container directive vocabulary (icons, default titles).
pub mod container;
/// Directive normalization into segments.
pub mod directives;
/// Core error and diagnostic types.
pub mod error;
/// Parser pipeline and extension hooks.
pub mod parse;
/// Document tree.
pub mod tree;

pub use error::{MdviewError, ParseDiagnostics, ParseWarning, RecoverableError, SourceLocation};
pub use parse::{
    AstTransform, ParseOptions, ParsedDocument, ParserPipeline, TextTransform,
    group_adjacent_code_blocks, normalize_line_endings, parse_document, parse_mdast_with_options,
};

pub use code_fence::{FencePhase, FenceState, FenceTracker, LineParseOutcome, advance_fence_state};
pub use code_title::{CodeBlock, FALLBACK_LANGUAGE, language_from_class, resolve_title};
pub use container::{ContainerDirective, ContainerKind};
pub use directives::{
    ContainerBlock, DirectiveOpening, MarkdownSegment, Segment, is_directive_closer,
    parse_opening_directive, split_directives,
};
pub use tree::{Align, Node, NodeKind};
