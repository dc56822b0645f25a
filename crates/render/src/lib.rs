#![deny(missing_docs)]
//! mdview render: HTML output, sanitization and code-block hydration.

/// Copy-button state machine.
pub mod clipboard;
/// Tabbed code groups.
pub mod code_group;
/// Syntax highlighting.
pub mod highlight;
/// Code-block hydration pass.
pub mod hydrate;
/// Tree-to-HTML renderer.
pub mod renderer;
/// HTML sanitizer.
pub mod sanitize;
/// Sanitization allow-list.
pub mod schema;
/// Render ordering guard.
pub mod session;
/// Code-block widget markup.
pub mod widget;

pub use clipboard::{COPY_FEEDBACK_MS, Clipboard, ClipboardError, CopyButton, CopyState};
pub use code_group::{CodeGroup, CodeGroupEntry, CodeTab, build_code_group};
pub use highlight::{ColorScheme, Highlighter};
pub use hydrate::{HydrateOptions, hydrate, try_hydrate};
pub use renderer::{
    CodeOutline, HostStyle, RENDER_ERROR_HTML, RenderOptions, Rendered, render_document,
    render_markdown, render_tree,
};
pub use sanitize::{Sanitizer, sanitize};
pub use schema::{SanitizationSchema, SchemaExtension, base_schema, standard_schema};
pub use session::{RenderSession, RenderTicket};
