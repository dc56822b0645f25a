use thiserror::Error;

/// 1-indexed position in the markdown source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line
    pub line: usize,
    /// Column
    pub column: usize,
}

impl SourceLocation {
    /// Position at `line`, `column`.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Shift the line by `offset` lines (used when a segment is parsed on its own).
    pub fn offset_lines(mut self, offset: usize) -> Self {
        self.line += offset;
        self
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while rendering a document.
#[derive(Debug, Error)]
pub enum MdviewError {
    /// markdown-rs rejected a segment.
    #[error("Parse error at {location}: {message}")]
    Parse {
        /// Parser message
        message: String,
        /// Where the parser stopped
        location: SourceLocation,
    },
    /// Rejected change to the sanitization allow-list.
    #[error("Schema error: {0}")]
    Schema(String),
    /// The streaming HTML rewriter failed.
    #[error("Rewrite error: {0}")]
    Rewrite(String),
}

impl MdviewError {
    /// Schema error for a forbidden tag, attribute or scheme.
    pub fn forbidden(kind: &str, name: &str) -> Self {
        Self::Schema(format!("{} `{}` cannot be allowed", kind, name))
    }
}

/// Non-fatal warnings that don't prevent rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Code fence opened but never closed
    UnclosedCodeFence {
        /// Source location where the fence started
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
    /// Container directive opened but never closed; rendered as literal text
    UnclosedDirective {
        /// Source location of the opener
        location: SourceLocation,
        /// Directive name
        name: String,
    },
    /// A `:::` closer with no open container; rendered as literal text
    StrayCloser {
        /// Source location of the closer
        location: SourceLocation,
    },
    /// Directive name outside the known vocabulary; rendered as a plain container
    UnknownDirective {
        /// Source location of the opener
        location: SourceLocation,
        /// Directive name
        name: String,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedCodeFence { location, .. }
            | ParseWarning::UnclosedDirective { location, .. }
            | ParseWarning::StrayCloser { location }
            | ParseWarning::UnknownDirective { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedCodeFence { location, marker } => {
                write!(f, "Unclosed code fence ({}) at {}", marker, location)
            }
            ParseWarning::UnclosedDirective { location, name } => {
                write!(f, "Unclosed directive `{}` at {}", name, location)
            }
            ParseWarning::StrayCloser { location } => {
                write!(f, "Directive closer without opener at {}", location)
            }
            ParseWarning::UnknownDirective { location, name } => {
                write!(f, "Unknown directive `{}` at {}", name, location)
            }
        }
    }
}

/// Recoverable error information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableError {
    /// Error message
    pub message: String,
    /// Source location
    pub location: SourceLocation,
}

impl RecoverableError {
    /// Create a new recoverable error
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl std::fmt::Display for RecoverableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error at {}: {}", self.location, self.message)
    }
}

/// Collection of parse diagnostics (warnings and recoverable errors)
#[derive(Debug, Clone, Default)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
    /// List of recoverable errors
    pub errors: Vec<RecoverableError>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        log::debug!("{}", warning);
        self.warnings.push(warning);
    }

    /// Add a recoverable error to the diagnostics collection
    pub fn add_error(&mut self, error: RecoverableError) {
        log::warn!("{}", error);
        self.errors.push(error);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any diagnostics
    pub fn has_any(&self) -> bool {
        self.has_warnings() || self.has_errors()
    }

    /// Human-readable messages for every diagnostic, warnings first.
    pub fn messages(&self) -> Vec<String> {
        self.warnings
            .iter()
            .map(ToString::to_string)
            .chain(self.errors.iter().map(ToString::to_string))
            .collect()
    }
}
