//! Fenced code tracking for the directive normalizer.
//!
//! Directive markers inside a fenced code block are literal text. The
//! normalizer feeds every line through [`FenceTracker`] and only looks for
//! `:::` openers and closers while the tracker reports it is outside a fence.

use crate::error::{ParseDiagnostics, ParseWarning, SourceLocation};

/// Fence parsing phases tracked across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FencePhase {
    /// Not currently inside a fence.
    #[default]
    Outside,
    /// Within fence contents.
    InsideFence,
}

/// Current fence state (phase, marker, indent, and length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceState {
    /// Current fence phase.
    pub phase: FencePhase,
    /// Fence marker character (``` or ~~~).
    pub marker: Option<char>,
    /// Leading whitespace count captured at opening.
    pub indent: usize,
    /// Length of the opening fence (number of ` or ~ characters).
    pub length: usize,
}

/// Outcome of processing a single line for fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParseOutcome {
    /// State to carry into the next line.
    pub next_state: FenceState,
    /// Whether the line belongs to a fence (opener, body or closer).
    pub in_fence: bool,
}

/// Advance fence state based on a single line of text.
pub fn advance_fence_state(line: &str, state: FenceState) -> LineParseOutcome {
    let (visual_indent, byte_offset) = leading_whitespace_info(line);
    let after_indent = &line[byte_offset..];

    match state.phase {
        // CommonMark: 0-3 spaces of indentation, 4+ is indented code
        FencePhase::Outside if visual_indent <= 3 => {
            match detect_fence_marker_with_length(after_indent) {
                Some((marker, length)) if opener_info_is_valid(marker, &after_indent[length..]) => {
                    LineParseOutcome {
                        next_state: FenceState {
                            phase: FencePhase::InsideFence,
                            marker: Some(marker),
                            indent: visual_indent,
                            length,
                        },
                        in_fence: true,
                    }
                }
                _ => LineParseOutcome {
                    next_state: state,
                    in_fence: false,
                },
            }
        }
        FencePhase::Outside => LineParseOutcome {
            next_state: state,
            in_fence: false,
        },
        FencePhase::InsideFence => {
            let closes = visual_indent <= 3
                && is_closing_fence(after_indent)
                && detect_fence_marker_with_length(after_indent)
                    .is_some_and(|(marker, len)| Some(marker) == state.marker && len >= state.length);
            LineParseOutcome {
                next_state: if closes { FenceState::default() } else { state },
                in_fence: true,
            }
        }
    }
}

/// Line-by-line fence tracker that remembers where the open fence started.
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    state: FenceState,
    opened_at: Option<usize>,
}

impl FenceTracker {
    /// Create a tracker positioned outside any fence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (1-indexed `line_no`); returns true when the line is fence content.
    pub fn observe(&mut self, line_no: usize, line: &str) -> bool {
        let was_open = self.is_open();
        let outcome = advance_fence_state(line, self.state);
        self.state = outcome.next_state;
        match (was_open, self.is_open()) {
            (false, true) => self.opened_at = Some(line_no),
            (true, false) => self.opened_at = None,
            _ => {}
        }
        outcome.in_fence
    }

    /// Whether a fence is currently open.
    pub fn is_open(&self) -> bool {
        matches!(self.state.phase, FencePhase::InsideFence)
    }

    /// Record an unclosed-fence warning if the input ended inside a fence.
    pub fn finish(self, diagnostics: &mut ParseDiagnostics) {
        if let (Some(line), Some(marker)) = (self.opened_at, self.state.marker) {
            diagnostics.add_warning(ParseWarning::UnclosedCodeFence {
                location: SourceLocation::new(line, self.state.indent + 1),
                marker,
            });
        }
    }
}

/// Returns (visual_columns, byte_offset) for leading whitespace.
/// Visual columns expand tabs to 4-column boundaries per CommonMark.
fn leading_whitespace_info(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => col += 1,
            b'\t' => col += 4 - (col % 4),
            _ => break,
        }
        bytes += 1;
    }
    (col, bytes)
}

fn detect_fence_marker_with_length(after_indent: &str) -> Option<(char, usize)> {
    let first = after_indent.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run_len = after_indent.chars().take_while(|c| *c == first).count();
    (run_len >= 3).then_some((first, run_len))
}

/// CommonMark: a backtick fence's info string may not contain backticks.
fn opener_info_is_valid(marker: char, info: &str) -> bool {
    marker == '~' || !info.contains('`')
}

/// A closing fence has only fence markers followed by optional whitespace.
fn is_closing_fence(after_indent: &str) -> bool {
    let Some(first) = after_indent.chars().next() else {
        return false;
    };
    let markers = after_indent.chars().take_while(|c| *c == first).count();
    markers >= 3 && after_indent[markers..].chars().all(char::is_whitespace)
}
