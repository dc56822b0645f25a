//! Copy-to-clipboard state machine.
//!
//! The host supplies the clipboards and the clock; this module only decides
//! which clipboard to try and what the button shows.

use thiserror::Error;

/// How long copy feedback stays visible before reverting to idle.
pub const COPY_FEEDBACK_MS: u64 = 2000;

/// Notice shown after a successful copy.
pub const COPIED_MESSAGE: &str = "代码已复制到剪贴板";
/// Notice shown after a failed copy.
pub const FAILED_MESSAGE: &str = "复制失败";

/// Clipboard write failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    /// The environment has no clipboard.
    #[error("clipboard unavailable")]
    Unavailable,
    /// Permission was denied.
    #[error("clipboard permission denied")]
    Denied,
    /// Any other failure reported by the host.
    #[error("clipboard write failed: {0}")]
    Failed(String),
}

/// A writable clipboard.
pub trait Clipboard {
    /// Write `text`.
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Visible state of a copy button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopyState {
    /// Ready.
    #[default]
    Idle,
    /// Copied; reverts after [`COPY_FEEDBACK_MS`].
    Copied,
    /// Copy failed; reverts after [`COPY_FEEDBACK_MS`].
    Failed,
}

impl CopyState {
    /// Value of `data-copy-state`.
    pub fn as_str(self) -> &'static str {
        match self {
            CopyState::Idle => "idle",
            CopyState::Copied => "copied",
            CopyState::Failed => "failed",
        }
    }

    /// Button text.
    pub fn label(self) -> &'static str {
        match self {
            CopyState::Idle => "复制",
            CopyState::Copied => "已复制",
            CopyState::Failed => "复制失败",
        }
    }

    /// `aria-label`.
    pub fn aria_label(self) -> &'static str {
        match self {
            CopyState::Idle => "Copy code",
            CopyState::Copied => "Copied!",
            CopyState::Failed => "Copy failed",
        }
    }

    /// `title` tooltip.
    pub fn title(self) -> &'static str {
        match self {
            CopyState::Idle => "复制代码",
            CopyState::Copied => "已复制!",
            CopyState::Failed => "复制失败",
        }
    }

    /// Notice for a finished copy, if any.
    pub fn message(self) -> Option<&'static str> {
        match self {
            CopyState::Idle => None,
            CopyState::Copied => Some(COPIED_MESSAGE),
            CopyState::Failed => Some(FAILED_MESSAGE),
        }
    }
}

/// State of one copy button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyButton {
    text: String,
    state: CopyState,
    changed_at: u64,
}

impl CopyButton {
    /// Button copying `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: CopyState::Idle,
            changed_at: 0,
        }
    }

    /// Text this button copies.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Copy with `primary`, then `fallback` if the primary fails. Never
    /// returns an error; the outcome is the new state.
    pub fn copy(
        &mut self,
        primary: &dyn Clipboard,
        fallback: Option<&dyn Clipboard>,
        now_ms: u64,
    ) -> CopyState {
        let result = match primary.write_text(&self.text) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!("Clipboard write failed, trying fallback: {}", err);
                match fallback {
                    Some(fallback) => fallback.write_text(&self.text),
                    None => Err(err),
                }
            }
        };
        if let Err(err) = &result {
            log::error!("Copy failed: {}", err);
        }
        self.settle(result.is_ok(), now_ms)
    }

    /// Record an outcome reported asynchronously by the host.
    pub fn settle(&mut self, success: bool, now_ms: u64) -> CopyState {
        self.state = if success {
            CopyState::Copied
        } else {
            CopyState::Failed
        };
        self.changed_at = now_ms;
        self.state
    }

    /// State at `now_ms`, reverting to idle once the feedback has expired.
    pub fn state_at(&mut self, now_ms: u64) -> CopyState {
        if self.state != CopyState::Idle
            && now_ms.saturating_sub(self.changed_at) >= COPY_FEEDBACK_MS
        {
            self.state = CopyState::Idle;
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recording {
        result: Result<(), ClipboardError>,
        written: RefCell<Vec<String>>,
    }

    impl Recording {
        fn new(result: Result<(), ClipboardError>) -> Self {
            Self {
                result,
                written: RefCell::new(Vec::new()),
            }
        }
    }

    impl Clipboard for Recording {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.written.borrow_mut().push(text.to_string());
            self.result.clone()
        }
    }

    #[test]
    fn copied_reverts_after_feedback_window() {
        let clipboard = Recording::new(Ok(()));
        let mut button = CopyButton::new("npm i");
        assert_eq!(button.copy(&clipboard, None, 1_000), CopyState::Copied);
        assert_eq!(clipboard.written.borrow().as_slice(), ["npm i"]);
        assert_eq!(button.state_at(2_999), CopyState::Copied);
        assert_eq!(button.state_at(3_000), CopyState::Idle);
        assert_eq!(button.state_at(3_000).label(), "复制");
    }

    #[test]
    fn fallback_is_used_when_primary_fails() {
        let primary = Recording::new(Err(ClipboardError::Denied));
        let fallback = Recording::new(Ok(()));
        let mut button = CopyButton::new("x");
        let state = button.copy(&primary, Some(&fallback as &dyn Clipboard), 0);
        assert_eq!(state, CopyState::Copied);
        assert_eq!(state.label(), "已复制");
        assert_eq!(fallback.written.borrow().len(), 1);
    }

    #[test]
    fn both_failing_shows_failure() {
        let primary = Recording::new(Err(ClipboardError::Unavailable));
        let fallback = Recording::new(Err(ClipboardError::Failed("no selection".into())));
        let mut button = CopyButton::new("x");
        let state = button.copy(&primary, Some(&fallback as &dyn Clipboard), 10);
        assert_eq!(state, CopyState::Failed);
        assert_eq!(state.label(), "复制失败");
        assert_eq!(state.message(), Some(FAILED_MESSAGE));
        assert_eq!(button.state_at(2_010), CopyState::Idle);
    }

    #[test]
    fn settle_records_async_outcome() {
        let mut button = CopyButton::new("x");
        assert_eq!(button.state_at(0), CopyState::Idle);
        assert_eq!(button.settle(true, 500), CopyState::Copied);
        assert_eq!(button.state_at(600).message(), Some(COPIED_MESSAGE));
    }
}
