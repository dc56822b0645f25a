//! Fenced code block metadata: language normalization and title resolution.
//!
//! A code block's display title is resolved in order:
//!
//! 1. an explicit title (`title="..."` or `[...]` in the fence meta, or a
//!    `data-title`/`title` attribute during hydration);
//! 2. a `<!-- BLOCK_TITLE: text -->` marker on the first non-blank line;
//! 3. a leading `[text]` token on the first non-blank line;
//! 4. the language;
//! 5. `代码块 N` (1-indexed position) when nothing else is available.
//!
//! Markers are left in the displayed content.

use serde::Serialize;

/// Language used when a fence has none or an unusable one.
pub const FALLBACK_LANGUAGE: &str = "text";

const BLOCK_TITLE_OPEN: &str = "<!--";
const BLOCK_TITLE_KEY: &str = "BLOCK_TITLE:";
const BLOCK_TITLE_CLOSE: &str = "-->";

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Lowercased language token, `text` when absent.
    pub language: String,
    /// Fence body without the trailing newline.
    pub content: String,
    /// Info string after the language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    /// Explicit title from the fence meta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CodeBlock {
    /// Build a block from parser output.
    pub fn from_fence(lang: Option<&str>, meta: Option<&str>, content: impl Into<String>) -> Self {
        let meta = meta.map(str::trim).filter(|m| !m.is_empty());
        Self {
            language: normalize_language(lang),
            content: content.into(),
            title: meta.and_then(title_from_meta),
            meta: meta.map(str::to_string),
        }
    }

    /// Display title with the full fallback chain; `index` is zero-based.
    pub fn resolved_title(&self, index: usize) -> String {
        resolve_title(
            self.title.as_deref(),
            Some(&self.content),
            Some(&self.language),
            index,
        )
    }
}

/// Normalize a fence language token. Anything that is not a plain
/// identifier-like token becomes [`FALLBACK_LANGUAGE`].
pub fn normalize_language(lang: Option<&str>) -> String {
    match lang.map(str::trim) {
        Some(token) if is_language_token(token) => token.to_ascii_lowercase(),
        _ => FALLBACK_LANGUAGE.to_string(),
    }
}

fn is_language_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.'))
}

/// Extract the language from a `language-xxx` class list.
pub fn language_from_class(class: &str) -> Option<String> {
    class
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-"))
        .filter(|lang| is_language_token(lang))
        .map(str::to_ascii_lowercase)
}

/// Title from fence meta: `title="x"`, `title='x'`, `title=x` or `[x]`.
pub fn title_from_meta(meta: &str) -> Option<String> {
    if let Some(start) = meta.find("title=") {
        let value = &meta[start + "title=".len()..];
        let title = match value.chars().next() {
            Some(q @ ('"' | '\'')) => value[1..].split(q).next().unwrap_or_default(),
            _ => value.split_whitespace().next().unwrap_or_default(),
        };
        let title = title.trim();
        if !title.is_empty() {
            return Some(title.to_string());
        }
    }
    bracket_token(meta.trim_start())
}

fn first_content_line(content: &str) -> Option<&str> {
    content.lines().map(str::trim).find(|line| !line.is_empty())
}

/// `<!-- BLOCK_TITLE: text -->` on the first non-blank line.
pub fn block_title_marker(content: &str) -> Option<String> {
    let line = first_content_line(content)?;
    let inner = line.strip_prefix(BLOCK_TITLE_OPEN)?.trim_start();
    let inner = inner.strip_prefix(BLOCK_TITLE_KEY)?;
    let end = inner.find(BLOCK_TITLE_CLOSE)?;
    let title = inner[..end].trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Leading `[text]` token on the first non-blank line.
pub fn bracket_title(content: &str) -> Option<String> {
    bracket_token(first_content_line(content)?)
}

fn bracket_token(text: &str) -> Option<String> {
    let inner = text.strip_prefix('[')?;
    let end = inner.find(']')?;
    let title = inner[..end].trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Resolve a display title; `index` is the zero-based position in its group.
pub fn resolve_title(
    explicit: Option<&str>,
    content: Option<&str>,
    language: Option<&str>,
    index: usize,
) -> String {
    explicit
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| content.and_then(block_title_marker))
        .or_else(|| content.and_then(bracket_title))
        .or_else(|| {
            language
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| fallback_title(index))
}

/// `代码块 N`, 1-indexed.
pub fn fallback_title(index: usize) -> String {
    format!("代码块 {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_defaults_and_normalization() {
        assert_eq!(normalize_language(None), "text");
        assert_eq!(normalize_language(Some("")), "text");
        assert_eq!(normalize_language(Some("JavaScript")), "javascript");
        assert_eq!(normalize_language(Some("c++")), "c++");
        assert_eq!(normalize_language(Some("bad<lang")), "text");
    }

    #[test]
    fn language_from_class_list() {
        assert_eq!(language_from_class("hljs language-rust").as_deref(), Some("rust"));
        assert_eq!(language_from_class("plain"), None);
        assert_eq!(language_from_class("language-"), None);
    }

    #[test]
    fn meta_titles() {
        assert_eq!(title_from_meta(r#"title="main.rs" {1,3}"#).as_deref(), Some("main.rs"));
        assert_eq!(title_from_meta("title=app.ts").as_deref(), Some("app.ts"));
        assert_eq!(title_from_meta("[config.yml]").as_deref(), Some("config.yml"));
        assert_eq!(title_from_meta("{1,3}"), None);
    }

    #[test]
    fn block_title_marker_wins_over_bracket() {
        let content = "<!-- BLOCK_TITLE: main.js -->\n[ignored]\nconsole.log(1)";
        assert_eq!(resolve_title(None, Some(content), Some("js"), 0), "main.js");

        let bracket = "[server.js]\nlisten()";
        assert_eq!(resolve_title(None, Some(bracket), Some("js"), 0), "server.js");
    }

    #[test]
    fn marker_must_be_on_first_line() {
        let content = "let a = 1;\n<!-- BLOCK_TITLE: late -->";
        assert_eq!(block_title_marker(content), None);
        assert_eq!(block_title_marker("\n\n  <!--BLOCK_TITLE:  spaced  -->").as_deref(), Some("spaced"));
        assert_eq!(block_title_marker("<!-- BLOCK_TITLE: -->"), None);
    }

    #[test]
    fn explicit_title_beats_markers() {
        let content = "<!-- BLOCK_TITLE: marker -->";
        assert_eq!(resolve_title(Some("explicit"), Some(content), None, 0), "explicit");
        assert_eq!(resolve_title(Some("  "), Some(content), None, 0), "marker");
    }

    #[test]
    fn language_then_positional_fallback() {
        assert_eq!(resolve_title(None, Some("plain"), Some("go"), 2), "go");
        assert_eq!(resolve_title(None, None, None, 2), "代码块 3");
    }

    #[test]
    fn code_block_from_fence() {
        let block = CodeBlock::from_fence(Some("ts"), Some(r#"title="a.ts""#), "let a = 1;");
        assert_eq!(block.language, "ts");
        assert_eq!(block.title.as_deref(), Some("a.ts"));
        assert_eq!(block.resolved_title(0), "a.ts");

        let bare = CodeBlock::from_fence(None, None, "[x]\nbody");
        assert_eq!(bare.language, "text");
        assert_eq!(bare.meta, None);
        assert_eq!(bare.resolved_title(0), "x");
        assert_eq!(bare.content, "[x]\nbody");
    }
}
