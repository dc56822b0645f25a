//! Tabbed code groups.

use crate::highlight::Highlighter;
use crate::widget::{code_widget, escape_attr};
use mdview_core::FALLBACK_LANGUAGE;
use mdview_core::code_title::{fallback_title, resolve_title};

/// Text shown for a group without code blocks.
pub const EMPTY_GROUP_TEXT: &str = "未找到代码块";

/// A block found inside a code group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeGroupEntry {
    /// Language from the `language-xxx` class, if any.
    pub language: Option<String>,
    /// Explicit title (`data-title` / `title`).
    pub title: Option<String>,
    /// Decoded source text.
    pub content: String,
    /// Whether the block has a `<code>` child.
    pub has_code: bool,
}

impl CodeGroupEntry {
    /// Entry for a `<pre><code>` block.
    pub fn code(language: Option<&str>, title: Option<&str>, content: impl Into<String>) -> Self {
        Self {
            language: language.map(str::to_string),
            title: title.map(str::to_string),
            content: content.into(),
            has_code: true,
        }
    }
}

/// One tab of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTab {
    /// Tab key, the zero-based position.
    pub key: usize,
    /// Tab label.
    pub label: String,
    /// Language, `text` when unknown.
    pub language: String,
    /// Source text.
    pub content: String,
    /// Explicit title shown in the widget header.
    pub title: Option<String>,
}

/// A resolved code group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGroup {
    /// Group title from the directive.
    pub title: Option<String>,
    /// Tabs in document order.
    pub tabs: Vec<CodeTab>,
}

/// Resolve tab labels for `entries`.
///
/// Labels follow the title chain: explicit title, `BLOCK_TITLE` marker,
/// leading `[bracket]`, language, then `代码块 N`. Entries without code are
/// labelled by position only.
pub fn build_code_group(title: Option<&str>, entries: &[CodeGroupEntry]) -> CodeGroup {
    let tabs = entries
        .iter()
        .enumerate()
        .map(|(key, entry)| {
            let label = if entry.has_code {
                resolve_title(
                    entry.title.as_deref(),
                    Some(&entry.content),
                    entry.language.as_deref(),
                    key,
                )
            } else {
                fallback_title(key)
            };
            CodeTab {
                key,
                label,
                language: entry
                    .language
                    .clone()
                    .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string()),
                content: entry.content.clone(),
                title: entry.title.clone(),
            }
        })
        .collect();
    CodeGroup {
        title: title.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string),
        tabs,
    }
}

impl CodeGroup {
    /// Whether the group has no blocks.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Tab labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.tabs.iter().map(|tab| tab.label.as_str()).collect()
    }

    /// Group markup: an empty state, a single widget, or a tab strip over panels.
    pub fn to_html(&self, highlighter: &Highlighter) -> String {
        let mut html = String::new();
        match self.tabs.as_slice() {
            [] => {
                html.push_str("<div class=\"code-group code-group-empty code-group-hydrated\">");
                html.push_str(EMPTY_GROUP_TEXT);
                html.push_str("</div>");
            }
            [tab] => {
                html.push_str("<div class=\"code-group code-group-single code-group-hydrated\">");
                self.push_title(&mut html);
                html.push_str(&code_widget(
                    &tab.content,
                    &tab.language,
                    tab.title.as_deref(),
                    highlighter,
                ));
                html.push_str("</div>");
            }
            tabs => {
                html.push_str("<div class=\"code-group code-group-multiple code-group-hydrated\">");
                self.push_title(&mut html);
                html.push_str("<div class=\"code-group-tabs\" role=\"tablist\">");
                for tab in tabs {
                    let active = tab.key == 0;
                    html.push_str(&format!(
                        "<button type=\"button\" class=\"code-group-tab{}\" role=\"tab\" data-tab-key=\"{}\" aria-selected=\"{}\">",
                        if active { " code-group-tab-active" } else { "" },
                        tab.key,
                        active
                    ));
                    html.push_str(&html_escape::encode_text(&tab.label));
                    html.push_str("</button>");
                }
                html.push_str("</div><div class=\"code-group-panels\">");
                for tab in tabs {
                    html.push_str(&format!(
                        "<div class=\"code-group-panel\" role=\"tabpanel\" data-tab-key=\"{}\"{}>",
                        tab.key,
                        if tab.key == 0 { "" } else { " hidden=\"\"" }
                    ));
                    html.push_str(&code_widget(
                        &tab.content,
                        &tab.language,
                        tab.title.as_deref(),
                        highlighter,
                    ));
                    html.push_str("</div>");
                }
                html.push_str("</div></div>");
            }
        }
        html
    }

    fn push_title(&self, html: &mut String) {
        if let Some(title) = &self.title {
            html.push_str("<div class=\"code-group-title\" title=\"");
            html.push_str(&escape_attr(title));
            html.push_str("\">");
            html.push_str(&html_escape::encode_text(title));
            html.push_str("</div>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::ColorScheme;

    fn highlighter() -> Highlighter {
        Highlighter::new(ColorScheme::Light)
    }

    #[test]
    fn labels_follow_title_chain() {
        let group = build_code_group(
            None,
            &[
                CodeGroupEntry::code(Some("js"), None, "<!-- BLOCK_TITLE: main.js -->\nrun()"),
                CodeGroupEntry::code(Some("js"), None, "[app.js]\nstart()"),
                CodeGroupEntry::code(Some("sh"), Some("Install"), "npm i"),
                CodeGroupEntry::code(None, None, "plain"),
                CodeGroupEntry::default(),
            ],
        );
        assert_eq!(
            group.labels(),
            vec!["main.js", "app.js", "Install", "代码块 4", "代码块 5"]
        );
        assert_eq!(group.tabs[3].language, "text");
    }

    #[test]
    fn marker_beats_bracket() {
        let group = build_code_group(
            None,
            &[CodeGroupEntry::code(
                Some("js"),
                None,
                "<!-- BLOCK_TITLE: a.js -->\n[b.js]",
            )],
        );
        assert_eq!(group.labels(), vec!["a.js"]);
    }

    #[test]
    fn empty_group() {
        let group = build_code_group(Some("Nothing"), &[]);
        assert!(group.is_empty());
        assert_eq!(
            group.to_html(&highlighter()),
            "<div class=\"code-group code-group-empty code-group-hydrated\">未找到代码块</div>"
        );
    }

    #[test]
    fn single_block_has_no_tab_strip() {
        let group = build_code_group(
            Some("Setup"),
            &[CodeGroupEntry::code(Some("sh"), None, "npm i")],
        );
        let html = group.to_html(&highlighter());
        assert!(html.starts_with(
            "<div class=\"code-group code-group-single code-group-hydrated\"><div class=\"code-group-title\" title=\"Setup\">Setup</div>"
        ));
        assert!(!html.contains("role=\"tablist\""));
        assert_eq!(html.matches("code-block-hydrated").count(), 1);
    }

    #[test]
    fn multiple_blocks_get_tabs() {
        let group = build_code_group(
            None,
            &[
                CodeGroupEntry::code(Some("sh"), Some("npm"), "npm i"),
                CodeGroupEntry::code(Some("sh"), Some("yarn"), "yarn"),
            ],
        );
        let html = group.to_html(&highlighter());
        assert!(html.contains(
            "<button type=\"button\" class=\"code-group-tab code-group-tab-active\" role=\"tab\" data-tab-key=\"0\" aria-selected=\"true\">npm</button>"
        ));
        assert!(html.contains(
            "<button type=\"button\" class=\"code-group-tab\" role=\"tab\" data-tab-key=\"1\" aria-selected=\"false\">yarn</button>"
        ));
        assert!(html.contains("data-tab-key=\"1\" hidden=\"\">"));
        assert_eq!(html.matches("role=\"tabpanel\"").count(), 2);
    }
}
