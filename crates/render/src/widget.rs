//! Markup of the hydrated code-block widget.

use crate::clipboard::CopyState;
use crate::highlight::Highlighter;

pub(crate) fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Header label for a language: upper-cased.
pub fn language_label(language: &str) -> String {
    language.to_uppercase()
}

/// Copy button in its idle state; the source travels in `data-code`.
pub fn copy_button(code: &str) -> String {
    let state = CopyState::Idle;
    format!(
        "<button type=\"button\" class=\"code-block-copy-btn\" data-copy-state=\"{}\" data-code=\"{}\" aria-label=\"{}\" title=\"{}\">{}</button>",
        state.as_str(),
        escape_attr(code),
        state.aria_label(),
        state.title(),
        state.label()
    )
}

/// Full widget: header (dots, language, optional title, copy button) over a
/// highlighted, line-numbered body.
pub fn code_widget(
    code: &str,
    language: &str,
    title: Option<&str>,
    highlighter: &Highlighter,
) -> String {
    let mut html = String::with_capacity(code.len() * 4 + 512);
    html.push_str(&format!(
        "<div class=\"code-block-container code-block-hydrated\" data-language=\"{}\" data-theme=\"{}\">",
        escape_attr(language),
        highlighter.scheme().as_str()
    ));

    html.push_str("<div class=\"code-block-header\"><div class=\"code-block-dots\">");
    for color in ["red", "yellow", "green"] {
        html.push_str(&format!(
            "<span class=\"code-block-dot code-block-dot-{}\"></span>",
            color
        ));
    }
    html.push_str("</div><span class=\"code-block-language\">");
    html.push_str(&html_escape::encode_text(&language_label(language)));
    html.push_str("</span>");
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        html.push_str("<span class=\"code-block-title\">");
        html.push_str(&html_escape::encode_text(title));
        html.push_str("</span>");
    }
    html.push_str(&copy_button(code));
    html.push_str("</div>");

    html.push_str(&format!(
        "<pre class=\"code-block-pre\" style=\"margin: 0; background-color: {}; color: {};\"><code class=\"language-{}\">",
        highlighter.background(),
        highlighter.foreground(),
        escape_attr(language)
    ));
    html.push_str(&highlighter.render(code, language));
    html.push_str("</code></pre></div>");
    html
}
