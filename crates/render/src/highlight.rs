//! Syntax highlighting with syntect's bundled syntaxes and themes.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Light or dark rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl ColorScheme {
    /// Scheme from a `prefers-color-scheme: dark` query result.
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ColorScheme::Dark
        } else {
            ColorScheme::Light
        }
    }

    /// `"light"` or `"dark"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    fn theme_name(self) -> &'static str {
        match self {
            ColorScheme::Light => "InspiredGitHub",
            ColorScheme::Dark => "base16-ocean.dark",
        }
    }

    fn fallback_colors(self) -> (&'static str, &'static str) {
        match self {
            ColorScheme::Light => ("#ffffff", "#323232"),
            ColorScheme::Dark => ("#2b303b", "#c0c5ce"),
        }
    }
}

/// Maps fence languages onto tokens syntect knows.
fn syntax_token(language: &str) -> &str {
    match language {
        "ts" | "typescript" | "tsx" | "jsx" | "mjs" | "cjs" => "js",
        "sh" | "shell" | "zsh" | "bash" | "console" => "bash",
        "vue" | "svelte" | "xml" => "html",
        "yml" => "yaml",
        "md" => "markdown",
        "py" => "python",
        "rs" => "rust",
        other => other,
    }
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Per-call highlighter; the theme is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlighter {
    scheme: ColorScheme,
    line_numbers: bool,
}

impl Highlighter {
    /// Highlighter for `scheme` with line numbers on.
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            line_numbers: true,
        }
    }

    /// Toggle the line-number gutter.
    pub fn with_line_numbers(mut self, line_numbers: bool) -> Self {
        self.line_numbers = line_numbers;
        self
    }

    /// Scheme in use.
    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    fn theme(&self) -> Option<&'static Theme> {
        THEME_SET.themes.get(self.scheme.theme_name())
    }

    /// Theme background colour as `#rrggbb`.
    pub fn background(&self) -> String {
        self.theme()
            .and_then(|theme| theme.settings.background)
            .map(hex)
            .unwrap_or_else(|| self.scheme.fallback_colors().0.to_string())
    }

    /// Theme foreground colour as `#rrggbb`.
    pub fn foreground(&self) -> String {
        self.theme()
            .and_then(|theme| theme.settings.foreground)
            .map(hex)
            .unwrap_or_else(|| self.scheme.fallback_colors().1.to_string())
    }

    /// Highlighted HTML of each line, without line terminators. Always at
    /// least one line. Falls back to escaped text if highlighting fails.
    pub fn highlight_lines(&self, code: &str, language: &str) -> Vec<String> {
        let Some(theme) = self.theme() else {
            log::warn!("Theme `{}` missing; rendering plain code", self.scheme.theme_name());
            return plain_lines(code);
        };
        match highlight_with(theme, code, language) {
            Ok(lines) if !lines.is_empty() => lines,
            Ok(_) => vec![String::new()],
            Err(err) => {
                log::warn!("Highlighting `{}` failed: {}", language, err);
                plain_lines(code)
            }
        }
    }

    /// Line-wrapped, optionally numbered HTML for a `<code>` element.
    pub fn render(&self, code: &str, language: &str) -> String {
        self.highlight_lines(code, language)
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let number = if self.line_numbers {
                    format!("<span class=\"code-line-number\">{}</span>", i + 1)
                } else {
                    String::new()
                };
                format!(
                    "<span class=\"code-line\">{}<span class=\"code-line-content\">{}</span></span>",
                    number, line
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn highlight_with(theme: &Theme, code: &str, language: &str) -> Result<Vec<String>, syntect::Error> {
    let syntax = SYNTAX_SET
        .find_syntax_by_token(syntax_token(language))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let regions = highlighter.highlight_line(line, &SYNTAX_SET)?;
        let trimmed: Vec<_> = regions
            .into_iter()
            .map(|(style, text)| (style, text.trim_end_matches(['\n', '\r'])))
            .filter(|(_, text)| !text.is_empty())
            .collect();
        lines.push(styled_line_to_highlighted_html(&trimmed, IncludeBackground::No)?);
    }
    Ok(lines)
}

fn plain_lines(code: &str) -> Vec<String> {
    let lines: Vec<String> = code
        .lines()
        .map(|line| html_escape::encode_text(line).into_owned())
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_from_preference() {
        assert_eq!(ColorScheme::from_prefers_dark(true), ColorScheme::Dark);
        assert_eq!(ColorScheme::from_prefers_dark(false), ColorScheme::Light);
        assert_eq!(ColorScheme::default().as_str(), "light");
    }

    #[test]
    fn dark_theme_colors() {
        let highlighter = Highlighter::new(ColorScheme::Dark);
        assert_eq!(highlighter.background(), "#2b303b");
        assert_eq!(highlighter.foreground(), "#c0c5ce");
    }

    #[test]
    fn one_line_per_source_line() {
        let highlighter = Highlighter::new(ColorScheme::Light);
        let lines = highlighter.highlight_lines("let a = 1;\nlet b = 2;", "ts");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| !line.contains('\n')));
        assert!(lines[0].contains("<span style="));

        assert_eq!(highlighter.highlight_lines("", "rust").len(), 1);
    }

    #[test]
    fn unknown_language_is_escaped_plain_text() {
        let html = Highlighter::new(ColorScheme::Dark).render("a < b", "nosuchlang");
        assert!(html.starts_with(
            "<span class=\"code-line\"><span class=\"code-line-number\">1</span><span class=\"code-line-content\">"
        ));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn render_without_numbers() {
        let html = Highlighter::new(ColorScheme::Light)
            .with_line_numbers(false)
            .render("x\ny", "text");
        assert_eq!(html.matches("class=\"code-line\"").count(), 2);
        assert!(!html.contains("code-line-number"));
        assert_eq!(html.matches('\n').count(), 1);
    }

    #[test]
    fn plain_fallback_escapes() {
        assert_eq!(plain_lines("<a>\n&"), vec!["&lt;a&gt;", "&amp;"]);
        assert_eq!(plain_lines(""), vec![String::new()]);
    }
}
