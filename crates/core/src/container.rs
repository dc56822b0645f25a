//! The container directive vocabulary.

use serde::Serialize;
use std::collections::BTreeMap;

/// Kind of a `:::name` container, resolved from its lowercased name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    /// `:::tip`
    Tip,
    /// `:::warning`
    Warning,
    /// `:::danger`
    Danger,
    /// `:::info`
    Info,
    /// `:::note`
    Note,
    /// `:::success`
    Success,
    /// `:::error`
    Error,
    /// `:::iframe`, an embedded frame without decoration.
    Iframe,
    /// `:::details`, a collapsible block.
    Details,
    /// `:::code-group`, sibling code blocks shown as tabs.
    CodeGroup,
    /// Any other name: a plain container.
    Generic,
}

impl ContainerKind {
    /// The seven decorated kinds, in display order.
    pub const DECORATED: [ContainerKind; 7] = [
        ContainerKind::Tip,
        ContainerKind::Warning,
        ContainerKind::Danger,
        ContainerKind::Info,
        ContainerKind::Note,
        ContainerKind::Success,
        ContainerKind::Error,
    ];

    /// Resolve a directive name. Unknown names map to [`ContainerKind::Generic`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "tip" => ContainerKind::Tip,
            "warning" => ContainerKind::Warning,
            "danger" => ContainerKind::Danger,
            "info" => ContainerKind::Info,
            "note" => ContainerKind::Note,
            "success" => ContainerKind::Success,
            "error" => ContainerKind::Error,
            "iframe" => ContainerKind::Iframe,
            "details" => ContainerKind::Details,
            "code-group" => ContainerKind::CodeGroup,
            _ => ContainerKind::Generic,
        }
    }

    /// Icon shown before the title of decorated kinds.
    pub fn icon(self) -> Option<&'static str> {
        self.decoration().map(|(icon, _)| icon)
    }

    /// Title used when the directive carries none.
    pub fn default_title(self) -> Option<&'static str> {
        match self {
            ContainerKind::Details => Some("展开查看内容"),
            other => other.decoration().map(|(_, title)| title),
        }
    }

    /// Suffix of the `custom-container-*` class.
    pub fn class_suffix(self) -> &'static str {
        match self {
            ContainerKind::Tip => "tip",
            ContainerKind::Warning => "warning",
            ContainerKind::Danger => "danger",
            ContainerKind::Info => "info",
            ContainerKind::Note => "note",
            ContainerKind::Success => "success",
            ContainerKind::Error => "error",
            ContainerKind::Iframe => "iframe",
            ContainerKind::Details => "details",
            ContainerKind::CodeGroup => "code-group",
            ContainerKind::Generic => "generic",
        }
    }

    /// Whether the name belongs to the known vocabulary.
    pub fn is_known(self) -> bool {
        self != ContainerKind::Generic
    }

    /// Whether the body is captured verbatim instead of parsed as markdown.
    pub fn has_raw_body(self) -> bool {
        self == ContainerKind::Iframe
    }

    fn decoration(self) -> Option<(&'static str, &'static str)> {
        match self {
            ContainerKind::Tip => Some(("💡", "提示")),
            ContainerKind::Warning => Some(("⚠️", "警告")),
            ContainerKind::Danger => Some(("🚨", "危险")),
            ContainerKind::Info => Some(("ℹ️", "信息")),
            ContainerKind::Note => Some(("📝", "注意")),
            ContainerKind::Success => Some(("✅", "成功")),
            ContainerKind::Error => Some(("❌", "错误")),
            _ => None,
        }
    }
}

/// A parsed container directive attached to a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerDirective {
    /// Lowercased directive name as written.
    pub name: String,
    /// Resolved kind.
    pub kind: ContainerKind,
    /// Explicit title from `[Title]` or `{title="..."}`.
    pub title: Option<String>,
    /// Remaining `{key="value"}` attributes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl ContainerDirective {
    /// Build a directive from its name and optional explicit title.
    pub fn new(name: impl Into<String>, title: Option<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        Self {
            kind: ContainerKind::from_name(&name),
            name,
            title,
            attributes: BTreeMap::new(),
        }
    }

    /// Explicit title, falling back to the kind's default.
    pub fn resolved_title(&self) -> Option<String> {
        self.title
            .clone()
            .or_else(|| self.kind.default_title().map(str::to_string))
    }

    /// Header text of decorated kinds: `"{icon} {title}"`.
    pub fn header_text(&self) -> Option<String> {
        let icon = self.kind.icon()?;
        let title = self.resolved_title()?;
        Some(format!("{} {}", icon, title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decorated_kinds_have_icon_and_title() {
        let expected = [
            ("tip", "💡", "提示"),
            ("warning", "⚠️", "警告"),
            ("danger", "🚨", "危险"),
            ("info", "ℹ️", "信息"),
            ("note", "📝", "注意"),
            ("success", "✅", "成功"),
            ("error", "❌", "错误"),
        ];
        for (kind, (name, icon, title)) in ContainerKind::DECORATED.iter().zip(expected) {
            assert_eq!(ContainerKind::from_name(name), *kind);
            assert_eq!(kind.icon(), Some(icon));
            assert_eq!(kind.default_title(), Some(title));
            assert_eq!(kind.class_suffix(), name);
        }
    }

    #[test]
    fn unknown_names_are_generic() {
        assert_eq!(ContainerKind::from_name("custom"), ContainerKind::Generic);
        assert_eq!(ContainerKind::from_name("TIP"), ContainerKind::Tip);
        assert!(!ContainerKind::Generic.is_known());
        assert_eq!(ContainerKind::Generic.icon(), None);
        assert_eq!(ContainerKind::Generic.default_title(), None);
    }

    #[test]
    fn header_text_prefers_explicit_title() {
        let directive = ContainerDirective::new("Tip", Some("Note".into()));
        assert_eq!(directive.name, "tip");
        assert_eq!(directive.header_text().as_deref(), Some("💡 Note"));

        let defaulted = ContainerDirective::new("danger", None);
        assert_eq!(defaulted.header_text().as_deref(), Some("🚨 危险"));

        let details = ContainerDirective::new("details", None);
        assert_eq!(details.resolved_title().as_deref(), Some("展开查看内容"));
        assert_eq!(details.header_text(), None);
    }
}
