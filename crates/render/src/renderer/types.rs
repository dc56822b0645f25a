//! Type definitions for the HTML renderer.

use mdview_core::{CodeBlock, ParseDiagnostics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default inline style of the host wrapper, in output order.
pub const DEFAULT_HOST_STYLE: &[(&str, &str)] = &[
    ("line-height", "1.8"),
    ("font-size", "16px"),
    ("color", "#333"),
    ("background-color", "transparent"),
];

/// Class and inline-style overrides for the outer wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostStyle {
    /// Extra class appended after `markdown-renderer`.
    #[serde(alias = "class")]
    pub class_name: Option<String>,
    /// Style overrides; camelCase keys are accepted (`fontSize`).
    pub style: BTreeMap<String, String>,
}

impl HostStyle {
    /// Class attribute value of the wrapper.
    pub fn class_attr(&self) -> String {
        match self.class_name.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => format!("markdown-renderer {}", extra),
            _ => "markdown-renderer".to_string(),
        }
    }

    /// Inline style with the defaults merged under the overrides.
    ///
    /// Overrides replace a default in place; new properties follow the
    /// defaults in key order. Values that could escape the declaration
    /// (`;`, braces, angle brackets) are ignored.
    pub fn style_attr(&self) -> String {
        let overrides: BTreeMap<String, &str> = self
            .style
            .iter()
            .filter_map(|(key, value)| {
                let property = css_property_name(key)?;
                let value = value.trim();
                if value.is_empty() || value.contains([';', '{', '}', '<', '>']) {
                    log::debug!("Ignoring host style `{}: {}`", key, value);
                    return None;
                }
                Some((property, value))
            })
            .collect();

        let mut declarations: Vec<(String, &str)> = DEFAULT_HOST_STYLE
            .iter()
            .map(|(property, value)| {
                let value = overrides.get(*property).copied().unwrap_or(*value);
                (property.to_string(), value)
            })
            .collect();
        for (property, value) in &overrides {
            if !DEFAULT_HOST_STYLE.iter().any(|(p, _)| *p == property.as_str()) {
                declarations.push((property.clone(), *value));
            }
        }

        declarations
            .iter()
            .map(|(property, value)| format!("{}: {};", property, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `fontSize` → `font-size`; rejects anything that is not a property name.
fn css_property_name(key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return None;
    }
    let mut property = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            property.push('-');
            property.push(c.to_ascii_lowercase());
        } else {
            property.push(c);
        }
    }
    Some(property)
}

/// Summary of a code block found while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeOutline {
    /// Normalized language.
    pub language: String,
    /// Resolved display title.
    pub title: String,
    /// Number of lines.
    pub lines: usize,
}

impl CodeOutline {
    pub(crate) fn of(block: &CodeBlock, index: usize) -> Self {
        Self {
            language: block.language.clone(),
            title: block.resolved_title(index),
            lines: block.content.lines().count().max(1),
        }
    }
}

/// Result of rendering a document.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    /// Sanitized HTML.
    pub html: String,
    /// Non-fatal parse diagnostics.
    pub diagnostics: ParseDiagnostics,
    /// Code blocks in document order.
    pub code_blocks: Vec<CodeOutline>,
}

/// Element the renderer is currently inside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Document root.
    Root,
    /// `<p>`.
    Paragraph,
    /// `<ul>` / `<ol>`; tight lists drop paragraph wrappers.
    List {
        /// Loose list.
        spread: bool,
    },
    /// `<li>`.
    ListItem,
    /// `<table>`.
    Table,
    /// `<thead>` row.
    TableHead,
    /// `<td>` / `<th>`.
    TableCell,
    /// Inside a container body.
    Container,
}
