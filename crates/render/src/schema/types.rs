//! Schema type definitions.

use mdview_core::MdviewError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tags that can never be allowed; their content is dropped by the sanitizer.
const FORBIDDEN_TAGS: &[&str] = &[
    "script", "style", "object", "embed", "applet", "base", "link", "meta", "frame", "frameset",
    "noscript", "template", "title",
];

/// Attributes that can never be allowed (besides every `on*` event handler).
/// `rel` is managed by the sanitizer itself.
const FORBIDDEN_ATTRIBUTES: &[&str] = &["style", "srcdoc", "rel", "formaction", "xmlns"];

const FORBIDDEN_SCHEMES: &[&str] = &["javascript", "vbscript", "data", "file"];

/// Allow-list of tags, per-tag attributes, generic attributes and URL schemes.
///
/// Built once at initialization and read-only afterwards. Extensions add to
/// the list; nothing is ever replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizationSchema {
    tags: BTreeSet<String>,
    tag_attributes: BTreeMap<String, BTreeSet<String>>,
    generic_attributes: BTreeSet<String>,
    url_schemes: BTreeSet<String>,
}

/// Host-supplied additions to the allow-list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaExtension {
    /// Extra tags.
    pub tags: Vec<String>,
    /// Extra attributes per tag (the tag is allowed as well).
    pub attributes: BTreeMap<String, Vec<String>>,
    /// Extra attributes allowed on every tag.
    pub generic_attributes: Vec<String>,
    /// Extra URL schemes.
    pub url_schemes: Vec<String>,
}

fn normalize_name(kind: &str, name: &str) -> Result<String, MdviewError> {
    let name = name.trim().to_ascii_lowercase();
    let valid = !name.is_empty()
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(MdviewError::Schema(format!("invalid {} name `{}`", kind, name)))
    }
}

fn check_attribute(name: &str) -> Result<String, MdviewError> {
    let name = normalize_name("attribute", name)?;
    if name.starts_with("on") || FORBIDDEN_ATTRIBUTES.contains(&name.as_str()) {
        return Err(MdviewError::forbidden("attribute", &name));
    }
    Ok(name)
}

impl SanitizationSchema {
    /// Schema that allows nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Allow a tag.
    pub fn allow_tag(&mut self, tag: &str) -> Result<&mut Self, MdviewError> {
        let tag = normalize_name("tag", tag)?;
        if FORBIDDEN_TAGS.contains(&tag.as_str()) {
            return Err(MdviewError::forbidden("tag", &tag));
        }
        self.tags.insert(tag);
        Ok(self)
    }

    /// Allow attributes on a tag, allowing the tag too.
    pub fn allow_attributes<'a>(
        &mut self,
        tag: &str,
        attributes: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, MdviewError> {
        let checked = attributes
            .into_iter()
            .map(check_attribute)
            .collect::<Result<Vec<_>, _>>()?;
        self.allow_tag(tag)?;
        let tag = normalize_name("tag", tag)?;
        self.tag_attributes.entry(tag).or_default().extend(checked);
        Ok(self)
    }

    /// Allow an attribute on every allowed tag.
    pub fn allow_generic_attribute(&mut self, attribute: &str) -> Result<&mut Self, MdviewError> {
        let attribute = check_attribute(attribute)?;
        self.generic_attributes.insert(attribute);
        Ok(self)
    }

    /// Allow a URL scheme in `href`/`src`-like attributes.
    pub fn allow_url_scheme(&mut self, scheme: &str) -> Result<&mut Self, MdviewError> {
        let scheme = scheme.trim().trim_end_matches(':').to_ascii_lowercase();
        if scheme.is_empty() || FORBIDDEN_SCHEMES.contains(&scheme.as_str()) {
            return Err(MdviewError::forbidden("URL scheme", &scheme));
        }
        self.url_schemes.insert(scheme);
        Ok(self)
    }

    /// Apply a host extension. Nothing is applied if any entry is rejected.
    pub fn extend(&mut self, extension: &SchemaExtension) -> Result<(), MdviewError> {
        let mut next = self.clone();
        for tag in &extension.tags {
            next.allow_tag(tag)?;
        }
        for (tag, attributes) in &extension.attributes {
            next.allow_attributes(tag, attributes.iter().map(String::as_str))?;
        }
        for attribute in &extension.generic_attributes {
            next.allow_generic_attribute(attribute)?;
        }
        for scheme in &extension.url_schemes {
            next.allow_url_scheme(scheme)?;
        }
        *self = next;
        Ok(())
    }

    /// Whether `tag` survives sanitization.
    pub fn is_tag_allowed(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_lowercase())
    }

    /// Whether `attribute` survives on `tag`.
    pub fn is_attribute_allowed(&self, tag: &str, attribute: &str) -> bool {
        let attribute = attribute.to_ascii_lowercase();
        self.generic_attributes.contains(&attribute)
            || self
                .tag_attributes
                .get(&tag.to_ascii_lowercase())
                .is_some_and(|attrs| attrs.contains(&attribute))
    }

    /// Allowed tags.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Allowed attributes per tag.
    pub fn tag_attributes(&self) -> impl Iterator<Item = (&str, impl Iterator<Item = &str>)> {
        self.tag_attributes
            .iter()
            .map(|(tag, attrs)| (tag.as_str(), attrs.iter().map(String::as_str)))
    }

    /// Attributes allowed on every tag.
    pub fn generic_attributes(&self) -> impl Iterator<Item = &str> {
        self.generic_attributes.iter().map(String::as_str)
    }

    /// Allowed URL schemes.
    pub fn url_schemes(&self) -> impl Iterator<Item = &str> {
        self.url_schemes.iter().map(String::as_str)
    }
}
