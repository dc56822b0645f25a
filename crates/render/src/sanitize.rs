//! HTML sanitization against a [`SanitizationSchema`].
//!
//! The actual cleaning is done by `ammonia`; this module only translates the
//! schema into an `ammonia::Builder`. Cleaning is deterministic and never
//! fails: anything not on the allow-list is dropped.

use crate::schema::{STANDARD_SCHEMA, SanitizationSchema};
use ammonia::Builder;
use std::collections::{HashMap, HashSet};

/// `rel` value forced onto every link.
pub const LINK_REL: &str = "noopener noreferrer";

/// Cleans HTML fragments with a borrowed schema.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'a> {
    schema: &'a SanitizationSchema,
}

impl<'a> Sanitizer<'a> {
    /// Sanitizer for `schema`.
    pub fn new(schema: &'a SanitizationSchema) -> Self {
        Self { schema }
    }

    /// The schema in use.
    pub fn schema(&self) -> &'a SanitizationSchema {
        self.schema
    }

    fn builder(&self) -> Builder<'a> {
        let tags: HashSet<&'a str> = self.schema.tags().collect();
        let tag_attributes: HashMap<&'a str, HashSet<&'a str>> = self
            .schema
            .tag_attributes()
            .map(|(tag, attributes)| (tag, attributes.collect()))
            .collect();

        let mut builder = Builder::default();
        builder
            .tags(tags)
            .tag_attributes(tag_attributes)
            .generic_attributes(self.schema.generic_attributes().collect())
            .url_schemes(self.schema.url_schemes().collect())
            .link_rel(Some(LINK_REL))
            .strip_comments(true);
        builder
    }

    /// Clean `html`. Unlisted tags are removed (`script`/`style` together
    /// with their content), unlisted attributes dropped and URLs filtered.
    pub fn clean(&self, html: &str) -> String {
        if html.is_empty() {
            return String::new();
        }
        self.builder().clean(html).to_string()
    }
}

impl Sanitizer<'static> {
    /// Sanitizer using the process-wide standard schema.
    pub fn standard() -> Self {
        Sanitizer::new(&STANDARD_SCHEMA)
    }
}

/// Clean `html` with the standard schema.
pub fn sanitize(html: &str) -> String {
    Sanitizer::standard().clean(html)
}
