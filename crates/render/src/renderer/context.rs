//! Rendering context for the HTML renderer.

use super::RenderOptions;
use super::types::Scope;

/// Output buffer plus the stack of elements being rendered.
pub struct Context<'a> {
    html: String,
    stack: Vec<Scope>,
    options: &'a RenderOptions,
}

impl<'a> Context<'a> {
    /// Creates an empty context.
    pub fn new(options: &'a RenderOptions) -> Self {
        Self {
            html: String::with_capacity(4096),
            stack: vec![Scope::Root],
            options,
        }
    }

    /// Writes markup verbatim.
    pub fn push_raw(&mut self, s: &str) {
        self.html.push_str(s);
    }

    /// Writes text content, escaping `<`, `>` and `&`.
    pub fn push_text(&mut self, s: &str) {
        html_escape::encode_text_to_string(s, &mut self.html);
    }

    /// Writes an escaped double-quoted attribute value (without the quotes).
    pub fn push_attr_value(&mut self, s: &str) {
        html_escape::encode_double_quoted_attribute_to_string(s, &mut self.html);
    }

    /// Writes ` name="value"`.
    pub fn push_attr(&mut self, name: &str, value: &str) {
        self.html.push(' ');
        self.html.push_str(name);
        self.html.push_str("=\"");
        self.push_attr_value(value);
        self.html.push('"');
    }

    /// Writes ` name="value"` when a value is present.
    pub fn push_opt_attr(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.push_attr(name, value);
        }
    }

    /// Returns the innermost scope.
    pub fn current_scope(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::Root)
    }

    /// Returns true if the innermost list is tight.
    ///
    /// Paragraphs directly inside items of a tight list render without `<p>`.
    pub fn is_in_tight_list(&self) -> bool {
        self.current_scope() == Scope::ListItem
            && self
                .stack
                .iter()
                .rev()
                .find(|scope| matches!(scope, Scope::List { .. }))
                .is_some_and(|scope| matches!(scope, Scope::List { spread: false }))
    }

    /// Returns true inside a table header row.
    pub fn is_in_table_head(&self) -> bool {
        self.stack.contains(&Scope::TableHead)
    }

    /// Enters a new scope.
    pub fn enter(&mut self, scope: Scope) {
        self.stack.push(scope);
    }

    /// Exits the current scope. The root scope is never popped.
    pub fn exit(&mut self) -> Option<Scope> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Whether images get `loading="lazy"`.
    pub fn lazy_images_enabled(&self) -> bool {
        self.options.enable_lazy_images
    }

    /// Whether raw HTML nodes are emitted as markup (the sanitizer still runs).
    pub fn raw_html_allowed(&self) -> bool {
        self.options.allow_raw_html
    }

    /// Consumes the context and returns the rendered HTML.
    pub fn finish(self) -> String {
        self.html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_and_attributes() {
        let options = RenderOptions::default();
        let mut ctx = Context::new(&options);
        ctx.push_raw("<p");
        ctx.push_attr("title", "a \"b\" <c>");
        ctx.push_raw(">");
        ctx.push_text("1 < 2 & 3");
        ctx.push_raw("</p>");
        assert_eq!(
            ctx.finish(),
            "<p title=\"a &quot;b&quot; &lt;c&gt;\">1 &lt; 2 &amp; 3</p>"
        );
    }

    #[test]
    fn tight_list_detection() {
        let options = RenderOptions::default();
        let mut ctx = Context::new(&options);
        assert!(!ctx.is_in_tight_list());
        ctx.enter(Scope::List { spread: false });
        ctx.enter(Scope::ListItem);
        assert!(ctx.is_in_tight_list());
        ctx.enter(Scope::Container);
        assert!(!ctx.is_in_tight_list());
        ctx.exit();
        ctx.exit();
        ctx.exit();
        ctx.enter(Scope::List { spread: true });
        ctx.enter(Scope::ListItem);
        assert!(!ctx.is_in_tight_list());
        ctx.exit();
        ctx.exit();
        assert_eq!(ctx.exit(), None);
    }
}
