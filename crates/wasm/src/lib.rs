use mdview_render::clipboard::{Clipboard, ClipboardError, CopyButton};
use mdview_render::{CodeOutline, HydrateOptions, RenderOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

// ============================================================================
// Options
// ============================================================================

fn parse_options<T: DeserializeOwned + Default>(options: JsValue) -> Result<T, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))
}

/// Lenient variant for the entry points that never fail.
fn parse_options_or_default<T: DeserializeOwned + Default>(options: JsValue) -> T {
    parse_options(options).unwrap_or_else(|_| {
        log::warn!("Ignoring invalid options");
        T::default()
    })
}

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

// ============================================================================
// Render API
// ============================================================================

/// Result of [`render`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    /// Sanitized HTML with static code blocks.
    pub html: String,
    /// Parse diagnostics as messages.
    pub warnings: Vec<String>,
    /// Code blocks in document order.
    pub code_blocks: Vec<CodeOutline>,
}

/// Renders markdown to sanitized HTML.
///
/// # Arguments
///
/// * `source` - The markdown source
/// * `options` - Optional `RenderOptions` (camelCase keys)
///
/// # Returns
///
/// A `RenderResult` object with `html`, `warnings` and `codeBlocks`.
#[wasm_bindgen]
pub fn render(source: &str, options: JsValue) -> Result<JsValue, JsError> {
    let options: RenderOptions = parse_options(options)?;
    let rendered = mdview_render::render_markdown(source, &options)
        .map_err(|e| JsError::new(&e.to_string()))?;

    let result = RenderResult {
        html: rendered.html,
        warnings: rendered.diagnostics.messages(),
        code_blocks: rendered.code_blocks,
    };
    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Renders markdown inside the `markdown-renderer` wrapper. Never throws;
/// failures render an inline error message.
#[wasm_bindgen(js_name = renderDocument)]
pub fn render_document(source: &str, options: JsValue) -> String {
    let options: RenderOptions = parse_options_or_default(options);
    mdview_render::render_document(source, &options)
}

/// Upgrades static code blocks and code groups into widgets. Never throws;
/// on failure the input comes back unchanged.
#[wasm_bindgen]
pub fn hydrate(html: &str, options: JsValue) -> String {
    let options: HydrateOptions = parse_options_or_default(options);
    mdview_render::hydrate(html, &options)
}

// ============================================================================
// Copy button
// ============================================================================

/// A JS function used as a clipboard: called with the text, it succeeds
/// unless it throws or returns `false`.
struct JsClipboard<'a>(&'a js_sys::Function);

impl Clipboard for JsClipboard<'_> {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        match self.0.call1(&JsValue::NULL, &JsValue::from_str(text)) {
            Ok(value) if value.as_bool() == Some(false) => Err(ClipboardError::Denied),
            Ok(_) => Ok(()),
            Err(err) => Err(ClipboardError::Failed(
                err.as_string().unwrap_or_else(|| format!("{:?}", err)),
            )),
        }
    }
}

/// Copy-button state for one code block.
///
/// For the asynchronous Clipboard API, call `settle` once the promise
/// resolves or rejects; `copyWith` is for synchronous writers such as the
/// `execCommand("copy")` fallback.
#[wasm_bindgen(js_name = CopyButton)]
pub struct JsCopyButton {
    inner: CopyButton,
}

#[wasm_bindgen(js_class = CopyButton)]
impl JsCopyButton {
    /// Button copying `text`.
    #[wasm_bindgen(constructor)]
    pub fn new(text: String) -> JsCopyButton {
        JsCopyButton {
            inner: CopyButton::new(text),
        }
    }

    /// Text to copy.
    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.inner.text().to_string()
    }

    /// Copy with `primary`, falling back to `fallback`. Returns the new state.
    #[wasm_bindgen(js_name = copyWith)]
    pub fn copy_with(
        &mut self,
        primary: &js_sys::Function,
        fallback: Option<js_sys::Function>,
    ) -> String {
        let primary = JsClipboard(primary);
        let fallback = fallback.as_ref().map(JsClipboard);
        self.inner
            .copy(
                &primary,
                fallback.as_ref().map(|f| f as &dyn Clipboard),
                now_ms(),
            )
            .as_str()
            .to_string()
    }

    /// Record the outcome of an asynchronous copy. Returns the new state.
    pub fn settle(&mut self, success: bool) -> String {
        self.inner.settle(success, now_ms()).as_str().to_string()
    }

    /// Current state: `idle`, `copied` or `failed`.
    pub fn state(&mut self) -> String {
        self.inner.state_at(now_ms()).as_str().to_string()
    }

    /// Current button label.
    pub fn label(&mut self) -> String {
        self.inner.state_at(now_ms()).label().to_string()
    }

    /// Current notice, if the last copy has just finished.
    pub fn message(&mut self) -> Option<String> {
        self.inner
            .state_at(now_ms())
            .message()
            .map(str::to_string)
    }
}
