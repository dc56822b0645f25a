use mdview_wasm::{JsCopyButton, hydrate, render, render_document};
use serde::Deserialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    html: String,
    warnings: Vec<String>,
    code_blocks: Vec<CodeOutline>,
}

#[derive(Deserialize, Debug)]
struct CodeOutline {
    language: String,
    title: String,
    lines: usize,
}

fn options(json: &str) -> JsValue {
    js_sys::JSON::parse(json).expect("valid json")
}

#[wasm_bindgen_test]
fn render_returns_html_and_outline() {
    let result = render(":::tip [Note]\nHello\n:::\n\n```js\nrun()\n```\n", JsValue::UNDEFINED)
        .expect("render should succeed");
    let result: RenderResult = serde_wasm_bindgen::from_value(result).expect("deserialize result");

    assert!(result.html.contains("💡 Note"));
    assert!(result.warnings.is_empty());
    assert_eq!(result.code_blocks.len(), 1);
    assert_eq!(result.code_blocks[0].language, "js");
    assert_eq!(result.code_blocks[0].title, "js");
    assert_eq!(result.code_blocks[0].lines, 1);
}

#[wasm_bindgen_test]
fn render_reports_warnings() {
    let result = render(":::mystery\nx\n:::\n", JsValue::NULL).expect("render should succeed");
    let result: RenderResult = serde_wasm_bindgen::from_value(result).expect("deserialize result");
    assert!(result.html.contains("custom-container-generic"));
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("mystery"));
}

#[wasm_bindgen_test]
fn render_rejects_invalid_options() {
    assert!(render("x", options(r#"{"gfm":"yes"}"#)).is_err());
}

#[wasm_bindgen_test]
fn render_document_wraps_output() {
    let html = render_document("hi", options(r#"{"host":{"className":"post"}}"#));
    assert!(html.starts_with(r#"<div class="markdown-renderer post""#));
    assert!(html.ends_with("<p>hi</p></div>"));
    assert_eq!(render_document("", JsValue::UNDEFINED), "");
}

#[wasm_bindgen_test]
fn hydrate_uses_color_scheme() {
    let html = render_document("```rust\nfn main() {}\n```\n", JsValue::UNDEFINED);
    let hydrated = hydrate(&html, options(r#"{"colorScheme":"dark"}"#));
    assert!(hydrated.contains(r#"data-theme="dark""#));
    assert_eq!(hydrate(&hydrated, JsValue::UNDEFINED), hydrated);
}

#[wasm_bindgen_test]
fn copy_button_states() {
    let mut button = JsCopyButton::new("npm i".to_string());
    assert_eq!(button.text(), "npm i");
    assert_eq!(button.state(), "idle");
    assert_eq!(button.label(), "复制");

    let ok = js_sys::Function::new_with_args("text", "return true;");
    assert_eq!(button.copy_with(&ok, None), "copied");
    assert_eq!(button.label(), "已复制");

    let throws = js_sys::Function::new_with_args("text", "throw new Error('denied');");
    assert_eq!(button.copy_with(&throws, Some(ok)), "copied");
    assert_eq!(button.copy_with(&throws, None), "failed");
    assert_eq!(button.label(), "复制失败");

    assert_eq!(button.settle(true), "copied");
}
