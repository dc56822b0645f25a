//! Upgrades static code blocks and code groups into interactive widgets.
//!
//! Two streaming passes with `lol_html`:
//!
//! 1. Tag every `pre` and `div.code-group` with a slot id and collect what
//!    the widget needs (language, explicit title, source text, group
//!    membership, whether it is already hydrated).
//! 2. Replace each eligible slot once with its widget; strip the slot ids
//!    everywhere else.
//!
//! Markup that was already hydrated has no eligible slots, so running the
//! pass twice is the same as running it once.

use crate::code_group::{CodeGroupEntry, build_code_group};
use crate::highlight::{ColorScheme, Highlighter};
use crate::widget::code_widget;
use lol_html::html_content::{ContentType, Element};
use lol_html::{RewriteStrSettings, element, end_tag, rewrite_str, text};
use mdview_core::{FALLBACK_LANGUAGE, MdviewError, language_from_class};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

const SLOT_ATTR: &str = "data-mdview-slot";
const GROUP_ATTR: &str = "data-mdview-group";

/// Distinguishes slot ids of concurrent or nested calls.
static GENERATION: AtomicU64 = AtomicU64::new(0);

/// Hydration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HydrateOptions {
    /// Theme family, chosen once per call.
    #[serde(alias = "theme")]
    pub color_scheme: ColorScheme,
    /// Show the line-number gutter.
    pub line_numbers: bool,
}

impl Default for HydrateOptions {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Light,
            line_numbers: true,
        }
    }
}

impl HydrateOptions {
    /// Highlighter configured from these options.
    pub fn highlighter(&self) -> Highlighter {
        Highlighter::new(self.color_scheme).with_line_numbers(self.line_numbers)
    }
}

#[derive(Debug, Default)]
struct Slot {
    language: Option<String>,
    title: Option<String>,
    raw_code: String,
    has_code: bool,
    in_widget: bool,
    group: Option<usize>,
}

impl Slot {
    fn is_standalone(&self) -> bool {
        self.has_code && !self.in_widget && self.group.is_none()
    }

    /// Source text exactly as the static block carries it.
    fn content(&self) -> String {
        html_escape::decode_html_entities(&self.raw_code).into_owned()
    }

    fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(FALLBACK_LANGUAGE)
    }

    fn entry(&self) -> CodeGroupEntry {
        CodeGroupEntry {
            language: self.language.clone(),
            title: self.title.clone(),
            content: self.content(),
            has_code: self.has_code,
        }
    }
}

#[derive(Debug, Default)]
struct GroupSlot {
    title: Option<String>,
    hydrated: bool,
    members: Vec<usize>,
}

#[derive(Debug, Default)]
struct Scan {
    slots: Vec<Slot>,
    groups: Vec<GroupSlot>,
    current_slot: Option<usize>,
    /// Open `div.code-group` elements, innermost last.
    open_groups: Vec<usize>,
}

impl Scan {
    fn current_slot_mut(&mut self) -> Option<&mut Slot> {
        self.current_slot.and_then(|index| self.slots.get_mut(index))
    }

    fn has_eligible(&self) -> bool {
        self.slots.iter().any(Slot::is_standalone) || self.groups.iter().any(|g| !g.hydrated)
    }

    fn group_html(&self, group: &GroupSlot, highlighter: &Highlighter) -> String {
        let entries: Vec<CodeGroupEntry> = group
            .members
            .iter()
            .filter_map(|&index| self.slots.get(index))
            .map(Slot::entry)
            .collect();
        build_code_group(group.title.as_deref(), &entries).to_html(highlighter)
    }
}

fn slot_id(generation: u64, index: usize) -> String {
    format!("{}:{}", generation, index)
}

/// Index of a slot id, only if it belongs to `generation`.
fn slot_of(id: &str, generation: u64) -> Option<usize> {
    let (slot_generation, index) = id.split_once(':')?;
    if slot_generation.parse::<u64>().ok()? != generation {
        return None;
    }
    index.parse().ok()
}

fn has_class(class: Option<String>, name: &str) -> bool {
    class.is_some_and(|class| class.split_whitespace().any(|c| c == name))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Hydrates `html`; on any rewriter failure the input is returned unchanged.
pub fn hydrate(html: &str, options: &HydrateOptions) -> String {
    match try_hydrate(html, options) {
        Ok(Some(hydrated)) => hydrated,
        Ok(None) => html.to_string(),
        Err(err) => {
            log::warn!("Code block hydration failed: {}", err);
            html.to_string()
        }
    }
}

/// Hydrates `html`, returning `None` when nothing is eligible.
pub fn try_hydrate(html: &str, options: &HydrateOptions) -> Result<Option<String>, MdviewError> {
    let generation = GENERATION.fetch_add(1, Ordering::Relaxed) + 1;
    let (tagged, scan) = scan(html, generation)?;
    if !scan.has_eligible() {
        return Ok(None);
    }
    log::debug!(
        "Hydrating {} code blocks in {} groups",
        scan.slots.len(),
        scan.groups.len()
    );
    replace(&tagged, generation, &scan, &options.highlighter()).map(Some)
}

fn scan(html: &str, generation: u64) -> Result<(String, Scan), MdviewError> {
    let state = Rc::new(RefCell::new(Scan::default()));

    let tagged = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("pre", |el| {
                    let mut scan = state.borrow_mut();
                    let index = scan.slots.len();
                    let language = el
                        .get_attribute("class")
                        .as_deref()
                        .and_then(language_from_class)
                        .or_else(|| non_empty(el.get_attribute("data-language")));
                    scan.slots.push(Slot {
                        language,
                        title: non_empty(el.get_attribute("data-title")),
                        ..Slot::default()
                    });
                    scan.current_slot = Some(index);
                    el.set_attribute(SLOT_ATTR, &slot_id(generation, index))?;
                    Ok(())
                }),
                element!(".code-block-hydrated pre", |_el| {
                    if let Some(slot) = state.borrow_mut().current_slot_mut() {
                        slot.in_widget = true;
                    }
                    Ok(())
                }),
                element!("div.code-group", |el: &mut Element| {
                    let index = {
                        let mut scan = state.borrow_mut();
                        let index = scan.groups.len();
                        scan.groups.push(GroupSlot {
                            title: non_empty(el.get_attribute("data-title")),
                            hydrated: has_class(el.get_attribute("class"), "code-group-hydrated"),
                            members: Vec::new(),
                        });
                        scan.open_groups.push(index);
                        index
                    };
                    el.set_attribute(GROUP_ATTR, &slot_id(generation, index))?;
                    let closing = Rc::clone(&state);
                    el.on_end_tag(end_tag!(move |_end| {
                        closing.borrow_mut().open_groups.pop();
                        Ok(())
                    }))?;
                    Ok(())
                }),
                element!("div.code-group pre", |_el| {
                    let mut scan = state.borrow_mut();
                    let Some(slot) = scan.current_slot else {
                        return Ok(());
                    };
                    // Nested groups fold into the outermost one, which
                    // replaces them all.
                    let open = scan.open_groups.clone();
                    if let Some(entry) = scan.slots.get_mut(slot) {
                        entry.group = open.last().copied();
                    }
                    for group in open {
                        if let Some(entry) = scan.groups.get_mut(group) {
                            entry.members.push(slot);
                        }
                    }
                    Ok(())
                }),
                element!("pre > code", |el| {
                    let language = el
                        .get_attribute("class")
                        .as_deref()
                        .and_then(language_from_class);
                    let title = non_empty(el.get_attribute("data-title"))
                        .or_else(|| non_empty(el.get_attribute("title")));
                    if let Some(slot) = state.borrow_mut().current_slot_mut() {
                        slot.has_code = true;
                        if language.is_some() {
                            slot.language = language;
                        }
                        if title.is_some() {
                            slot.title = title;
                        }
                    }
                    Ok(())
                }),
                text!("pre > code", |chunk| {
                    if let Some(slot) = state.borrow_mut().current_slot_mut() {
                        slot.raw_code.push_str(chunk.as_str());
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| MdviewError::Rewrite(err.to_string()))?;

    let scan = std::mem::take(&mut *state.borrow_mut());
    Ok((tagged, scan))
}

fn replace(
    tagged: &str,
    generation: u64,
    scan: &Scan,
    highlighter: &Highlighter,
) -> Result<String, MdviewError> {
    rewrite_str(
        tagged,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("pre[data-mdview-slot]", |el| {
                    let slot = el
                        .get_attribute(SLOT_ATTR)
                        .and_then(|id| slot_of(&id, generation))
                        .and_then(|index| scan.slots.get(index));
                    el.remove_attribute(SLOT_ATTR);
                    if let Some(slot) = slot
                        && slot.is_standalone()
                    {
                        let widget = code_widget(
                            &slot.content(),
                            slot.language(),
                            slot.title.as_deref(),
                            highlighter,
                        );
                        el.replace(&widget, ContentType::Html);
                    }
                    Ok(())
                }),
                element!("div[data-mdview-group]", |el| {
                    let group = el
                        .get_attribute(GROUP_ATTR)
                        .and_then(|id| slot_of(&id, generation))
                        .and_then(|index| scan.groups.get(index));
                    el.remove_attribute(GROUP_ATTR);
                    if let Some(group) = group
                        && !group.hydrated
                    {
                        el.replace(&scan.group_html(group, highlighter), ContentType::Html);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| MdviewError::Rewrite(err.to_string()))
}
