//! Human-readable names for form controls.
//!
//! The field table anchors on known labels and never calls this; `inspect` does, to show
//! how every control in a document would be named.

use std::iter;

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

use crate::document::Form;
use crate::parser::tree::{label_text, normalize, raw_text, selected_option, tag_name, text_of};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3"];

fn is_heading(node: NodeRef<'_, Node>) -> bool {
    tag_name(node).is_some_and(|t| HEADING_TAGS.contains(&t))
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Best-effort label for a control. Never fails: the last resort is the tag name.
pub fn resolve_label(form: &Form, anchor: ElementRef<'_>) -> String {
    preceding_label(anchor)
        .or_else(|| wrapping_label(anchor))
        .or_else(|| referencing_label(form, anchor))
        .or_else(|| attribute(anchor, "placeholder"))
        .or_else(|| attribute(anchor, "name"))
        .or_else(|| section_heading(anchor))
        .unwrap_or_else(|| anchor.value().name().to_string())
}

/// Closest earlier sibling `<label>`, not looking past a heading.
fn preceding_label(anchor: ElementRef<'_>) -> Option<String> {
    anchor
        .prev_siblings()
        .take_while(|n| !is_heading(*n))
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "label")
        .map(label_text)
        .and_then(non_empty)
}

fn wrapping_label(anchor: ElementRef<'_>) -> Option<String> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "label")
        .map(label_text)
        .and_then(non_empty)
}

fn referencing_label(form: &Form, anchor: ElementRef<'_>) -> Option<String> {
    let id = anchor.value().id()?;
    form.label_for(id).map(label_text).and_then(non_empty)
}

fn attribute(anchor: ElementRef<'_>, name: &str) -> Option<String> {
    anchor
        .value()
        .attr(name)
        .map(normalize)
        .and_then(non_empty)
}

/// Nearest heading before the anchor at its own level or any ancestor's level.
/// A previous sibling that contains a heading ends the search: that heading belongs to
/// an earlier block, not to this control.
pub fn section_heading(anchor: ElementRef<'_>) -> Option<String> {
    for node in iter::once(*anchor).chain(anchor.ancestors()) {
        for sibling in node.prev_siblings() {
            if is_heading(sibling) {
                return ElementRef::wrap(sibling)
                    .map(|h| normalize(&text_of(h)))
                    .and_then(non_empty);
            }
            if sibling.descendants().any(is_heading) {
                return None;
            }
        }
    }
    None
}

/// A control as `inspect` reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlInfo {
    pub tag: String,
    pub label: String,
    pub section: String,
    pub value: String,
}

pub fn describe_controls(form: &Form) -> Vec<ControlInfo> {
    form.controls()
        .map(|el| ControlInfo {
            tag: el.value().name().to_string(),
            label: resolve_label(form, el),
            section: section_heading(el).unwrap_or_default(),
            value: current_value(el),
        })
        .collect()
}

fn current_value(el: ElementRef<'_>) -> String {
    match el.value().name() {
        "select" => selected_option(el),
        "input" => el.value().attr("value").unwrap_or_default().trim().to_string(),
        _ => raw_text(el).trim().to_string(),
    }
}

// ── Tests ──
