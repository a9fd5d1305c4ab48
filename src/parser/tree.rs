use std::sync::LazyLock;

use ego_tree::{NodeId, NodeRef};
use regex::Regex;
use scraper::{ElementRef, Node};

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Tags no relative lookup may cross: they open the next field or section.
const BOUNDARY_TAGS: &[&str] = &["label", "h1", "h2", "h3"];

/// Elements whose text is typed or scripted content, never form structure.
const CONTENT_TAGS: &[&str] = &["textarea", "select", "option", "script", "style"];

/// Elements that may carry an inline "Other:" / "FPS ...:" marker.
const PARAGRAPH_TAGS: &[&str] = &["p", "div", "span"];

/// Collapse whitespace runs to a single space and trim.
pub fn normalize(s: &str) -> String {
    WS_RE.replace_all(s.trim(), " ").into_owned()
}

/// Concatenated descendant text, trimmed at both ends. Inner newlines survive.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Concatenated descendant text, untouched.
pub fn raw_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Normalized text of a label-like element, ignoring whatever sits in nested controls.
pub fn label_text(el: ElementRef<'_>) -> String {
    let text: String = el
        .descendants()
        .filter_map(|n| {
            let t = n.value().as_text()?;
            (!inside_content(n, Some(el.id()))).then_some(&**t)
        })
        .collect();
    normalize(&text)
}

/// True when `node` sits inside a control's value or a script/style body. The ancestor
/// walk stops at `within` when given.
pub fn inside_content(node: NodeRef<'_, Node>, within: Option<NodeId>) -> bool {
    node.ancestors()
        .take_while(|a| Some(a.id()) != within)
        .any(|a| tag_name(a).is_some_and(|t| CONTENT_TAGS.contains(&t)))
}

pub fn tag_name<'a>(node: NodeRef<'a, Node>) -> Option<&'a str> {
    node.value().as_element().map(|e| e.name())
}

pub fn is_boundary(node: NodeRef<'_, Node>) -> bool {
    tag_name(node).is_some_and(|t| BOUNDARY_TAGS.contains(&t))
}

/// Walk the siblings after `from` until `found` yields a value or a boundary
/// element is reached. Every forward lookup in the extractors goes through here.
pub fn scan_forward<'a, T>(
    from: NodeRef<'a, Node>,
    mut found: impl FnMut(NodeRef<'a, Node>) -> Option<T>,
) -> Option<T> {
    for sibling in from.next_siblings() {
        if let Some(hit) = found(sibling) {
            return Some(hit);
        }
        if is_boundary(sibling) {
            return None;
        }
    }
    None
}

/// Next sibling element named `tag`, never past a boundary.
pub fn next_control<'a>(from: NodeRef<'a, Node>, tag: &str) -> Option<ElementRef<'a>> {
    scan_forward(from, |n| ElementRef::wrap(n).filter(|el| el.value().name() == tag))
}

/// Locate the control that belongs to an anchor.
///
/// Same layering as label resolution, inverted: a following sibling first, then a
/// control enclosed by the anchor, then one following the anchor's wrapper when the
/// anchor is the last element inside it.
pub fn control_for<'a>(anchor: NodeRef<'a, Node>, tag: &str) -> Option<ElementRef<'a>> {
    if let Some(el) = next_control(anchor, tag) {
        return Some(el);
    }
    if let Some(el) = ElementRef::wrap(anchor).and_then(|a| first_within(a, tag)) {
        return Some(el);
    }
    if !has_following_element(anchor) {
        return anchor.parent().and_then(|p| next_control(p, tag));
    }
    None
}

/// First descendant named `tag`, excluding `el` itself.
pub fn first_within<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.descendent_elements()
        .skip(1)
        .find(|d| d.value().name() == tag)
}

fn has_following_element(node: NodeRef<'_, Node>) -> bool {
    node.next_siblings()
        .any(|s| tag_name(s).is_some_and(|t| t != "br"))
}

/// Text of the option flagged `selected`, or "".
pub fn selected_option(select: ElementRef<'_>) -> String {
    select
        .descendent_elements()
        .find(|el| el.value().name() == "option" && el.value().attr("selected").is_some())
        .map(text_of)
        .unwrap_or_default()
}

/// Paragraph-like element (or bare text node) whose text starts with `marker`.
/// Returns the node the marker lives in.
pub fn find_marker<'a>(from: NodeRef<'a, Node>, marker: &str) -> Option<NodeRef<'a, Node>> {
    scan_forward(from, |n| match n.value() {
        Node::Text(t) if t.trim_start().starts_with(marker) => Some(n),
        Node::Element(e) if PARAGRAPH_TAGS.contains(&e.name()) => ElementRef::wrap(n)
            .filter(|el| normalize(&raw_text(*el)).starts_with(marker))
            .map(|_| n),
        _ => None,
    })
}

/// Control that goes with a marker: enclosed by it, or the next sibling after it.
pub fn marked_control<'a>(marker: NodeRef<'a, Node>, tag: &str) -> Option<ElementRef<'a>> {
    ElementRef::wrap(marker)
        .and_then(|el| first_within(el, tag))
        .or_else(|| next_control(marker, tag))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first<'a>(html: &'a Html, tag: &str) -> ElementRef<'a> {
        html.root_element()
            .descendent_elements()
            .find(|el| el.value().name() == tag)
            .unwrap()
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Director(s)\n   of  Photography: "), "Director(s) of Photography:");
    }

    #[test]
    fn next_control_stops_at_label() {
        let html = Html::parse_document(
            "<label>Title</label><label>Language</label><textarea>English</textarea>",
        );
        let label = first(&html, "label");
        assert!(next_control(*label, "textarea").is_none());
    }

    #[test]
    fn next_control_skips_text_and_other_tags() {
        let html = Html::parse_document(
            "<label>Camera:</label> text <br><button>x</button><textarea>Arri</textarea>",
        );
        let label = first(&html, "label");
        assert_eq!(text_of(next_control(*label, "textarea").unwrap()), "Arri");
    }

    #[test]
    fn control_enclosed_by_anchor() {
        let html = Html::parse_document("<label>Camera: <textarea>Red</textarea></label>");
        let label = first(&html, "label");
        assert_eq!(text_of(control_for(*label, "textarea").unwrap()), "Red");
    }

    #[test]
    fn control_after_wrapper() {
        let html = Html::parse_document(
            "<div><span><label>Camera:</label></span><textarea>Sony</textarea></div>",
        );
        let label = first(&html, "label");
        assert_eq!(text_of(control_for(*label, "textarea").unwrap()), "Sony");
    }

    #[test]
    fn selected_option_or_empty() {
        let html = Html::parse_document(
            "<select><option>Yes</option><option selected> No </option></select>",
        );
        assert_eq!(selected_option(first(&html, "select")), "No");

        let html = Html::parse_document("<select><option>Yes</option></select>");
        assert_eq!(selected_option(first(&html, "select")), "");
    }

    #[test]
    fn marker_in_paragraph() {
        let html = Html::parse_document(
            "<select></select><button>+</button><p>Other: <textarea>Noir</textarea></p>",
        );
        let select = first(&html, "select");
        let marker = find_marker(*select, "Other:").unwrap();
        assert_eq!(text_of(marked_control(marker, "textarea").unwrap()), "Noir");
    }

    #[test]
    fn marker_as_bare_text() {
        let html = Html::parse_document(
            "<div><select></select> Other: <textarea>16mm</textarea></div>",
        );
        let select = first(&html, "select");
        let marker = find_marker(*select, "Other:").unwrap();
        assert_eq!(text_of(marked_control(marker, "textarea").unwrap()), "16mm");
    }

    #[test]
    fn marker_scan_stops_at_boundary() {
        let html = Html::parse_document(
            "<select></select><label>Keywords (story topics)</label><p>Other: <textarea>x</textarea></p>",
        );
        let select = first(&html, "select");
        assert!(find_marker(*select, "Other:").is_none());
    }

    #[test]
    fn label_text_skips_control_content() {
        let html = Html::parse_document("<label> Camera: <textarea>Arri</textarea></label>");
        assert_eq!(label_text(first(&html, "label")), "Camera:");
    }

    #[test]
    fn content_text_is_detected() {
        let html = Html::parse_document(
            "<p>Runtime<textarea>typed</textarea><script>var x;</script></p>",
        );
        let p = first(&html, "p");
        let flags: Vec<bool> = p
            .descendants()
            .filter(|n| n.value().is_text())
            .map(|n| inside_content(n, None))
            .collect();
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn text_keeps_inner_newlines() {
        let html = Html::parse_document("<textarea>\n  Alice\nBob  \n</textarea>");
        assert_eq!(text_of(first(&html, "textarea")), "Alice\nBob");
    }
}
