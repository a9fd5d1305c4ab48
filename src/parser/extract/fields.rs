use ego_tree::NodeRef;
use scraper::{ElementRef, Node};
use serde_json::{Map, Value};
use tracing::trace;

use super::text::{empty_address, parse_address_block, split_lines};
use crate::document::{Form, Scope};
use crate::parser::schema::{Anchor, Field, Pattern, OTHER_MARKER};
use crate::parser::tree::{
    control_for, find_marker, marked_control, next_control, raw_text, selected_option, text_of,
};

/// Value a step yields when its control is missing.
pub fn default_value(pattern: Pattern) -> Value {
    match pattern {
        Pattern::Lines | Pattern::Choices => Value::Array(Vec::new()),
        Pattern::Address => Value::Object(empty_address()),
        _ => Value::String(String::new()),
    }
}

pub fn resolve_anchor<'a>(form: &'a Form, anchor: Anchor, scope: Scope) -> Option<NodeRef<'a, Node>> {
    match anchor {
        Anchor::Label(text) => form.label(text, scope).map(|el| *el),
        Anchor::Heading(text) => form.heading(text).map(|el| *el),
        Anchor::Prompt(text) => form.text_node(text, scope),
        Anchor::Id(id) => form.by_id(id).map(|el| *el),
        Anchor::Placeholder(text) => form.with_placeholder("textarea", text, scope).map(|el| *el),
    }
}

/// Run a field's steps and merge the outputs into `out`, inline or nested.
pub fn extract_field(form: &Form, scope: Scope, field: &Field, out: &mut Map<String, Value>) {
    let values = match resolve_anchor(form, field.anchor, scope) {
        Some(anchor) => run_steps(anchor, field.steps),
        None => {
            trace!(anchor = ?field.anchor, "anchor not found");
            default_steps(field.steps)
        }
    };
    match field.nest {
        Some(key) => {
            out.insert(key.to_string(), Value::Object(values));
        }
        None => out.extend(values),
    }
}

pub fn default_field(field: &Field, out: &mut Map<String, Value>) {
    let values = default_steps(field.steps);
    match field.nest {
        Some(key) => {
            out.insert(key.to_string(), Value::Object(values));
        }
        None => out.extend(values),
    }
}

/// Single value hanging off one anchor (logline, filmography, ...).
pub fn extract_value(form: &Form, scope: Scope, anchor: Anchor, pattern: Pattern) -> Value {
    resolve_anchor(form, anchor, scope)
        .map(|node| apply(node, None, pattern).0)
        .unwrap_or_else(|| default_value(pattern))
}

fn default_steps(steps: &[(&str, Pattern)]) -> Map<String, Value> {
    steps
        .iter()
        .map(|(key, pattern)| (key.to_string(), default_value(*pattern)))
        .collect()
}

fn run_steps(anchor: NodeRef<'_, Node>, steps: &[(&str, Pattern)]) -> Map<String, Value> {
    let mut values = Map::new();
    let mut cursor = None;
    for (key, pattern) in steps {
        let (value, found) = apply(anchor, cursor, *pattern);
        if found.is_some() {
            cursor = found;
        }
        values.insert(key.to_string(), value);
    }
    values
}

/// First step looks around the anchor; later ones continue after the last control
/// found, so a missing control leaves the rest of the run where it was.
fn locate<'a>(
    anchor: NodeRef<'a, Node>,
    cursor: Option<NodeRef<'a, Node>>,
    tag: &str,
) -> Option<ElementRef<'a>> {
    match cursor {
        None => control_for(anchor, tag),
        Some(at) => next_control(at, tag),
    }
}

fn apply<'a>(
    anchor: NodeRef<'a, Node>,
    cursor: Option<NodeRef<'a, Node>>,
    pattern: Pattern,
) -> (Value, Option<NodeRef<'a, Node>>) {
    let textarea = || locate(anchor, cursor, "textarea");
    let found = |el: Option<ElementRef<'a>>| el.map(|e| *e);

    match pattern {
        Pattern::Text => {
            let el = textarea();
            (string(el.map(text_of)), found(el))
        }
        Pattern::Lines => {
            let el = textarea();
            let lines = el.map(|e| split_lines(&raw_text(e))).unwrap_or_default();
            (Value::from(lines), found(el))
        }
        Pattern::Address => {
            let el = textarea();
            let block = el
                .map(|e| parse_address_block(&raw_text(e)))
                .unwrap_or_else(empty_address);
            (Value::Object(block), found(el))
        }
        Pattern::Choice => {
            let el = locate(anchor, cursor, "select");
            (string(el.map(selected_option)), found(el))
        }
        Pattern::Own => (string(ElementRef::wrap(anchor).map(text_of)), None),
        Pattern::Choices => {
            let picks: Vec<String> = ElementRef::wrap(anchor)
                .into_iter()
                .flat_map(|el| el.descendent_elements().skip(1))
                .filter(|el| el.value().name() == "select")
                .map(selected_option)
                .filter(|s| !s.is_empty())
                .collect();
            (Value::from(picks), None)
        }
        Pattern::Marked(marker) => marked(anchor, cursor, marker, "select", selected_option),
        Pattern::Other => marked(anchor, cursor, OTHER_MARKER, "textarea", text_of),
    }
}

fn marked<'a>(
    anchor: NodeRef<'a, Node>,
    cursor: Option<NodeRef<'a, Node>>,
    marker: &str,
    tag: &str,
    read: fn(ElementRef<'_>) -> String,
) -> (Value, Option<NodeRef<'a, Node>>) {
    match find_marker(cursor.unwrap_or(anchor), marker) {
        Some(at) => (string(marked_control(at, tag).map(read)), Some(at)),
        None => (Value::String(String::new()), None),
    }
}

fn string(text: Option<String>) -> Value {
    Value::String(text.unwrap_or_default())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::Pattern::*;
    use serde_json::json;

    fn run(markup: &str, field: &Field) -> Value {
        let form = Form::parse(markup);
        let mut out = Map::new();
        extract_field(&form, form.everywhere(), field, &mut out);
        Value::Object(out)
    }

    const TITLE: Field = Field {
        anchor: Anchor::Label("Title"),
        steps: &[("Original", Text), ("English", Text), ("Other", Text)],
        nest: None,
    };

    #[test]
    fn fixed_arity_fills_every_position() {
        let value = run(
            "<label>Title</label><textarea>Izvorni</textarea><textarea>Original</textarea><textarea>X</textarea>",
            &TITLE,
        );
        assert_eq!(value, json!({ "Original": "Izvorni", "English": "Original", "Other": "X" }));
    }

    #[test]
    fn fixed_arity_short_run_pads_with_empty() {
        let value = run(
            "<label>Title</label><textarea>Only</textarea><label>Language</label><textarea>hr</textarea>",
            &TITLE,
        );
        assert_eq!(value, json!({ "Original": "Only", "English": "", "Other": "" }));
    }

    #[test]
    fn missing_anchor_gives_defaults() {
        let value = run("<p>nothing here</p>", &TITLE);
        assert_eq!(value, json!({ "Original": "", "English": "", "Other": "" }));
    }

    #[test]
    fn nested_choices_with_other() {
        let field = Field {
            anchor: Anchor::Label("Target group"),
            steps: &[("Rating", Choice), ("Audience", Choice), ("Other", Other)],
            nest: Some("Target_Group"),
        };
        let value = run(
            "<label>Target group</label>\
             <select><option selected>12+</option></select>\
             <select><option>Kids</option><option selected>Adults</option></select>\
             <p>Other: <textarea>Cinephiles</textarea></p>",
            &field,
        );
        assert_eq!(
            value,
            json!({ "Target_Group": { "Rating": "12+", "Audience": "Adults", "Other": "Cinephiles" } })
        );
    }

    #[test]
    fn other_scan_does_not_cross_next_label() {
        let field = Field {
            anchor: Anchor::Label("Colour"),
            steps: &[("Colour", Choice), ("Colour_Other", Other)],
            nest: None,
        };
        let value = run(
            "<label>Colour</label><select><option selected>B/W</option></select>\
             <label>Notes</label><p>Other: <textarea>leak</textarea></p>",
            &field,
        );
        assert_eq!(value, json!({ "Colour": "B/W", "Colour_Other": "" }));
    }

    #[test]
    fn marked_select_then_other() {
        let field = Field {
            anchor: Anchor::Label("Speed"),
            steps: &[
                ("Scan_Method", Choice),
                ("FPS", Marked("FPS (frame per second):")),
                ("FPS_Other", Other),
            ],
            nest: None,
        };
        let value = run(
            "<label>Speed</label><select><option selected>Progressive</option></select>\
             <p>FPS (frame per second): <select><option selected>25</option></select></p>\
             <p>Other: <textarea>23.976</textarea></p>",
            &field,
        );
        assert_eq!(
            value,
            json!({ "Scan_Method": "Progressive", "FPS": "25", "FPS_Other": "23.976" })
        );
    }

    #[test]
    fn choices_skip_unselected() {
        let field = Field {
            anchor: Anchor::Id("genre-container"),
            steps: &[("Genre_List", Choices), ("Genre_Other", Other)],
            nest: None,
        };
        let value = run(
            "<div id=\"genre-container\">\
               <select><option selected>Drama</option></select>\
               <select><option>Horror</option></select>\
             </div><button>+</button><p>Other: <textarea>Road movie</textarea></p>",
            &field,
        );
        assert_eq!(value, json!({ "Genre_List": ["Drama"], "Genre_Other": "Road movie" }));
    }

    #[test]
    fn prompt_anchor_reads_adjacent_textarea() {
        let field = Field {
            anchor: Anchor::Prompt("Number of series:"),
            steps: &[("Number_of_series", Text)],
            nest: None,
        };
        let value = run("<p>Number of series: <textarea> 2 </textarea></p>", &field);
        assert_eq!(value, json!({ "Number_of_series": "2" }));
    }

    #[test]
    fn placeholder_anchor_reads_itself() {
        let field = Field {
            anchor: Anchor::Placeholder("S1E1: Name of episode (running time)"),
            steps: &[("Episodes", Own)],
            nest: None,
        };
        let value = run(
            "<textarea placeholder=\"S1E1: Name of episode (running time)\">S1E1: Pilot (50)</textarea>",
            &field,
        );
        assert_eq!(value, json!({ "Episodes": "S1E1: Pilot (50)" }));
    }

    #[test]
    fn value_under_heading() {
        let form = Form::parse("<h2>10. Director's filmography</h2><textarea>2019 Short\n\n2022 Feature</textarea>");
        let value = extract_value(
            &form,
            form.everywhere(),
            Anchor::Heading("10. Director's filmography"),
            Lines,
        );
        assert_eq!(value, json!(["2019 Short", "2022 Feature"]));
    }

    #[test]
    fn defaults_per_pattern() {
        assert_eq!(default_value(Text), json!(""));
        assert_eq!(default_value(Lines), json!([]));
        assert_eq!(default_value(Choices), json!([]));
        assert_eq!(default_value(Address).as_object().map(Map::len), Some(5));
    }
}
