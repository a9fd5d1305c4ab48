use scraper::ElementRef;
use serde_json::{Map, Value};

use crate::document::Form;
use crate::parser::schema::RowGroup;
use crate::parser::tree::text_of;

const ROW_CLASS: &str = "row";

/// One sub-record per row in the group's container. Empty rows are kept.
pub fn extract_rows(form: &Form, group: &RowGroup) -> Value {
    let Some(container) = form.by_id(group.container) else {
        return Value::Array(Vec::new());
    };
    let rows = outer_rows(container)
        .into_iter()
        .map(|row| Value::Object(read_row(row, group)))
        .collect();
    Value::Array(rows)
}

fn is_row(el: &ElementRef<'_>) -> bool {
    el.value().classes().any(|c| c == ROW_CLASS)
}

/// Rows inside the container that are not themselves inside another row.
fn outer_rows(container: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    container
        .descendent_elements()
        .skip(1)
        .filter(is_row)
        .filter(|row| {
            !row.ancestors()
                .take_while(|a| a.id() != container.id())
                .filter_map(ElementRef::wrap)
                .any(|a| is_row(&a))
        })
        .collect()
}

fn read_row(row: ElementRef<'_>, group: &RowGroup) -> Map<String, Value> {
    group
        .columns
        .iter()
        .map(|(class, key)| {
            let text = row
                .descendent_elements()
                .find(|el| {
                    el.value().name() == "textarea" && el.value().classes().any(|c| c == *class)
                })
                .map(text_of)
                .unwrap_or_default();
            (key.to_string(), Value::String(text))
        })
        .collect()
}

// ── Tests ──
