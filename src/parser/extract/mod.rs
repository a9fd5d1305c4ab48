pub mod fields;
pub mod rows;
pub mod text;

use serde_json::{Map, Value};
use tracing::debug;

use super::schema::{Body, Section, FORM};
use crate::document::Form;
use crate::record::Record;

/// Build the full record. Every schema key is present whatever the document holds.
pub fn extract_all(form: &Form) -> Record {
    let mut record = default_record();
    for section in FORM {
        record.insert(section.key, extract_section(form, section));
    }
    record
}

/// The record an empty document produces.
pub fn default_record() -> Record {
    let mut record = Record::default();
    for section in FORM {
        record.insert(section.key, default_body(&section.body));
    }
    record
}

fn extract_section(form: &Form, section: &Section) -> Value {
    let scope = match section.heading {
        Some(text) => match form.heading(text) {
            Some(heading) => form.section(heading),
            None => {
                debug!(section = section.key, heading = text, "section heading absent");
                return default_body(&section.body);
            }
        },
        None => form.everywhere(),
    };

    match &section.body {
        Body::Map(list) => {
            let mut map = Map::new();
            for field in *list {
                fields::extract_field(form, scope, field, &mut map);
            }
            Value::Object(map)
        }
        Body::Rows(group) => rows::extract_rows(form, group),
        Body::Value { anchor, pattern } => fields::extract_value(form, scope, *anchor, *pattern),
    }
}

fn default_body(body: &Body) -> Value {
    match body {
        Body::Map(list) => {
            let mut map = Map::new();
            for field in *list {
                fields::default_field(field, &mut map);
            }
            Value::Object(map)
        }
        Body::Rows(_) => Value::Array(Vec::new()),
        Body::Value { pattern, .. } => fields::default_value(*pattern),
    }
}

// ── Tests ──
