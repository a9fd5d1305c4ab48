use serde_json::{Map, Value};

use crate::parser::schema::ADDRESS_KEYS;

/// One entry per non-blank line, trimmed.
pub fn split_lines(block: &str) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a free-text `Key: Value` block (producer, company, co-producer).
///
/// Each line splits on its first colon. A line without a colon always feeds `Name`:
/// it becomes the name when none is set yet, otherwise it is appended with a space,
/// whichever key was seen last. Expected keys come first, in fixed order, and are
/// `""` when absent; any other keys follow in the order they appeared.
pub fn parse_address_block(block: &str) -> Map<String, Value> {
    let mut seen: Vec<(String, String)> = Vec::new();
    let mut name = String::new();

    for line in split_lines(block) {
        match line.split_once(':') {
            Some((key, value)) => {
                let (key, value) = (key.trim(), value.trim());
                if key == "Name" {
                    name = value.to_string();
                    continue;
                }
                match seen.iter_mut().find(|(k, _)| k == key) {
                    Some(slot) => slot.1 = value.to_string(),
                    None => seen.push((key.to_string(), value.to_string())),
                }
            }
            None if name.is_empty() => name = line,
            None => {
                name.push(' ');
                name.push_str(&line);
            }
        }
    }

    let mut out = empty_address();
    out.insert("Name".into(), Value::String(name));
    for (key, value) in seen {
        out.insert(key, Value::String(value));
    }
    out
}

pub fn empty_address() -> Map<String, Value> {
    ADDRESS_KEYS
        .iter()
        .map(|k| (k.to_string(), Value::String(String::new())))
        .collect()
}

// ── Tests ──
