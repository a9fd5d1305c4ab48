use serde::Serialize;
use serde_json::{Map, Value};

/// Display sentinel for absent text. Never stored in a record; absence is `""`.
pub const NOT_SPECIFIED: &str = "Not specified";

pub const SOURCE_KEY: &str = "Source_File";

/// One extracted questionnaire: an ordered tree of strings, lists and sub-maps.
/// Serializes as a plain JSON object in schema order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fill {
    pub filled: usize,
    pub total: usize,
}

impl Fill {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.filled as f64 * 100.0 / self.total as f64
    }
}

impl Record {
    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn tag_source(&mut self, name: &str) {
        self.insert(SOURCE_KEY, Value::String(name.to_string()));
    }

    pub fn source(&self) -> Option<&str> {
        self.get(SOURCE_KEY).and_then(Value::as_str)
    }

    /// Dotted path lookup: `"Film.Target_Group.Rating"`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = self.get(parts.next()?)?;
        parts.try_fold(first, |value, key| value.get(key))
    }

    /// Text for display: strings as-is, lists joined with ", ", anything empty or
    /// missing as [`NOT_SPECIFIED`].
    pub fn text_or_sentinel(&self, path: &str) -> String {
        let text = match self.lookup(path) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        };
        if text.is_empty() {
            NOT_SPECIFIED.to_string()
        } else {
            text
        }
    }

    /// Leaf pairs keyed by dotted path, in record order. Lists become compact JSON.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (key, value) in self.as_map() {
            flatten_into(key, value, &mut out);
        }
        out
    }

    /// How many leaves carry a value. Lists count as one leaf each.
    pub fn fill(&self) -> Fill {
        let mut fill = Fill::default();
        for value in self.as_map().values() {
            count_leaves(value, &mut fill);
        }
        fill
    }
}

fn flatten_into(path: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(&format!("{path}.{key}"), child, out);
            }
        }
        Value::String(s) => out.push((path.to_string(), s.clone())),
        Value::Null => out.push((path.to_string(), String::new())),
        other => out.push((path.to_string(), other.to_string())),
    }
}

fn count_leaves(value: &Value, fill: &mut Fill) {
    match value {
        Value::Object(map) => map.values().for_each(|v| count_leaves(v, fill)),
        Value::String(s) => {
            fill.total += 1;
            if !s.trim().is_empty() {
                fill.filled += 1;
            }
        }
        Value::Array(items) => {
            fill.total += 1;
            if !items.is_empty() {
                fill.filled += 1;
            }
        }
        Value::Null => fill.total += 1,
        _ => {
            fill.total += 1;
            fill.filled += 1;
        }
    }
}

// ── Tests ──
