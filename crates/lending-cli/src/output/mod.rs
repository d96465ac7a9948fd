pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;
pub mod yaml;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Yaml => yaml::print_yaml(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar fields of an object, with nested objects flattened to dotted keys
/// (`payment.monthly_payment`). Arrays of objects are left out; see
/// [`row_sets`].
pub(crate) fn flatten(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into("", map, &mut out);
    out
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, out),
            Value::Array(items) if is_row_set(items) => {}
            _ => out.push((name, val.clone())),
        }
    }
}

/// Top-level fields holding a list of records (schedule periods, offers).
pub(crate) fn row_sets(map: &Map<String, Value>) -> Vec<(&str, &[Value])> {
    map.iter()
        .filter_map(|(key, val)| match val {
            Value::Array(items) if is_row_set(items) => Some((key.as_str(), items.as_slice())),
            _ => None,
        })
        .collect()
}

fn is_row_set(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_object)
}

/// Column headers for a list of records, in first-seen order.
pub(crate) fn row_headers(rows: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for (key, _) in flatten(map) {
                if !headers.contains(&key) {
                    headers.push(key);
                }
            }
        }
    }
    headers
}

/// One record's cells, aligned to `headers`.
pub(crate) fn row_cells(row: &Value, headers: &[String], render: fn(&Value) -> String) -> Vec<String> {
    let cells = match row {
        Value::Object(map) => flatten(map),
        _ => Vec::new(),
    };
    headers
        .iter()
        .map(|h| {
            cells
                .iter()
                .find(|(k, _)| k == h)
                .map(|(_, v)| render(v))
                .unwrap_or_default()
        })
        .collect()
}
