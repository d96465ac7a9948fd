use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, row_cells, row_headers, row_sets};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_fields(map);
            }
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_fields(result);

    for (name, rows) in row_sets(result) {
        println!("\n{}:", name);
        print_rows(rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let fields = flatten(map);
    if fields.is_empty() {
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }
    if !rows.iter().all(Value::is_object) {
        for item in rows {
            println!("{}", format_value(item));
        }
        return;
    }

    let headers = row_headers(rows);
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows {
        builder.push_record(row_cells(row, &headers, format_value));
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
